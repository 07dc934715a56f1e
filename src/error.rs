use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropCastError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Training data exhausted: {0}")]
    TrainingDataExhausted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CropCastError>;
