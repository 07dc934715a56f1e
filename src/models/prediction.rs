use serde::{Deserialize, Serialize};

/// Ranked suitability for a single crop.
///
/// `prediction` is nominally in [0, 1] but is not clamped; the regressor can
/// overshoot the labels it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub crop: String,
    pub prediction: f64,
    pub top_countries: Vec<String>,
}

impl RankedPrediction {
    pub fn new(crop: impl Into<String>, prediction: f64, top_countries: Vec<String>) -> Self {
        Self {
            crop: crop.into(),
            prediction,
            top_countries,
        }
    }
}
