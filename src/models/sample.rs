use super::weather::WeatherObservation;
use serde::{Deserialize, Serialize};

/// One labeled row of the synthetic training corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub crop: String,
    pub observation: WeatherObservation,
    /// Suitability in [0, 1]
    pub label: f64,
}

impl TrainingSample {
    pub fn new(crop: impl Into<String>, observation: WeatherObservation, label: f64) -> Self {
        Self {
            crop: crop.into(),
            observation,
            label,
        }
    }
}
