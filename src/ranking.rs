use crate::error::{CropCastError, Result};
use crate::models::{CurrentConditions, RankedPrediction, Roster, WeatherObservation};
use crate::regression::SuitabilityModel;
use std::sync::Arc;

/// Anything that can score one crop under one observation.
pub trait SuitabilityScorer: Send + Sync {
    fn score(&self, crop: &str, observation: &WeatherObservation) -> Result<f64>;
}

impl SuitabilityScorer for SuitabilityModel {
    fn score(&self, crop: &str, observation: &WeatherObservation) -> Result<f64> {
        self.predict_crop(crop, observation)
    }
}

/// Score every roster crop and sort best-to-worst.
///
/// Ties keep roster order. An empty roster yields an empty list.
pub fn rank<S: SuitabilityScorer + ?Sized>(
    observation: &WeatherObservation,
    roster: &Roster,
    scorer: &S,
) -> Result<Vec<RankedPrediction>> {
    observation.validate()?;

    let mut predictions = Vec::with_capacity(roster.len());
    for crop in &roster.names {
        let prediction = scorer.score(crop, observation)?;
        if !prediction.is_finite() {
            return Err(CropCastError::ModelUnavailable(format!(
                "non-finite prediction for {}",
                crop
            )));
        }
        tracing::debug!(crop = %crop, prediction, "Crop prediction");
        predictions.push(RankedPrediction::new(
            crop.as_str(),
            prediction,
            roster.countries_for(crop),
        ));
    }

    predictions.sort_by(|a, b| b.prediction.total_cmp(&a.prediction));
    Ok(predictions)
}

/// Read-only ranking front door shared by concurrent callers.
#[derive(Clone)]
pub struct RankingService {
    roster: Arc<Roster>,
    scorer: Arc<dyn SuitabilityScorer>,
}

impl RankingService {
    pub fn new(roster: Roster, scorer: Arc<dyn SuitabilityScorer>) -> Self {
        Self {
            roster: Arc::new(roster),
            scorer,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rank(&self, conditions: CurrentConditions, month: u32) -> Result<Vec<RankedPrediction>> {
        self.rank_observation(&conditions.at_month(month))
    }

    pub fn rank_observation(&self, observation: &WeatherObservation) -> Result<Vec<RankedPrediction>> {
        rank(observation, &self.roster, self.scorer.as_ref())
    }
}
