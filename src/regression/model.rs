use super::ensemble::{Learner, VotingEnsemble};
use super::imputer::MeanImputer;
use super::split::train_test_split;
use super::{
    mean_squared_error, DecisionTreeRegressor, GradientBoostingRegressor, KNeighborsRegressor,
    RandomForestRegressor, Regressor,
};
use crate::error::{CropCastError, Result};
use crate::models::{
    first_duplicate, TrainingSample, WeatherObservation, FEATURE_COUNT, FEATURE_NAMES,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hyperparameters for one training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    pub seed: u64,
    pub test_fraction: f64,
    pub forest_trees: usize,
    pub boosting_stages: usize,
    pub learning_rate: f64,
    pub boosting_max_depth: usize,
    pub neighbors: usize,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            forest_trees: 100,
            boosting_stages: 100,
            learning_rate: 0.1,
            boosting_max_depth: 3,
            neighbors: 5,
        }
    }
}

impl TrainingOptions {
    fn ensemble(&self) -> VotingEnsemble {
        VotingEnsemble::new(vec![
            Learner::RandomForest(RandomForestRegressor::new(self.forest_trees, self.seed)),
            Learner::DecisionTree(DecisionTreeRegressor::default()),
            Learner::GradientBoosting(GradientBoostingRegressor::new(
                self.boosting_stages,
                self.learning_rate,
                self.boosting_max_depth,
            )),
            Learner::KNeighbors(KNeighborsRegressor::new(self.neighbors)),
        ])
    }
}

/// Trained suitability artifact. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityModel {
    /// Crop names in identifier order
    crops: Vec<String>,
    imputer: MeanImputer,
    ensemble: VotingEnsemble,
    pub trained_at: DateTime<Utc>,
    pub options: TrainingOptions,
    pub held_out_mse: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: SuitabilityModel,
    pub train_rows: usize,
    pub held_out_rows: usize,
    pub held_out_mse: Option<f64>,
}

impl SuitabilityModel {
    pub fn crops(&self) -> &[String] {
        &self.crops
    }

    pub fn crop_id(&self, crop: &str) -> Option<usize> {
        self.crops.iter().position(|c| c == crop)
    }

    /// Structural check run on every loaded artifact, so a corrupt file fails
    /// here instead of panicking or looping inside a prediction.
    pub fn validate(&self) -> Result<()> {
        if self.crops.is_empty() {
            return Err(CropCastError::ModelUnavailable(
                "model was trained on no crops".into(),
            ));
        }
        if self.imputer.means().len() != FEATURE_COUNT {
            return Err(CropCastError::ModelUnavailable(format!(
                "imputer holds {} column means, expected {}",
                self.imputer.means().len(),
                FEATURE_COUNT
            )));
        }
        self.ensemble.validate(FEATURE_COUNT)
    }

    /// Estimate suitability; the result is not clamped to [0, 1].
    pub fn predict(&self, crop_id: usize, observation: &WeatherObservation) -> Result<f64> {
        observation.validate()?;
        if crop_id >= self.crops.len() {
            return Err(CropCastError::InvalidInput(format!(
                "crop id {} unknown to model trained on {} crops",
                crop_id,
                self.crops.len()
            )));
        }

        let row = self
            .imputer
            .transform(&observation.features(crop_id))
            .map_err(|e| CropCastError::ModelUnavailable(format!("imputer mismatch: {}", e)))?;
        let estimate = self.ensemble.predict(&row);
        if !estimate.is_finite() {
            return Err(CropCastError::ModelUnavailable(format!(
                "non-finite estimate for crop {}",
                self.crops[crop_id]
            )));
        }
        Ok(estimate)
    }

    pub fn predict_crop(&self, crop: &str, observation: &WeatherObservation) -> Result<f64> {
        let id = self.crop_id(crop).ok_or_else(|| {
            CropCastError::InvalidInput(format!("crop '{}' is not known to the model", crop))
        })?;
        self.predict(id, observation)
    }
}

/// Fit the ensemble on `samples`, encoding crops by their position in `crops`.
pub fn train(
    samples: &[TrainingSample],
    crops: &[String],
    options: &TrainingOptions,
) -> Result<TrainingReport> {
    if samples.is_empty() {
        return Err(CropCastError::TrainingDataExhausted(
            "training corpus is empty".into(),
        ));
    }
    if crops.is_empty() {
        return Err(CropCastError::InvalidInput("crop roster is empty".into()));
    }
    if let Some(dup) = first_duplicate(crops) {
        return Err(CropCastError::InvalidInput(format!(
            "crop '{}' appears more than once in the roster",
            dup
        )));
    }

    let crop_ids: HashMap<&str, usize> = crops
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut raw: Vec<[Option<f64>; FEATURE_COUNT]> = Vec::with_capacity(samples.len());
    let mut labels = Vec::with_capacity(samples.len());
    for sample in samples {
        let id = *crop_ids.get(sample.crop.as_str()).ok_or_else(|| {
            CropCastError::InvalidInput(format!(
                "sample crop '{}' is not in the roster",
                sample.crop
            ))
        })?;
        if !sample.label.is_finite() {
            return Err(CropCastError::InvalidInput(format!(
                "non-finite label for crop '{}'",
                sample.crop
            )));
        }
        raw.push(sample.observation.features(id));
        labels.push(sample.label);
    }

    let (train_idx, test_idx) = train_test_split(samples.len(), options.test_fraction, options.seed)?;
    if train_idx.is_empty() {
        return Err(CropCastError::TrainingDataExhausted(format!(
            "{} samples leave no training rows after the held-out split",
            samples.len()
        )));
    }

    let train_raw: Vec<_> = train_idx.iter().map(|&i| raw[i]).collect();
    let imputer = MeanImputer::fit(&train_raw)?;

    let x_train = train_raw
        .iter()
        .map(|r| imputer.transform(r))
        .collect::<Result<Vec<_>>>()?;
    let y_train: Vec<f64> = train_idx.iter().map(|&i| labels[i]).collect();

    tracing::info!(
        train_rows = x_train.len(),
        held_out_rows = test_idx.len(),
        features = ?FEATURE_NAMES,
        "Training suitability ensemble"
    );

    let mut ensemble = options.ensemble();
    ensemble.fit(&x_train, &y_train)?;

    let held_out_mse = if test_idx.is_empty() {
        None
    } else {
        let x_test = test_idx
            .iter()
            .map(|&i| imputer.transform(&raw[i]))
            .collect::<Result<Vec<_>>>()?;
        let y_test: Vec<f64> = test_idx.iter().map(|&i| labels[i]).collect();
        let mse = mean_squared_error(&y_test, &ensemble.predict_many(&x_test));
        tracing::info!("Ensemble held-out MSE: {:.4}", mse);
        Some(mse)
    };

    let model = SuitabilityModel {
        crops: crops.to_vec(),
        imputer,
        ensemble,
        trained_at: Utc::now(),
        options: *options,
        held_out_mse,
    };

    Ok(TrainingReport {
        model,
        train_rows: train_idx.len(),
        held_out_rows: test_idx.len(),
        held_out_mse,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agronomy::{GenerationParams, SyntheticDatasetGenerator};
    use crate::models::Roster;

    pub(crate) fn fast_options() -> TrainingOptions {
        TrainingOptions {
            forest_trees: 8,
            boosting_stages: 30,
            ..TrainingOptions::default()
        }
    }

    pub(crate) fn small_corpus() -> (Roster, Vec<TrainingSample>) {
        let roster = Roster::new(vec!["Corn".into(), "Wheat".into(), "Rice".into()]);
        let params = GenerationParams {
            seed: 42,
            months: 12,
            samples_per_month: 15,
        };
        let samples = SyntheticDatasetGenerator::new(&roster, params)
            .unwrap()
            .generate()
            .unwrap();
        (roster, samples)
    }

    pub(crate) fn trained_model() -> SuitabilityModel {
        let (roster, samples) = small_corpus();
        train(&samples, &roster.names, &fast_options()).unwrap().model
    }

    #[test]
    fn train_reports_partition_sizes_and_mse() {
        let (roster, samples) = small_corpus();
        let report = train(&samples, &roster.names, &fast_options()).unwrap();
        assert_eq!(report.train_rows + report.held_out_rows, samples.len());
        assert!((108..=109).contains(&report.held_out_rows));
        let mse = report.held_out_mse.unwrap();
        assert!(mse.is_finite() && mse >= 0.0);
        assert!(mse < 0.1, "held-out mse {}", mse);
    }

    #[test]
    fn predictions_track_training_labels() {
        let (roster, samples) = small_corpus();
        let model = train(&samples, &roster.names, &fast_options()).unwrap().model;

        let total_error: f64 = samples
            .iter()
            .map(|s| {
                let p = model.predict_crop(&s.crop, &s.observation).unwrap();
                (p - s.label).abs()
            })
            .sum();
        let mean_error = total_error / samples.len() as f64;
        assert!(mean_error < 0.2, "mean absolute error {}", mean_error);
    }

    #[test]
    fn empty_corpus_is_exhausted() {
        let crops = vec!["Corn".to_string()];
        assert!(matches!(
            train(&[], &crops, &fast_options()),
            Err(CropCastError::TrainingDataExhausted(_))
        ));
    }

    #[test]
    fn single_sample_leaves_no_training_rows() {
        let (roster, samples) = small_corpus();
        assert!(matches!(
            train(&samples[..1], &roster.names, &fast_options()),
            Err(CropCastError::TrainingDataExhausted(_))
        ));
    }

    #[test]
    fn unknown_crop_in_corpus_rejected() {
        let (_, samples) = small_corpus();
        let crops = vec!["Corn".to_string()];
        assert!(matches!(
            train(&samples, &crops, &fast_options()),
            Err(CropCastError::InvalidInput(_))
        ));
    }

    #[test]
    fn duplicate_roster_crop_rejected() {
        let (_, samples) = small_corpus();
        let crops: Vec<String> = ["Corn", "Wheat", "Rice", "Corn"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert!(matches!(
            train(&samples, &crops, &fast_options()),
            Err(CropCastError::InvalidInput(msg)) if msg.contains("Corn")
        ));
    }

    #[test]
    fn trained_model_validates() {
        assert!(trained_model().validate().is_ok());
    }

    #[test]
    fn imputer_width_mismatch_is_model_unavailable() {
        let mut model = trained_model();
        model.imputer = MeanImputer::fit(&[vec![Some(1.0); 3]]).unwrap();
        assert!(matches!(
            model.validate(),
            Err(CropCastError::ModelUnavailable(_))
        ));
        let obs = WeatherObservation {
            temperature_c: 20.0,
            humidity_percent: 60.0,
            pressure_hpa: 1013.0,
            rainfall_mm: None,
            wind_speed_mps: 2.0,
            month: 7,
        };
        assert!(matches!(
            model.predict(0, &obs),
            Err(CropCastError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn invalid_observation_rejected_before_prediction() {
        let model = trained_model();
        let obs = WeatherObservation {
            temperature_c: 20.0,
            humidity_percent: 150.0,
            pressure_hpa: 1013.0,
            rainfall_mm: Some(50.0),
            wind_speed_mps: 2.0,
            month: 7,
        };
        assert!(matches!(
            model.predict(0, &obs),
            Err(CropCastError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_rainfall_is_imputed() {
        let model = trained_model();
        let mut obs = WeatherObservation {
            temperature_c: 24.0,
            humidity_percent: 65.0,
            pressure_hpa: 1013.0,
            rainfall_mm: None,
            wind_speed_mps: 2.0,
            month: 7,
        };
        let imputed = model.predict(0, &obs).unwrap();
        obs.rainfall_mm = Some(model.imputer.means()[5]);
        assert_eq!(model.predict(0, &obs).unwrap(), imputed);
    }

    #[test]
    fn unknown_crop_id_rejected() {
        let model = trained_model();
        let obs = WeatherObservation {
            temperature_c: 24.0,
            humidity_percent: 65.0,
            pressure_hpa: 1013.0,
            rainfall_mm: Some(60.0),
            wind_speed_mps: 2.0,
            month: 7,
        };
        assert!(model.predict(3, &obs).is_err());
        assert!(model.predict_crop("Cotton", &obs).is_err());
        assert_eq!(model.crop_id("Rice"), Some(2));
    }
}
