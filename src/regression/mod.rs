pub mod boosting;
pub mod ensemble;
pub mod forest;
pub mod imputer;
pub mod knn;
pub mod model;
pub mod split;
pub mod store;
pub mod tree;

pub use boosting::GradientBoostingRegressor;
pub use ensemble::{Learner, VotingEnsemble};
pub use forest::RandomForestRegressor;
pub use imputer::MeanImputer;
pub use knn::KNeighborsRegressor;
pub use model::{train, SuitabilityModel, TrainingOptions, TrainingReport};
pub use store::{FileModelStore, ModelStore};
pub use tree::{DecisionTreeRegressor, TreeParams};

use crate::error::{CropCastError, Result};

/// A learner mapping a numeric feature row to a real-valued estimate.
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    fn predict(&self, row: &[f64]) -> f64;

    /// Check a fitted (typically deserialized) learner against the feature
    /// width it will be asked to predict on.
    fn validate(&self, width: usize) -> Result<()>;

    fn predict_many(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict(row)).collect()
    }
}

/// Shared precondition for every learner's `fit`.
pub(crate) fn check_training_set(x: &[Vec<f64>], y: &[f64]) -> Result<()> {
    if x.is_empty() {
        return Err(CropCastError::TrainingDataExhausted(
            "no rows to fit".into(),
        ));
    }
    if x.len() != y.len() {
        return Err(CropCastError::InvalidInput(format!(
            "{} feature rows but {} targets",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if x.iter().any(|row| row.len() != width) {
        return Err(CropCastError::InvalidInput(
            "feature rows have inconsistent widths".into(),
        ));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(CropCastError::InvalidInput(
            "training data contains non-finite values".into(),
        ));
    }
    Ok(())
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}
