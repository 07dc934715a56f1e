use super::tree::{DecisionTreeRegressor, TreeParams};
use super::{check_training_set, Regressor};
use crate::error::{CropCastError, Result};
use serde::{Deserialize, Serialize};

/// Least-squares gradient boosting over shallow trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    n_stages: usize,
    learning_rate: f64,
    max_depth: usize,
    init: f64,
    stages: Vec<DecisionTreeRegressor>,
}

impl GradientBoostingRegressor {
    pub fn new(n_stages: usize, learning_rate: f64, max_depth: usize) -> Self {
        Self {
            n_stages,
            learning_rate,
            max_depth: max_depth.max(1),
            init: 0.0,
            stages: Vec::new(),
        }
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Regressor for GradientBoostingRegressor {
    fn name(&self) -> &'static str {
        "gradient_boosting"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_training_set(x, y)?;
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(CropCastError::InvalidInput(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }

        self.init = y.iter().sum::<f64>() / y.len() as f64;
        self.stages.clear();

        let params = TreeParams {
            max_depth: Some(self.max_depth),
            ..TreeParams::default()
        };
        let mut current = vec![self.init; y.len()];
        let mut residuals = vec![0.0; y.len()];

        for _ in 0..self.n_stages {
            for ((r, target), pred) in residuals.iter_mut().zip(y).zip(&current) {
                *r = target - pred;
            }

            let mut stage = DecisionTreeRegressor::new(params);
            stage.fit(x, &residuals)?;

            for (pred, row) in current.iter_mut().zip(x) {
                *pred += self.learning_rate * stage.predict(row);
            }
            self.stages.push(stage);
        }

        Ok(())
    }

    fn validate(&self, width: usize) -> Result<()> {
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err(CropCastError::ModelUnavailable(
                "gradient boosting has non-finite parameters".into(),
            ));
        }
        self.stages.iter().try_for_each(|s| s.validate(width))
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.stages
            .iter()
            .fold(self.init, |acc, stage| acc + self.learning_rate * stage.predict(row))
    }
}
