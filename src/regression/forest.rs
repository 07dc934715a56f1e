use super::tree::{DecisionTreeRegressor, TreeParams};
use super::{check_training_set, Regressor};
use crate::error::{CropCastError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of full-depth trees, each fitted on a bootstrap resample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_trees: usize,
    seed: u64,
    tree_params: TreeParams,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            seed,
            tree_params: TreeParams::default(),
            trees: Vec::new(),
        }
    }

    pub fn with_tree_params(mut self, params: TreeParams) -> Self {
        self.tree_params = params;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForestRegressor {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_training_set(x, y)?;
        let n = x.len();
        let params = self.tree_params;
        let seed = self.seed;

        // One RNG per tree so the result does not depend on thread scheduling
        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let mut sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = DecisionTreeRegressor::new(params);
                tree.fit_indices(x, y, &mut sample);
                tree
            })
            .collect();

        Ok(())
    }

    fn validate(&self, width: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(CropCastError::ModelUnavailable(
                "random forest has no trees".into(),
            ));
        }
        self.trees.iter().try_for_each(|t| t.validate(width))
    }

    fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }
}
