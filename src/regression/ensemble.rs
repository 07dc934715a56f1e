use super::{
    check_training_set, DecisionTreeRegressor, GradientBoostingRegressor, KNeighborsRegressor,
    RandomForestRegressor, Regressor,
};
use crate::error::{CropCastError, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The concrete learner families an ensemble can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Learner {
    RandomForest(RandomForestRegressor),
    DecisionTree(DecisionTreeRegressor),
    GradientBoosting(GradientBoostingRegressor),
    KNeighbors(KNeighborsRegressor),
}

impl Learner {
    fn inner(&self) -> &dyn Regressor {
        match self {
            Learner::RandomForest(r) => r,
            Learner::DecisionTree(r) => r,
            Learner::GradientBoosting(r) => r,
            Learner::KNeighbors(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Regressor {
        match self {
            Learner::RandomForest(r) => r,
            Learner::DecisionTree(r) => r,
            Learner::GradientBoosting(r) => r,
            Learner::KNeighbors(r) => r,
        }
    }
}

impl Regressor for Learner {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.inner().predict(row)
    }

    fn validate(&self, width: usize) -> Result<()> {
        self.inner().validate(width)
    }
}

/// Unweighted average of independently fitted learners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingEnsemble {
    members: Vec<Learner>,
}

impl VotingEnsemble {
    pub fn new(members: Vec<Learner>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Learner] {
        &self.members
    }
}

impl Regressor for VotingEnsemble {
    fn name(&self) -> &'static str {
        "voting_ensemble"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_training_set(x, y)?;
        if self.members.is_empty() {
            return Err(CropCastError::InvalidInput(
                "ensemble has no learners".into(),
            ));
        }

        for member in &mut self.members {
            let started = Instant::now();
            member.fit(x, y)?;
            tracing::info!(
                learner = member.name(),
                rows = x.len(),
                "Fitted in {:.2?}",
                started.elapsed()
            );
        }
        Ok(())
    }

    fn validate(&self, width: usize) -> Result<()> {
        if self.members.is_empty() {
            return Err(CropCastError::ModelUnavailable(
                "ensemble has no learners".into(),
            ));
        }
        self.members.iter().try_for_each(|m| m.validate(width))
    }

    fn predict(&self, row: &[f64]) -> f64 {
        if self.members.is_empty() {
            return f64::NAN;
        }
        self.members.iter().map(|m| m.predict(row)).sum::<f64>() / self.members.len() as f64
    }
}
