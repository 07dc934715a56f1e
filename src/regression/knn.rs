use super::{check_training_set, Regressor};
use crate::error::{CropCastError, Result};
use serde::{Deserialize, Serialize};

/// Uniform-weight k-nearest-neighbour regression on Euclidean distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    k: usize,
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
}

impl KNeighborsRegressor {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            x: Vec::new(),
            y: Vec::new(),
        }
    }
}

impl Regressor for KNeighborsRegressor {
    fn name(&self) -> &'static str {
        "k_neighbors"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_training_set(x, y)?;
        if self.k == 0 {
            return Err(CropCastError::InvalidInput(
                "number of neighbours must be at least 1".into(),
            ));
        }
        self.x = x.to_vec();
        self.y = y.to_vec();
        Ok(())
    }

    fn validate(&self, width: usize) -> Result<()> {
        if self.k == 0 || self.x.is_empty() || self.x.len() != self.y.len() {
            return Err(CropCastError::ModelUnavailable(format!(
                "k-neighbours holds {} rows, {} targets, k = {}",
                self.x.len(),
                self.y.len(),
                self.k
            )));
        }
        if self.x.iter().any(|row| row.len() != width) {
            return Err(CropCastError::ModelUnavailable(format!(
                "k-neighbours rows are not {} features wide",
                width
            )));
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        if self.x.is_empty() {
            return f64::NAN;
        }

        let mut distances: Vec<(f64, usize)> = self
            .x
            .iter()
            .enumerate()
            .map(|(i, stored)| {
                let d = stored
                    .iter()
                    .zip(row)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>();
                (d, i)
            })
            .collect();

        let k = self.k.min(distances.len());
        if k < distances.len() {
            distances.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0));
        }

        distances[..k].iter().map(|&(_, i)| self.y[i]).sum::<f64>() / k as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_nearest_neighbours() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let y = vec![1.0, 2.0, 3.0, 100.0, 200.0];
        let mut knn = KNeighborsRegressor::new(2);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&[0.4]), 1.5);
        assert_eq!(knn.predict(&[10.6]), 150.0);
    }

    #[test]
    fn k_larger_than_training_set_uses_all_rows() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![2.0, 4.0];
        let mut knn = KNeighborsRegressor::new(5);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&[100.0]), 3.0);
    }

    #[test]
    fn stored_row_width_checked() {
        let mut knn = KNeighborsRegressor::new(1);
        knn.fit(&[vec![0.0, 1.0]], &[0.0]).unwrap();
        assert!(knn.validate(2).is_ok());
        assert!(knn.validate(7).is_err());
    }

    #[test]
    fn zero_k_rejected() {
        let mut knn = KNeighborsRegressor::new(0);
        assert!(knn.fit(&[vec![0.0]], &[0.0]).is_err());
    }
}
