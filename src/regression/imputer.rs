use crate::error::{CropCastError, Result};
use serde::{Deserialize, Serialize};

/// Replaces missing feature values with the training column mean.
///
/// The same fitted instance is applied at train and predict time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    means: Vec<f64>,
}

impl MeanImputer {
    pub fn fit<R: AsRef<[Option<f64>]>>(rows: &[R]) -> Result<Self> {
        let width = rows
            .first()
            .map(|r| r.as_ref().len())
            .ok_or_else(|| CropCastError::TrainingDataExhausted("no rows to impute".into()))?;

        let mut sums = vec![0.0; width];
        let mut counts = vec![0usize; width];
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(CropCastError::InvalidInput(
                    "feature rows have inconsistent widths".into(),
                ));
            }
            for (col, value) in row.iter().enumerate() {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    sums[col] += v;
                    counts[col] += 1;
                }
            }
        }

        // Columns with no observed values fall back to zero
        let means = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
            .collect();

        Ok(Self { means })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn transform(&self, row: &[Option<f64>]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(CropCastError::InvalidInput(format!(
                "expected {} features, got {}",
                self.means.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(&self.means)
            .map(|(value, mean)| value.filter(|v| v.is_finite()).unwrap_or(*mean))
            .collect())
    }
}
