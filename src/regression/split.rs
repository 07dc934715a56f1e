use crate::error::{CropCastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seeded shuffle split of `n` row indices into (train, held-out).
///
/// The held-out partition holds `ceil(n * test_fraction)` rows.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(CropCastError::InvalidInput(format!(
            "test fraction must be in [0, 1), got {}",
            test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    let train = indices.split_off(n_test);
    Ok((train, indices))
}
