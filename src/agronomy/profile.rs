use crate::models::CropProfile;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const OPT_TEMP_RANGE: (f64, f64) = (18.0, 30.0);
pub const TEMP_TOLERANCE_RANGE: (f64, f64) = (5.0, 10.0);
pub const OPT_RAIN_RANGE: (f64, f64) = (50.0, 150.0);
pub const RAIN_TOLERANCE_RANGE: (f64, f64) = (20.0, 50.0);
pub const PEAK_MONTHS: [u32; 4] = [6, 7, 8, 9];
pub const SEASON_LENGTH_RANGE: (f64, f64) = (2.0, 3.0);

/// Draw the agronomic profile of a crop.
///
/// The draw depends only on the crop name and seed, never on which other
/// crops were drawn before it.
pub fn profile_for(crop: &str, seed: u64) -> CropProfile {
    let mut rng = StdRng::seed_from_u64(seed ^ name_hash(crop));

    let opt_temp = rng.gen_range(OPT_TEMP_RANGE.0..OPT_TEMP_RANGE.1);
    let temp_tolerance = rng.gen_range(TEMP_TOLERANCE_RANGE.0..TEMP_TOLERANCE_RANGE.1);
    let opt_rain = rng.gen_range(OPT_RAIN_RANGE.0..OPT_RAIN_RANGE.1);
    let rain_tolerance = rng.gen_range(RAIN_TOLERANCE_RANGE.0..RAIN_TOLERANCE_RANGE.1);
    let peak_month = *PEAK_MONTHS.choose(&mut rng).unwrap_or(&PEAK_MONTHS[0]);
    let season_length = rng.gen_range(SEASON_LENGTH_RANGE.0..SEASON_LENGTH_RANGE.1);

    CropProfile {
        opt_temp,
        temp_tolerance,
        opt_rain,
        rain_tolerance,
        peak_month,
        season_length,
    }
}

// FNV-1a. std's DefaultHasher may change between Rust releases, which would
// silently reshuffle every profile for a given seed.
fn name_hash(name: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    name.bytes()
        .fold(OFFSET, |hash, b| (hash ^ b as u64).wrapping_mul(PRIME))
}
