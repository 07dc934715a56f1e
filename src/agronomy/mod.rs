pub mod dataset;
pub mod generator;
pub mod profile;
pub mod seasonal;

pub use generator::{GenerationParams, SyntheticDatasetGenerator};
pub use profile::profile_for;
