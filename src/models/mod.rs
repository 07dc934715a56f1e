pub mod crop;
pub mod prediction;
pub mod sample;
pub mod weather;

pub use crop::*;
pub use prediction::*;
pub use sample::*;
pub use weather::*;
