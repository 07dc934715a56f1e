pub mod openweathermap;
pub mod roster;

pub use openweathermap::OpenWeatherMapClient;
pub use roster::{builtin_roster, FileRosterSource};
