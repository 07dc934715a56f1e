use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The ten largest U.S. crops, in the order used for crop identifiers when no
/// roster file is supplied.
pub const DEFAULT_CROPS: [&str; 10] = [
    "Corn",
    "Soybean",
    "Hay",
    "Wheat",
    "Cotton",
    "Rice",
    "Sugar",
    "Tree Nuts",
    "Sorghum",
    "Barley",
];

/// Fixed agronomic parameters for one crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    /// Optimal temperature, °C
    pub opt_temp: f64,
    /// Spread around the optimal temperature, °C
    pub temp_tolerance: f64,
    /// Optimal monthly rainfall, mm
    pub opt_rain: f64,
    /// Rainfall above the optimum still considered adequate, mm
    pub rain_tolerance: f64,
    /// Month of peak growth (1-12)
    pub peak_month: u32,
    /// Half-width of the growing season, months
    pub season_length: f64,
}

/// Ordered crop list plus the static export-destination metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub names: Vec<String>,
    #[serde(default)]
    pub countries: HashMap<String, Vec<String>>,
}

impl Roster {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            countries: HashMap::new(),
        }
    }

    pub fn with_countries(mut self, crop: &str, countries: Vec<String>) -> Self {
        self.countries.insert(crop.to_string(), countries);
        self
    }

    pub fn default_crops() -> Self {
        Self::new(DEFAULT_CROPS.iter().map(|c| c.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Export destinations for a crop; unknown crops have none.
    pub fn countries_for(&self, crop: &str) -> Vec<String> {
        self.countries.get(crop).cloned().unwrap_or_default()
    }
}

/// First name that repeats an earlier one; crop ids must be unambiguous.
pub fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names.iter().map(String::as_str).find(|n| !seen.insert(*n))
}
