use crate::error::{CropCastError, Result};
use serde::{Deserialize, Serialize};

/// Physically plausible bounds accepted at inference time.
pub const TEMPERATURE_RANGE_C: (f64, f64) = (-90.0, 60.0);
pub const HUMIDITY_RANGE_PERCENT: (f64, f64) = (0.0, 100.0);
pub const PRESSURE_RANGE_HPA: (f64, f64) = (850.0, 1100.0);
pub const RAINFALL_RANGE_MM: (f64, f64) = (0.0, 2000.0);
pub const WIND_RANGE_MPS: (f64, f64) = (0.0, 120.0);

/// Number of features the regressor sees per row.
pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "crop_type",
    "month",
    "temperature_celsius",
    "humidity_percent",
    "pressure_hpa",
    "rainfall_mm",
    "wind_speed_mps",
];

/// Current conditions as reported by a weather provider, before a month is
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    /// Providers rarely report a monthly rainfall figure; absent values are
    /// imputed by the regressor.
    pub rainfall_mm: Option<f64>,
}

impl CurrentConditions {
    pub fn at_month(self, month: u32) -> WeatherObservation {
        WeatherObservation {
            temperature_c: self.temperature_c,
            humidity_percent: self.humidity_percent,
            pressure_hpa: self.pressure_hpa,
            rainfall_mm: self.rainfall_mm,
            wind_speed_mps: self.wind_speed_mps,
            month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub pressure_hpa: f64,
    /// Monthly-equivalent rainfall.
    pub rainfall_mm: Option<f64>,
    pub wind_speed_mps: f64,
    /// 1 = January .. 12 = December
    pub month: u32,
}

impl WeatherObservation {
    /// Reject readings that are non-finite or outside physical bounds.
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(CropCastError::InvalidInput(format!(
                "month must be in 1..=12, got {}",
                self.month
            )));
        }

        check_range("temperature", self.temperature_c, TEMPERATURE_RANGE_C)?;
        check_range("humidity", self.humidity_percent, HUMIDITY_RANGE_PERCENT)?;
        check_range("pressure", self.pressure_hpa, PRESSURE_RANGE_HPA)?;
        check_range("wind speed", self.wind_speed_mps, WIND_RANGE_MPS)?;
        if let Some(rain) = self.rainfall_mm {
            check_range("rainfall", rain, RAINFALL_RANGE_MM)?;
        }

        Ok(())
    }

    /// Feature row in the order of [`FEATURE_NAMES`]; `None` marks a value to
    /// be imputed.
    pub fn features(&self, crop_id: usize) -> [Option<f64>; FEATURE_COUNT] {
        [
            Some(crop_id as f64),
            Some(self.month as f64),
            Some(self.temperature_c),
            Some(self.humidity_percent),
            Some(self.pressure_hpa),
            self.rainfall_mm,
            Some(self.wind_speed_mps),
        ]
    }

    /// Rainfall, treating a missing reading as dry.
    pub fn rainfall_or_zero(&self) -> f64 {
        self.rainfall_mm.unwrap_or(0.0)
    }
}

fn check_range(field: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() {
        return Err(CropCastError::InvalidInput(format!(
            "{} is not a finite number",
            field
        )));
    }
    if value < min || value > max {
        return Err(CropCastError::InvalidInput(format!(
            "{} {} outside [{}, {}]",
            field, value, min, max
        )));
    }
    Ok(())
}
