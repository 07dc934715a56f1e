use super::profile::profile_for;
use super::seasonal::{composite_suitability, seasonal_value};
use crate::error::{CropCastError, Result};
use crate::models::{CropProfile, Roster, TrainingSample, WeatherObservation};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TEMP_BASE_C: f64 = 15.0;
const TEMP_AMPLITUDE_C: f64 = 15.0;
const TEMP_NOISE_C: f64 = 3.0;
const TEMP_BOUNDS_C: (f64, f64) = (-10.0, 45.0);

const HUMIDITY_BASE: f64 = 65.0;
const HUMIDITY_AMPLITUDE: f64 = 10.0;
const HUMIDITY_NOISE: f64 = 10.0;
const HUMIDITY_BOUNDS: (f64, f64) = (10.0, 100.0);

const PRESSURE_MEAN_HPA: f64 = 1013.0;
const PRESSURE_NOISE_HPA: f64 = 5.0;
const PRESSURE_BOUNDS_HPA: (f64, f64) = (980.0, 1050.0);

const RAIN_BASE_MM: f64 = 40.0;
const RAIN_AMPLITUDE_MM: f64 = 30.0;
const RAIN_PHASE_SHIFT: f64 = 2.0;
const RAIN_NOISE_RANGE_MM: (f64, f64) = (-20.0, 80.0);
const RAIN_SKEW_SIGMA: f64 = 0.5;
const RAIN_BOUNDS_MM: (f64, f64) = (0.0, 500.0);

const WIND_MEAN_MPS: f64 = 3.0;
const WIND_NOISE_MPS: f64 = 2.0;
const WIND_BOUNDS_MPS: (f64, f64) = (0.0, 25.0);

const LABEL_NOISE: f64 = 0.05;

/// Volume and reproducibility settings for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub seed: u64,
    /// Months 1..=months are generated.
    pub months: u32,
    pub samples_per_month: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 42,
            months: 12,
            samples_per_month: 100,
        }
    }
}

impl GenerationParams {
    pub fn total_rows(&self, crops: usize) -> usize {
        crops * self.months as usize * self.samples_per_month
    }
}

struct NoiseModel {
    temperature: Normal<f64>,
    humidity: Normal<f64>,
    pressure: Normal<f64>,
    rain_skew: Normal<f64>,
    wind: Normal<f64>,
    label: Normal<f64>,
}

impl NoiseModel {
    fn new() -> Result<Self> {
        let normal = |mean: f64, std: f64| {
            Normal::new(mean, std)
                .map_err(|e| CropCastError::InvalidInput(format!("noise distribution: {}", e)))
        };
        Ok(Self {
            temperature: normal(0.0, TEMP_NOISE_C)?,
            humidity: normal(0.0, HUMIDITY_NOISE)?,
            pressure: normal(PRESSURE_MEAN_HPA, PRESSURE_NOISE_HPA)?,
            rain_skew: normal(0.0, RAIN_SKEW_SIGMA)?,
            wind: normal(WIND_MEAN_MPS, WIND_NOISE_MPS)?,
            label: normal(0.0, LABEL_NOISE)?,
        })
    }
}

/// Produces the labeled synthetic corpus the regressor is trained on.
pub struct SyntheticDatasetGenerator {
    roster: Vec<String>,
    params: GenerationParams,
    profiles: BTreeMap<String, CropProfile>,
}

impl SyntheticDatasetGenerator {
    pub fn new(roster: &Roster, params: GenerationParams) -> Result<Self> {
        if params.months > 12 {
            return Err(CropCastError::InvalidInput(format!(
                "cannot generate {} months, at most 12",
                params.months
            )));
        }

        let profiles = roster
            .names
            .iter()
            .map(|crop| (crop.clone(), profile_for(crop, params.seed)))
            .collect();

        Ok(Self {
            roster: roster.names.clone(),
            params,
            profiles,
        })
    }

    pub fn profile(&self, crop: &str) -> Option<&CropProfile> {
        self.profiles.get(crop)
    }

    /// Generate every (crop, month, sample) row and shuffle with the run seed.
    pub fn generate(&self) -> Result<Vec<TrainingSample>> {
        let total = self.params.total_rows(self.roster.len());
        if total == 0 {
            return Err(CropCastError::TrainingDataExhausted(format!(
                "{} crops x {} months x {} samples per month yields no rows",
                self.roster.len(),
                self.params.months,
                self.params.samples_per_month
            )));
        }

        tracing::info!(
            crops = self.roster.len(),
            months = self.params.months,
            samples_per_month = self.params.samples_per_month,
            "Generating {} synthetic samples",
            total
        );

        let noise = NoiseModel::new()?;
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut samples = Vec::with_capacity(total);

        for crop in &self.roster {
            let profile = &self.profiles[crop];
            tracing::debug!(crop = %crop, ?profile, "Crop profile");
            for month in 1..=self.params.months {
                for _ in 0..self.params.samples_per_month {
                    let observation = synthesize_observation(month, &noise, &mut rng);
                    let label = (composite_suitability(profile, &observation)
                        + noise.label.sample(&mut rng))
                    .clamp(0.0, 1.0);
                    samples.push(TrainingSample::new(
                        crop.clone(),
                        observation,
                        round_to(label, 4),
                    ));
                }
            }
        }

        samples.shuffle(&mut rng);
        Ok(samples)
    }
}

fn synthesize_observation(month: u32, noise: &NoiseModel, rng: &mut StdRng) -> WeatherObservation {
    let temperature = clamp_to(
        seasonal_value(month, TEMP_BASE_C, TEMP_AMPLITUDE_C, 0.0) + noise.temperature.sample(rng),
        TEMP_BOUNDS_C,
    );

    let humidity = clamp_to(
        seasonal_value(month, HUMIDITY_BASE, HUMIDITY_AMPLITUDE, 0.0) + noise.humidity.sample(rng),
        HUMIDITY_BOUNDS,
    );

    let pressure = clamp_to(noise.pressure.sample(rng), PRESSURE_BOUNDS_HPA);

    // Positive-skewed: dry or average months are more likely than extreme wet ones
    let rain_base = seasonal_value(month, RAIN_BASE_MM, RAIN_AMPLITUDE_MM, RAIN_PHASE_SHIFT);
    let spread = rng.gen_range(RAIN_NOISE_RANGE_MM.0..RAIN_NOISE_RANGE_MM.1);
    let rainfall = clamp_to(
        rain_base + spread * noise.rain_skew.sample(rng).exp(),
        RAIN_BOUNDS_MM,
    );

    let wind = clamp_to(noise.wind.sample(rng), WIND_BOUNDS_MPS);

    WeatherObservation {
        temperature_c: round_to(temperature, 1),
        humidity_percent: round_to(humidity, 1),
        pressure_hpa: round_to(pressure, 1),
        rainfall_mm: Some(round_to(rainfall, 1)),
        wind_speed_mps: round_to(wind, 1),
        month,
    }
}

fn clamp_to(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
