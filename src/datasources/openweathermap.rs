use crate::config::OpenWeatherMapConfig;
use crate::error::{CropCastError, Result};
use crate::models::CurrentConditions;
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap current weather response (metric units)
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    wind: OwmWind,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch current conditions at a coordinate. No retries or caching.
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentConditions> {
        validate_coordinates(lat, lon)?;

        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, lat, lon, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                CropCastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CropCastError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        parse_current(&body)
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self, lat: f64, lon: f64) -> Result<bool> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, lat, lon, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                CropCastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        Ok(response.status().is_success())
    }
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(CropCastError::InvalidInput(format!(
            "coordinates ({}, {}) out of range",
            lat, lon
        )));
    }
    Ok(())
}

fn parse_current(body: &str) -> Result<CurrentConditions> {
    let owm: OwmCurrentResponse = serde_json::from_str(body).map_err(|e| {
        CropCastError::DataSourceUnavailable(format!(
            "Failed to parse OpenWeatherMap response: {}",
            e
        ))
    })?;

    tracing::debug!(
        location = owm.name.as_deref().unwrap_or("Unknown Location"),
        temp = owm.main.temp,
        humidity = owm.main.humidity,
        "Current conditions"
    );

    Ok(CurrentConditions {
        temperature_c: owm.main.temp,
        humidity_percent: owm.main.humidity,
        pressure_hpa: owm.main.pressure,
        wind_speed_mps: owm.wind.speed,
        // Current weather carries at most the last hour of rain, not a monthly
        // total; leave it to the imputer
        rainfall_mm: None,
    })
}
