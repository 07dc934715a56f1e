use crate::agronomy::GenerationParams;
use crate::error::{CropCastError, Result};
use crate::regression::TrainingOptions;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub generation: GenerationParams,
    #[serde(default)]
    pub training: TrainingOptions,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub openweathermap: Option<OpenWeatherMapConfig>,
}

/// Roster files; without a crops file the built-in roster is used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RosterConfig {
    pub crops_file: Option<PathBuf>,
    pub countries_file: Option<PathBuf>,
}

/// Artifact locations; unset paths resolve inside the data directory.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathsConfig {
    pub dataset: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    /// Default coordinates when none are given on the command line
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Config {
    /// Load from the override path or the standard locations.
    ///
    /// An explicit path must exist; otherwise a missing file means defaults.
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(CropCastError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p.clone()
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropCastError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&config_str)?;
        tracing::info!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| CropCastError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.training.test_fraction) {
            return Err(CropCastError::Config(format!(
                "training.test_fraction must be in [0, 1), got {}",
                self.training.test_fraction
            )));
        }
        if self.generation.months > 12 {
            return Err(CropCastError::Config(format!(
                "generation.months must be at most 12, got {}",
                self.generation.months
            )));
        }
        if self.training.neighbors == 0 {
            return Err(CropCastError::Config(
                "training.neighbors must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Try XDG config directory
        dirs::config_dir()
            .map(|dir| dir.join("cropcast").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/cropcast/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropCastError::Config("Cannot determine config directory".into()))?
            .join("cropcast");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up CropCast!");
        println!();

        // --- Roster ---
        println!("Crop roster (leave blank for the built-in U.S. top-10 roster)");
        let crops_file: String = Input::new()
            .with_prompt("  crops.txt path")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?;

        let countries_file: String = if crops_file.is_empty() {
            String::new()
        } else {
            Input::new()
                .with_prompt("  countries.txt path")
                .default(String::new())
                .allow_empty(true)
                .interact_text()
                .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?
        };

        println!();

        // --- Generation ---
        println!("Synthetic dataset");
        let seed: u64 = Input::new()
            .with_prompt("  Seed")
            .default(42)
            .interact_text()
            .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?;

        let samples_per_month: usize = Input::new()
            .with_prompt("  Samples per crop per month")
            .default(100)
            .interact_text()
            .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- OpenWeatherMap (optional) ---
        println!("OpenWeatherMap (leave API key blank to skip)");
        let owm_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?;

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            let latitude: f64 = Input::new()
                .with_prompt("  Default latitude")
                .default(41.8781)
                .interact_text()
                .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?;

            let longitude: f64 = Input::new()
                .with_prompt("  Default longitude")
                .default(-87.6298)
                .interact_text()
                .map_err(|e| CropCastError::Config(format!("Input error: {}", e)))?;

            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                latitude: Some(latitude),
                longitude: Some(longitude),
                enabled: true,
            })
        };

        println!();

        let non_empty = |s: String| (!s.is_empty()).then(|| PathBuf::from(s));
        let config = Config {
            roster: RosterConfig {
                crops_file: non_empty(crops_file),
                countries_file: non_empty(countries_file),
            },
            generation: GenerationParams {
                seed,
                samples_per_month,
                ..GenerationParams::default()
            },
            training: TrainingOptions {
                seed,
                ..TrainingOptions::default()
            },
            paths: PathsConfig::default(),
            openweathermap,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| CropCastError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# CropCast Configuration\n# Generated by `cropcast init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| CropCastError::Config(format!("Bad substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("CROPCAST_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropCastError::Config("Cannot determine data directory".into()))?
            .join("cropcast");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn dataset_path(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        match &self.paths.dataset {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir(data_dir_override)?.join("dataset.csv")),
        }
    }

    pub fn model_path(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        match &self.paths.model {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir(data_dir_override)?.join("model.json")),
        }
    }

    /// OpenWeatherMap settings, if configured with a key and enabled.
    pub fn weather(&self) -> Option<&OpenWeatherMapConfig> {
        self.openweathermap
            .as_ref()
            .filter(|c| c.enabled && !c.api_key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse("{}").unwrap();
        assert_eq!(config.generation, GenerationParams::default());
        assert_eq!(config.training, TrainingOptions::default());
        assert!(config.roster.crops_file.is_none());
        assert!(config.weather().is_none());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let yaml = "
generation:
  samples_per_month: 20
training:
  forest_trees: 10
paths:
  model: /tmp/model.json
";
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.generation.samples_per_month, 20);
        assert_eq!(config.generation.seed, 42);
        assert_eq!(config.training.forest_trees, 10);
        assert_eq!(config.training.neighbors, 5);
        assert_eq!(
            config.model_path(None).unwrap(),
            PathBuf::from("/tmp/model.json")
        );
    }

    #[test]
    fn env_vars_substituted() {
        std::env::set_var("CROPCAST_TEST_OWM_KEY", "abc123");
        let yaml = "
openweathermap:
  api_key: ${CROPCAST_TEST_OWM_KEY}
  latitude: 41.9
";
        let config = Config::parse(yaml).unwrap();
        let owm = config.weather().unwrap();
        assert_eq!(owm.api_key, "abc123");
        assert_eq!(owm.latitude, Some(41.9));
        assert!(owm.enabled);
    }

    #[test]
    fn disabled_weather_is_ignored() {
        let yaml = "
openweathermap:
  api_key: key
  enabled: false
";
        assert!(Config::parse(yaml).unwrap().weather().is_none());
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let owm = OpenWeatherMapConfig {
            api_key: "secret".into(),
            latitude: None,
            longitude: None,
            enabled: true,
        };
        let debug = format!("{:?}", owm);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(Config::parse("training:\n  test_fraction: 1.5\n").is_err());
        assert!(Config::parse("generation:\n  months: 13\n").is_err());
        assert!(Config::parse("training:\n  neighbors: 0\n").is_err());
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let missing = PathBuf::from("/definitely/not/here/config.yaml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
