mod agronomy;
mod cli;
mod config;
mod datasources;
mod error;
mod models;
mod ranking;
mod regression;

use agronomy::{dataset, SyntheticDatasetGenerator};
use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{builtin_roster, FileRosterSource, OpenWeatherMapClient};
use models::{CurrentConditions, RankedPrediction, Roster};
use ranking::RankingService;
use regression::{FileModelStore, ModelStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration; init writes a fresh one instead
    let config = match cli.command {
        Commands::Init => Config::default(),
        _ => Config::load(cli.config.as_ref()).context("Configuration error")?,
    };
    let data_dir = cli.data_dir.as_ref();

    match cli.command {
        Commands::Generate {
            output,
            seed,
            samples_per_month,
        } => {
            let mut params = config.generation;
            if let Some(seed) = seed {
                params.seed = seed;
            }
            if let Some(n) = samples_per_month {
                params.samples_per_month = n;
            }
            let path = resolve(output, config.dataset_path(data_dir))?;
            let roster = load_roster(&config)?;

            let samples = SyntheticDatasetGenerator::new(&roster, params)
                .and_then(|g| g.generate())
                .context("Dataset generation failed")?;
            dataset::save(&path, &samples)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!("Wrote {} samples to {}", samples.len(), path.display());
        }
        Commands::Train { dataset, output } => {
            let dataset_path = resolve(dataset, config.dataset_path(data_dir))?;
            let model_path = resolve(output, config.model_path(data_dir))?;
            let roster = load_roster(&config)?;

            let samples = dataset::load(&dataset_path)
                .with_context(|| format!("Failed to read {}", dataset_path.display()))?;
            let report = regression::train(&samples, &roster.names, &config.training)
                .context("Training failed")?;
            FileModelStore::new(&model_path)
                .save(&report.model)
                .with_context(|| format!("Failed to save model to {}", model_path.display()))?;

            println!(
                "Trained on {} rows, {} held out",
                report.train_rows, report.held_out_rows
            );
            match report.held_out_mse {
                Some(mse) => println!("Held-out MSE: {:.4}", mse),
                None => println!("Held-out MSE: n/a (no held-out rows)"),
            }
            println!("Model saved to {}", model_path.display());
        }
        Commands::Rank { lat, lon, month } => {
            let owm = config
                .weather()
                .cloned()
                .context("OpenWeatherMap is not configured; run `cropcast init`")?;
            let lat = lat
                .or(owm.latitude)
                .context("No latitude given and none configured")?;
            let lon = lon
                .or(owm.longitude)
                .context("No longitude given and none configured")?;

            let service = ranking_service(&config, data_dir)?;
            let conditions = OpenWeatherMapClient::new(owm)
                .fetch_current(lat, lon)
                .await
                .context("Failed to fetch current weather")?;

            let ranked = service
                .rank(conditions, month.unwrap_or_else(current_month))
                .context("Ranking failed")?;
            print_ranking(&ranked)?;
        }
        Commands::Predict {
            temperature,
            humidity,
            pressure,
            wind,
            rainfall,
            month,
        } => {
            let service = ranking_service(&config, data_dir)?;
            let conditions = CurrentConditions {
                temperature_c: temperature,
                humidity_percent: humidity,
                pressure_hpa: pressure,
                wind_speed_mps: wind,
                rainfall_mm: rainfall,
            };

            let ranked = service
                .rank(conditions, month.unwrap_or_else(current_month))
                .context("Ranking failed")?;
            print_ranking(&ranked)?;
        }
        Commands::Check => run_check(&config, data_dir).await?,
        Commands::Init => {
            Config::setup_interactive().context("Interactive setup failed")?;
        }
    }

    Ok(())
}

fn resolve(
    explicit: Option<PathBuf>,
    configured: error::Result<PathBuf>,
) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p),
        None => configured.context("Cannot resolve data path"),
    }
}

fn load_roster(config: &Config) -> anyhow::Result<Roster> {
    match &config.roster.crops_file {
        Some(path) => FileRosterSource::new(path, config.roster.countries_file.clone())
            .load()
            .context("Failed to load crop roster"),
        None => Ok(builtin_roster()),
    }
}

fn ranking_service(config: &Config, data_dir: Option<&PathBuf>) -> anyhow::Result<RankingService> {
    let roster = load_roster(config)?;
    let model_path = config.model_path(data_dir)?;
    let model = FileModelStore::new(&model_path)
        .load()
        .context("Model unavailable")?;
    Ok(RankingService::new(roster, Arc::new(model)))
}

fn current_month() -> u32 {
    chrono::Local::now().month()
}

fn print_ranking(ranked: &[RankedPrediction]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(ranked)?);
    Ok(())
}

async fn run_check(config: &Config, data_dir: Option<&PathBuf>) -> anyhow::Result<()> {
    println!("Configuration: OK");

    let roster = match load_roster(config) {
        Ok(r) => {
            println!("Roster: OK ({} crops)", r.len());
            Some(r)
        }
        Err(e) => {
            println!("Roster: FAILED ({:#})", e);
            None
        }
    };

    let model_path = config.model_path(data_dir)?;
    let store = FileModelStore::new(&model_path);
    if !store.exists() {
        println!("Model: MISSING ({}), run `cropcast train`", model_path.display());
    } else {
        match store.load() {
            Ok(model) => {
                let mse = model
                    .held_out_mse
                    .map(|m| format!("{:.4}", m))
                    .unwrap_or_else(|| "n/a".into());
                println!(
                    "Model: OK (trained {}, {} crops, held-out MSE {})",
                    model.trained_at.format("%Y-%m-%d %H:%M UTC"),
                    model.crops().len(),
                    mse
                );
                if let Some(roster) = &roster {
                    let unknown: Vec<&str> = roster
                        .names
                        .iter()
                        .filter(|c| model.crop_id(c).is_none())
                        .map(String::as_str)
                        .collect();
                    if !unknown.is_empty() {
                        println!("  Warning: model does not know {}", unknown.join(", "));
                    }
                }
            }
            Err(e) => println!("Model: FAILED ({})", e),
        }
    }

    match config.weather() {
        Some(owm) => match (owm.latitude, owm.longitude) {
            (Some(lat), Some(lon)) => {
                let client = OpenWeatherMapClient::new(owm.clone());
                match client.test_connection(lat, lon).await {
                    Ok(true) => println!("OpenWeatherMap: OK"),
                    Ok(false) => println!("OpenWeatherMap: FAILED (bad response)"),
                    Err(e) => println!("OpenWeatherMap: FAILED ({})", e),
                }
            }
            _ => println!("OpenWeatherMap: SKIPPED (no default coordinates)"),
        },
        None => println!("OpenWeatherMap: not configured"),
    }

    Ok(())
}
