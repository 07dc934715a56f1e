use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cropcast", version, about = "Weather-driven crop suitability ranking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the dataset/model data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the synthetic training corpus as CSV
    Generate {
        /// Output CSV path (defaults to the configured dataset path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the generation seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override samples per crop per month
        #[arg(long)]
        samples_per_month: Option<usize>,
    },
    /// Train the ensemble on a CSV corpus and save the model
    Train {
        /// Input CSV path (defaults to the configured dataset path)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Model output path (defaults to the configured model path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rank crops for the current weather at a location
    Rank {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Rank crops for a manually supplied observation
    Predict {
        /// Air temperature, °C
        #[arg(long, allow_hyphen_values = true)]
        temperature: f64,
        /// Relative humidity, %
        #[arg(long)]
        humidity: f64,
        /// Pressure, hPa
        #[arg(long)]
        pressure: f64,
        /// Wind speed, m/s
        #[arg(long)]
        wind: f64,
        /// Monthly rainfall, mm (imputed when omitted)
        #[arg(long)]
        rainfall: Option<f64>,
        /// Month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Re-run interactive setup
    Init,
    /// Validate config, roster, model and test connections
    Check,
}
