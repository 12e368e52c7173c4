use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::EstimatorKind;
use crate::utils::constants::DEFAULT_SAMPLE_SIZE;

#[derive(Parser)]
#[command(name = "weather-predictor")]
#[command(about = "Batch weather prediction over stored observation parameters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Configuration file [default: weather-predictor.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress spinner")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Predict weather for every stored parameter row (default)
    Run {
        #[arg(short, long, value_enum, help = "Override the configured estimator")]
        estimator: Option<EstimatorKind>,

        #[arg(long, help = "Seed for the heuristic noise generator")]
        seed: Option<u64>,
    },

    /// Load mock observations into the parameter table
    Seed {
        #[arg(short, long, help = "Observation JSON file")]
        input: PathBuf,
    },

    /// Show table counts and sample predictions
    Info {
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        sample: usize,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            estimator: None,
            seed: None,
        }
    }
}
