use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands};
use crate::config::{EstimatorKind, PipelineConfig};
use crate::db::Database;
use crate::error::{PipelineError, Result};
use crate::geocoding::LazyPlaceIndex;
use crate::processors::{
    HeuristicEstimator, ModelEstimator, PipelineDriver, PipelineOutcome, WeatherEstimator,
};
use crate::readers::{PredictionReader, SeedReader, SqliteParameterSource};
use crate::utils::constants::{PARAMS_TABLE, PREDICTION_TABLE};
use crate::utils::progress::ProgressReporter;
use crate::writers::{ParamWriter, SqlitePredictionSink};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    tracing::debug!("Configuration: {:?}", config);

    match cli.command.unwrap_or_default() {
        Commands::Run { estimator, seed } => {
            if let Some(kind) = estimator {
                config.estimator.kind = kind;
            }
            if seed.is_some() {
                config.estimator.seed = seed;
            }

            let progress = ProgressReporter::new_spinner("Starting pipeline...", cli.quiet);
            match run_pipeline(&config, progress)? {
                PipelineOutcome::NoInput => {
                    println!("No parameter rows found - nothing written");
                }
                PipelineOutcome::Completed { inserted } => {
                    println!("Inserted {} predictions", inserted);
                }
            }
        }

        Commands::Seed { input } => {
            println!("Seeding parameters from {}", input.display());

            let observations = SeedReader::new().read_file(&input)?;
            let db = Database::from_config(&config.database);
            let written = ParamWriter::new(db).insert_observations(&observations)?;

            println!("Inserted {} parameter rows", written);
        }

        Commands::Info { sample } => {
            let db = Database::from_config(&config.database);
            println!("Database: {}", db.path().display());
            println!("  {}: {} rows", PARAMS_TABLE, db.count_rows(PARAMS_TABLE)?);
            println!("  {}: {} rows", PREDICTION_TABLE, db.count_rows(PREDICTION_TABLE)?);

            if sample > 0 {
                let records = PredictionReader::new(db).read_sample(sample)?;
                println!("\nSample Predictions (showing {} records):", records.len());
                for (i, r) in records.iter().enumerate() {
                    println!(
                        "{}. {}, {}, {} ({:.4}, {:.4}) on {}: {:.2} [params #{}]",
                        i + 1,
                        r.city,
                        r.region,
                        r.country,
                        r.latitude,
                        r.longitude,
                        r.date,
                        r.predicted_weather,
                        r.params_id
                    );
                }
            }
        }
    }

    Ok(())
}

/// Build every component from `config` and run the pipeline once.
///
/// The model artifact is loaded before the database is touched, so a bad
/// artifact fails the run without any query. The place index is read only
/// once there are rows to resolve.
pub fn run_pipeline(config: &PipelineConfig, progress: ProgressReporter) -> Result<PipelineOutcome> {
    let estimator: Box<dyn WeatherEstimator> = match config.estimator.kind {
        EstimatorKind::Heuristic => Box::new(HeuristicEstimator::from_config(&config.estimator)),
        EstimatorKind::Model => Box::new(ModelEstimator::from_config(&config.estimator)?),
    };
    tracing::info!("Using {} estimator", estimator.name());

    let db = Database::from_config(&config.database);
    let mut driver = PipelineDriver::new(
        SqliteParameterSource::new(db.clone()),
        estimator,
        LazyPlaceIndex::new(&config.geocoder.places_path),
        SqlitePredictionSink::new(db),
    )
    .with_progress(progress);

    driver.run()
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| PipelineError::Config(format!("Failed to initialise logging: {}", e)))
}
