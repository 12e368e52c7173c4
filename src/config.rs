//! Runtime configuration.
//!
//! Values are layered: compiled defaults, then an optional TOML file, then
//! `WEATHERCAST_*` environment variables (`__` separates nested keys, e.g.
//! `WEATHERCAST_ESTIMATOR__KIND=model`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::utils::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_PATH, DEFAULT_MODEL_PATH,
    DEFAULT_NOISE_DELTA, DEFAULT_PLACES_PATH, DEFAULT_WEIGHTS, ENV_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Weighted deviation from batch medians plus uniform noise
    #[default]
    Heuristic,
    /// Pre-trained model artifact
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EstimatorConfig {
    pub kind: EstimatorKind,

    pub model_path: PathBuf,

    #[validate(range(min = 1))]
    pub chunk_size: usize,

    /// Weights for PS, QV2M, TQV and Var_TQV.
    pub weights: [f64; 4],

    #[validate(range(min = 0.0))]
    pub noise_delta: f64,

    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            kind: EstimatorKind::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            chunk_size: DEFAULT_CHUNK_SIZE,
            weights: DEFAULT_WEIGHTS,
            noise_delta: DEFAULT_NOISE_DELTA,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// CSV with `lat,lon,name,admin1,admin2,cc` columns.
    pub places_path: PathBuf,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            places_path: PathBuf::from(DEFAULT_PLACES_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub estimator: EstimatorConfig,
    pub geocoder: GeocoderConfig,
}

impl PipelineConfig {
    /// Load from `path` (or the default file name if present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: PipelineConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.estimator
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        // The noise range spans 2 * noise_delta
        if !(2.0 * self.estimator.noise_delta).is_finite() {
            return Err(PipelineError::Config(format!(
                "noise_delta must be finite and at most {}, got {}",
                f64::MAX / 2.0,
                self.estimator.noise_delta
            )));
        }

        if let Some(w) = self.estimator.weights.iter().find(|w| !w.is_finite()) {
            return Err(PipelineError::Config(format!(
                "Estimator weights must be finite, got {}",
                w
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.estimator.kind, EstimatorKind::Heuristic);
        assert_eq!(cfg.estimator.chunk_size, 1000);
        assert_eq!(cfg.estimator.weights, [0.2, 0.4, 0.3, 0.1]);
        assert_eq!(cfg.estimator.noise_delta, 0.1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
[database]
path = "/tmp/weather.db"

[estimator]
kind = "model"
chunk_size = 250
noise_delta = 0.0
seed = 7
"#
        )?;

        let cfg = PipelineConfig::load(Some(file.path()))?;
        assert_eq!(cfg.database.path, PathBuf::from("/tmp/weather.db"));
        assert_eq!(cfg.estimator.kind, EstimatorKind::Model);
        assert_eq!(cfg.estimator.chunk_size, 250);
        assert_eq!(cfg.estimator.noise_delta, 0.0);
        assert_eq!(cfg.estimator.seed, Some(7));
        // Untouched sections keep their defaults
        assert_eq!(cfg.estimator.weights, DEFAULT_WEIGHTS);
        assert_eq!(cfg.geocoder.places_path, PathBuf::from(DEFAULT_PLACES_PATH));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = PipelineConfig::load(Some(Path::new("/nonexistent/weather-predictor.toml")));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_environment_overrides() -> Result<()> {
        std::env::set_var("WEATHERCAST_ESTIMATOR__KIND", "model");
        std::env::set_var("WEATHERCAST_ESTIMATOR__MODEL_PATH", "/srv/models/env-model.json");
        let loaded = PipelineConfig::load(None);
        std::env::remove_var("WEATHERCAST_ESTIMATOR__KIND");
        std::env::remove_var("WEATHERCAST_ESTIMATOR__MODEL_PATH");

        let cfg = loaded?;
        assert_eq!(cfg.estimator.kind, EstimatorKind::Model);
        assert_eq!(cfg.estimator.model_path, PathBuf::from("/srv/models/env-model.json"));
        assert_eq!(cfg.estimator.chunk_size, DEFAULT_CHUNK_SIZE);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.estimator.chunk_size = 0;
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));

        let mut cfg = PipelineConfig::default();
        cfg.estimator.noise_delta = -0.5;
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));

        let mut cfg = PipelineConfig::default();
        cfg.estimator.noise_delta = f64::INFINITY;
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));

        let mut cfg = PipelineConfig::default();
        cfg.estimator.noise_delta = 1e308;
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));

        let mut cfg = PipelineConfig::default();
        cfg.estimator.noise_delta = 1e300;
        assert!(cfg.validate().is_ok());

        let mut cfg = PipelineConfig::default();
        cfg.estimator.weights = [0.2, f64::NAN, 0.3, 0.1];
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }
}
