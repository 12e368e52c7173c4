/// Table names
pub const PARAMS_TABLE: &str = "params";
pub const PREDICTION_TABLE: &str = "prediction";

/// Configuration
pub const ENV_PREFIX: &str = "WEATHERCAST";
pub const DEFAULT_CONFIG_FILE: &str = "weather-predictor.toml";

/// File locations
pub const DEFAULT_DATABASE_PATH: &str = "weatherapp.db";
pub const DEFAULT_MODEL_PATH: &str = "MLmodel/model.json.gz";
pub const DEFAULT_PLACES_PATH: &str = "data/cities1000.csv";

/// Heuristic estimator defaults (PS, QV2M, TQV, Var_TQV)
pub const DEFAULT_WEIGHTS: [f64; 4] = [0.2, 0.4, 0.3, 0.1];
pub const DEFAULT_NOISE_DELTA: f64 = 0.1;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_SAMPLE_SIZE: usize = 10;
