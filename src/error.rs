use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database connection error for '{path}': {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database query error: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Database write error: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("Failed to load model '{path}': {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("Geocode lookup error: {0}")]
    GeocodeLookup(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
