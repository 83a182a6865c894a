use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// The assembled configuration failed its validation rules
    #[error("configuration failed validation: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Errors raised by the Normalizer
///
/// Bad cells are never errors; only problems with the file as a whole end up here.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The header row produced no usable column labels
    #[error("{0} has no header row")]
    EmptyHeader(PathBuf),
}

/// Errors raised by the Loader
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cleaned file {0} not found, run the clean step first")]
    SourceMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cleaned CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cleaned file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("could not connect to MySQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to ensure schema: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A batch insert failed; its transaction was rolled back and the load stopped
    #[error("batch {batch} failed after {committed} committed batches: {source}")]
    Batch {
        batch: usize,
        committed: usize,
        #[source]
        source: sqlx::Error,
    },
}
