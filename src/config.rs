use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use validator::{Validate, ValidationError};

use crate::error::ConfigError;

/// Connection parameters for the MySQL server holding the `jobs` table
#[derive(Clone, Debug, Validate)]
pub struct DatabaseConfig {
    #[validate(length(min = 1, message = "MYSQL_HOST must not be empty"))]
    pub host: String,

    #[validate(range(min = 1, message = "MYSQL_PORT must be non-zero"))]
    pub port: u16,

    #[validate(length(min = 1, message = "MYSQL_USER must not be empty"))]
    pub user: String,

    pub password: String,

    /// Schema (database) name. Interpolated into `CREATE DATABASE`, so it is
    /// restricted to identifier characters.
    #[validate(
        length(min = 1, max = 64, message = "MYSQL_DATABASE must be 1-64 characters"),
        custom(function = "validate_schema_name")
    )]
    pub database: String,

    /// Issue `CREATE DATABASE IF NOT EXISTS` before connecting to the schema
    pub create_database: bool,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug, Validate)]
pub struct Config {
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Raw scraped CSV read by the clean step
    pub raw_csv_path: PathBuf,

    /// Cleaned CSV written by the clean step and read by the load step
    pub cleaned_csv_path: PathBuf,

    /// Rows per INSERT statement / transaction
    /// Default: 500
    #[validate(range(min = 1, max = 5000, message = "LOAD_BATCH_SIZE must be between 1 and 5000"))]
    pub batch_size: usize,

    /// Directory for the rolling log files
    pub log_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Optional environment variables:
    /// - MYSQL_HOST (default: localhost)
    /// - MYSQL_PORT (default: 3306)
    /// - MYSQL_USER (default: root)
    /// - MYSQL_PASSWORD (default: empty)
    /// - MYSQL_DATABASE (default: job_analysis_db)
    /// - MYSQL_CREATE_DATABASE (default: true)
    /// - RAW_CSV_PATH (default: job_data.csv)
    /// - CLEANED_CSV_PATH (default: cleaned_jobs_simple.csv)
    /// - LOAD_BATCH_SIZE (default: 500)
    /// - LOG_DIR (default: logs)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            host: text("MYSQL_HOST", "localhost"),
            port: parse_or(&lookup, "MYSQL_PORT", 3306)?,
            user: text("MYSQL_USER", "root"),
            password: text("MYSQL_PASSWORD", ""),
            database: text("MYSQL_DATABASE", "job_analysis_db"),
            create_database: parse_flag(&lookup, "MYSQL_CREATE_DATABASE", true)?,
        };

        let config = Config {
            database,
            raw_csv_path: PathBuf::from(text("RAW_CSV_PATH", "job_data.csv")),
            cleaned_csv_path: PathBuf::from(text("CLEANED_CSV_PATH", "cleaned_jobs_simple.csv")),
            batch_size: parse_or(&lookup, "LOAD_BATCH_SIZE", 500)?,
            log_dir: text("LOG_DIR", "logs"),
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value }),
        },
    }
}

fn validate_schema_name(name: &str) -> Result<(), ValidationError> {
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("schema_name");
        err.message = Some("MYSQL_DATABASE may only contain letters, digits, '_' and '$'".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.database, "job_analysis_db");
        assert!(config.database.create_database);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.cleaned_csv_path, PathBuf::from("cleaned_jobs_simple.csv"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("MYSQL_HOST", "db.internal"),
            ("MYSQL_PORT", "3307"),
            ("MYSQL_DATABASE", "jobs_test"),
            ("MYSQL_CREATE_DATABASE", "false"),
            ("LOAD_BATCH_SIZE", "250"),
        ]))
        .unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.database, "jobs_test");
        assert!(!config.database.create_database);
        assert_eq!(config.batch_size, 250);
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("MYSQL_PORT", "mysql")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "MYSQL_PORT", .. }));
    }

    #[test]
    fn zero_batch_size_fails_validation() {
        let err = Config::from_lookup(lookup_from(&[("LOAD_BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn schema_name_must_be_an_identifier() {
        let err = Config::from_lookup(lookup_from(&[("MYSQL_DATABASE", "jobs; DROP")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
