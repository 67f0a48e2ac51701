//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `mapcard.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recorder database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Poll loop settings.
    pub runner: RunnerConfig,
    /// Card configuration, passed as-is to the card's own validation.
    pub card: toml::Table,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Poll loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Seconds between two reads of the recorder.
    pub poll_secs: u64,
    /// Render once, wait for the initial history and exit.
    pub once: bool,
    /// JSON file of entity states recorded at startup.
    pub import: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `mapcard.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, AppConfigError> {
        let mut config = Self::from_file("mapcard.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, AppConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(AppConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MAPCARD_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("MAPCARD_POLL_SECS")
            && let Ok(secs) = val.parse()
        {
            self.runner.poll_secs = secs;
        }
        if let Ok(val) = std::env::var("MAPCARD_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), AppConfigError> {
        if self.runner.poll_secs == 0 {
            return Err(AppConfigError::Validation(
                "poll_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// The `[card]` table as a JSON value; `null` when the table is empty so
    /// that the card reports its missing-configuration error.
    ///
    /// # Errors
    ///
    /// Returns an error if a TOML value has no JSON counterpart.
    pub fn card_value(&self) -> Result<serde_json::Value, AppConfigError> {
        if self.card.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::to_value(&self.card).map_err(AppConfigError::Card)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:mapcard.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mapcardd=info,mapcard_app=info,mapcard_adapter_recorder_sqlite_sqlx=info"
                .to_string(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_secs: 5,
            once: false,
            import: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// The `[card]` table cannot be expressed as JSON.
    #[error("failed to convert card configuration")]
    Card(#[source] serde_json::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
