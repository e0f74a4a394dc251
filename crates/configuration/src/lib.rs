//! # FundScope Configuration
//!
//! Loads the strongly-typed `Config` and installs the tracing subscriber.
//!
//! Sources are layered: built-in defaults, then `fundscope.toml` (optional),
//! then `FUNDSCOPE__SECTION__KEY` environment variables, which may also come
//! from a `.env` file.

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DataConfig, FetchConfig, LoggingConfig, MetricsConfig, Normalization, RankingConfig,
};

/// The file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fundscope.toml";

/// Loads and validates the application configuration.
///
/// A missing file is fine; every field falls back to its default. A file
/// that exists but does not parse is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    let builder = config::Config::builder()
        .add_source(config::File::from(file).required(path.is_some()))
        .add_source(
            config::Environment::with_prefix("FUNDSCOPE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Rejects settings that would make every later computation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ppy) = self.metrics.periods_per_year {
            if !(ppy.is_finite() && ppy > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "metrics.periods_per_year must be positive, got {ppy}"
                )));
            }
        }
        if !self.metrics.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "metrics.risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.ranking.weights.is_empty() {
            return Err(ConfigError::ValidationError(
                "ranking.weights must name at least one metric".to_string(),
            ));
        }
        if let Some((name, _)) = self.ranking.weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "ranking.weights.{name} must be a finite number"
            )));
        }
        if self.fetch.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.chunk_size must be at least 1".to_string(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
