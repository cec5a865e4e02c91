//! Shared configuration for the tickersent workspace.

pub mod app_config;
pub mod config;
pub mod tickers;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use tickers::{load_tickers, validate_symbol, TickerConfig, TickersFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tickers file {path}: {source}")]
    TickersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tickers file: {0}")]
    TickersFileParse(#[from] serde_yaml::Error),

    #[error("tickers validation failed: {0}")]
    Validation(String),
}
