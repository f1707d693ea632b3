//! Error types for the transfer radar.

use crate::config::ConfigError;

/// Main error type for the transfer radar.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Signal handler error: {0}")]
    Signal(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
