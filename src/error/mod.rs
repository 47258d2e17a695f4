//! Error handling module for the application edge

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors raised while assembling or launching a job
#[derive(Error, Debug)]
pub enum ReelError {
    /// Invalid or inconsistent configuration value
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Unsupported configuration file type
    #[error("Unsupported config file format: {path}. Expected .toml, .json, .yaml or .yml")]
    UnsupportedConfigFormat { path: String },

    /// TOML parse error
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Domain rule violation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ReelError {
    pub fn config(message: impl Into<String>) -> Self {
        ReelError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for application-edge operations
pub type ReelResult<T> = std::result::Result<T, ReelError>;
