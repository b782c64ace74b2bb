//! Error types for edgeshim configuration

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config document is not valid YAML for `ComposerConfig`
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config parsed but holds unusable values
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
