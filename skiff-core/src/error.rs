//! Error types for skiff-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("no config found at {path}; run `skiff init` or `skiff create` first")]
    ConfigNotFound { path: PathBuf },

    /// An environment name outside the fixed set was given.
    #[error(
        "invalid environment '{name}' -- only development, staging, and production are available"
    )]
    InvalidEnvironment { name: String },
}
