//! Error types for skiff-engine.

use std::path::PathBuf;

use thiserror::Error;

use skiff_core::ConfigError;
use skiff_store::StoreError;

/// All errors that can arise from deploy and promote runs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A configuration error (missing config, invalid environment, ...).
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An error from the object store or CDN backend.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The configured root directory does not exist. Fatal; not retried.
    #[error("root directory {path} does not exist")]
    RootMissing { path: PathBuf },

    /// An include/ignore glob pattern failed to compile.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
