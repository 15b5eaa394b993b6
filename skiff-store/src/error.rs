//! Error types for skiff-store.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from object-store and CDN operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No credentials available to reach the store. Raised by backends
    /// that talk to a real remote (see [`StoreError::auth_missing`]);
    /// the bundled filesystem and in-memory stores never produce it.
    #[error("no credentials set up; {hint}")]
    Auth { hint: String },

    /// The named bucket does not exist.
    #[error("bucket '{bucket}' not found")]
    BucketNotFound { bucket: String },

    /// A bucket with that name already exists.
    #[error("bucket '{bucket}' already exists")]
    BucketExists { bucket: String },

    /// The key is not present in the bucket.
    #[error("key '{key}' not found in bucket '{bucket}'")]
    KeyNotFound { bucket: String, key: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (metadata sidecars).
    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transport-level failure reported by the store or CDN backend.
    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// No credentials configured at all. Backends that talk to a real
    /// remote raise this before attempting any request.
    pub fn auth_missing() -> Self {
        StoreError::Auth {
            hint: "run \"aws configure\" first".to_string(),
        }
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_tell_the_user_what_to_run() {
        let err = StoreError::auth_missing();
        assert_eq!(
            err.to_string(),
            "no credentials set up; run \"aws configure\" first"
        );
    }
}
