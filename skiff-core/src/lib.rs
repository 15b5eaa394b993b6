//! skiff core library — domain types, config persistence, errors.
//!
//! Public API surface:
//! - [`types`] — [`Environment`], [`BucketName`] and friends
//! - [`config`] — `skiff.yaml` load / save
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, CONFIG_FILE_NAME};
pub use error::ConfigError;
pub use types::{BucketName, Buckets, Environment};
