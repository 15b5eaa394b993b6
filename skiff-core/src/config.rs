//! Persisted `skiff.yaml` project configuration.
//!
//! # Storage layout
//!
//! ```text
//! <project dir>/
//!   skiff.yaml    (app name, file root, include/ignore patterns, buckets)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(dir: &Path, …)` — explicit project dir; used in tests with `TempDir`
//! - `fn(…)` — uses the current working directory, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Buckets;

/// Name of the config file at the project root. Always excluded from
/// deploys so credentials/bucket names are never published.
pub const CONFIG_FILE_NAME: &str = "skiff.yaml";

/// The persisted project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application name, used only for display and bucket-name defaults.
    pub name: String,
    /// Root directory the candidate file set is enumerated from,
    /// relative to the project dir (or absolute).
    pub root: PathBuf,
    /// Include glob patterns. Empty means "everything, any depth".
    #[serde(default)]
    pub include: Vec<String>,
    /// Exclude glob patterns, applied after includes.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Environment → bucket mapping.
    pub buckets: Buckets,
    /// When this config was first written. Backfilled to load time for
    /// configs written by hand without the field.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Config {
    /// Absolute root directory, resolved against `dir`.
    pub fn root_at(&self, dir: &Path) -> PathBuf {
        if self.root.is_absolute() {
            self.root.clone()
        } else {
            dir.join(&self.root)
        }
    }
}

/// `<dir>/skiff.yaml` — pure, no I/O.
pub fn config_path_at(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load the config from `<dir>/skiff.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(dir);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper for the current working directory.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&std::env::current_dir()?)
}

/// Save the config to `<dir>/skiff.yaml` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(dir: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = config_path_at(dir);
    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, &yaml)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper for the current working directory.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&std::env::current_dir()?, config)
}
