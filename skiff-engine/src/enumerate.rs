//! Candidate file enumeration.
//!
//! Walks the configured root and applies the [`PatternFilter`], producing
//! `/`-separated relative keys regardless of host OS. Read-only; the
//! config file itself is always excluded so deployment config is never
//! published.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use skiff_core::CONFIG_FILE_NAME;

use crate::error::{io_err, SyncError};
use crate::filter::PatternFilter;

/// A file under the root that matched the include/ignore patterns.
/// Immutable for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// `/`-separated path relative to the root; doubles as the object key.
    pub key: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Byte length at enumeration time.
    pub len: u64,
}

/// Build the candidate filter for a config's pattern lists.
///
/// The config file name is always appended to the ignore list.
pub fn candidate_filter(include: &[String], ignore: &[String]) -> Result<PatternFilter, SyncError> {
    let mut ignore = ignore.to_vec();
    ignore.push(CONFIG_FILE_NAME.to_string());
    PatternFilter::new(include, &ignore)
}

/// Enumerate candidate files under `root`.
///
/// Fails fast with [`SyncError::RootMissing`] when the root does not
/// exist. Results are sorted by key for deterministic logs; callers must
/// not rely on any particular order beyond that.
pub fn enumerate(root: &Path, filter: &PatternFilter) -> Result<Vec<Candidate>, SyncError> {
    if !root.is_dir() {
        return Err(SyncError::RootMissing {
            path: root.to_path_buf(),
        });
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => io_err(&path, io),
                None => io_err(&path, std::io::Error::other("walk failed")),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !filter.matches(&key) {
            continue;
        }
        let len = entry
            .metadata()
            .map_err(|e| {
                match e.into_io_error() {
                    Some(io) => io_err(entry.path(), io),
                    None => io_err(entry.path(), std::io::Error::other("metadata failed")),
                }
            })?
            .len();
        candidates.push(Candidate {
            key,
            path: entry.path().to_path_buf(),
            len,
        });
    }
    candidates.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(candidates)
}
