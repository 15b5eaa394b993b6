//! Include/ignore glob matching as a pure predicate over keys.
//!
//! Built once per run from the config's pattern lists; traversal and
//! matching stay separate so the predicate is unit-testable without
//! touching disk.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::SyncError;

/// A compiled include/ignore pattern pair.
///
/// A key is a candidate when it matches at least one include pattern and
/// no ignore pattern. Patterns use `**`-style recursive globs; an empty
/// include list means "everything, any depth".
#[derive(Debug)]
pub struct PatternFilter {
    include: GlobSet,
    ignore: GlobSet,
}

impl PatternFilter {
    /// Compile the pattern lists. Empty `include` defaults to `**`.
    pub fn new(include: &[String], ignore: &[String]) -> Result<Self, SyncError> {
        let mut builder = GlobSetBuilder::new();
        if include.is_empty() {
            builder.add(glob("**")?);
        } else {
            for pattern in include {
                builder.add(glob(pattern)?);
            }
        }
        let include = builder.build()?;

        let mut builder = GlobSetBuilder::new();
        for pattern in ignore {
            builder.add(glob(pattern)?);
        }
        let ignore = builder.build()?;

        Ok(Self { include, ignore })
    }

    /// Whether a `/`-separated relative key is in the candidate set.
    pub fn matches(&self, key: &str) -> bool {
        self.include.is_match(key) && !self.ignore.is_match(key)
    }
}

fn glob(pattern: &str) -> Result<Glob, SyncError> {
    Ok(Glob::new(pattern)?)
}
