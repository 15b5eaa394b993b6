//! Domain types for skiff.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a remote bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketName(pub String);

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BucketName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BucketName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// A deployment environment. Each maps to exactly one remote bucket in the
/// persisted config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// All environments, in promotion order.
    pub fn all() -> &'static [Environment] {
        &[
            Environment::Development,
            Environment::Staging,
            Environment::Production,
        ]
    }

    /// Whether deployed content in this environment may be indexed by
    /// search engines. Only production gets `"all"`; every other
    /// environment is stamped `"noindex"` so crawlers never surface
    /// staging/dev mirrors.
    pub fn robots_directive(self) -> &'static str {
        match self {
            Environment::Production => "all",
            _ => "noindex",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidEnvironment {
                name: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// The environment → bucket mapping from the persisted config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buckets {
    pub development: BucketName,
    pub staging: BucketName,
    pub production: BucketName,
}

impl Buckets {
    /// The bucket bound to `env`.
    pub fn bucket_for(&self, env: Environment) -> &BucketName {
        match env {
            Environment::Development => &self.development,
            Environment::Staging => &self.staging,
            Environment::Production => &self.production,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_display_roundtrips_through_from_str() {
        for env in Environment::all() {
            let parsed: Environment = env.to_string().parse().expect("parse");
            assert_eq!(parsed, *env);
        }
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "prod".parse::<Environment>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvironment { .. }));
        assert!(err.to_string().contains("prod"));
    }

    #[test]
    fn only_production_is_indexable() {
        assert_eq!(Environment::Production.robots_directive(), "all");
        assert_eq!(Environment::Staging.robots_directive(), "noindex");
        assert_eq!(Environment::Development.robots_directive(), "noindex");
    }

    #[test]
    fn bucket_for_maps_each_environment() {
        let buckets = Buckets {
            development: BucketName::from("dev-www.example.com"),
            staging: BucketName::from("stg-www.example.com"),
            production: BucketName::from("www.example.com"),
        };
        assert_eq!(
            buckets.bucket_for(Environment::Development).0,
            "dev-www.example.com"
        );
        assert_eq!(
            buckets.bucket_for(Environment::Production).0,
            "www.example.com"
        );
    }

    #[test]
    fn bucket_name_serializes_transparently() {
        let yaml = serde_yaml::to_string(&BucketName::from("www.example.com")).unwrap();
        assert_eq!(yaml.trim(), "www.example.com");
    }
}
