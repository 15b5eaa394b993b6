//! # skiff-store
//!
//! Object-store and CDN capability traits, plus the implementations that
//! ship with skiff: an in-memory store for tests and a filesystem-backed
//! store the CLI uses. A real S3/CloudFront client would implement the
//! same traits; the sync engine never sees past them.

pub mod error;
pub mod fs;
pub mod memory;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use skiff_core::BucketName;

pub use error::StoreError;
pub use fs::FsObjectStore;
pub use memory::{MemoryCdn, MemoryObjectStore};

// ---------------------------------------------------------------------------
// Object metadata
// ---------------------------------------------------------------------------

/// Metadata stored alongside an object's bytes.
///
/// The `hash` field carries the content digest stamped at upload time; it
/// is the sole change-detection signal the reconciler consults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Hex-encoded content digest, set by the uploader and re-stamped on copy.
    pub hash: Option<String>,
    /// MIME type guessed from the key's extension.
    pub content_type: Option<String>,
    /// `X-Robots-Tag` indexing directive ("all" or "noindex").
    pub robots: Option<String>,
    /// Whether the object is publicly readable.
    pub public: bool,
}

/// An object key together with its stored metadata, as returned by
/// [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub meta: ObjectMeta,
}

/// A content-delivery distribution fronting some origin host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub id: String,
    pub origin_host: String,
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// The object-store capability consumed by the sync engine.
///
/// Destructive operations (`put`, `delete`, `copy`) are only ever invoked
/// by the deploy/promote executors; the planners are pure.
pub trait ObjectStore {
    /// Create a bucket. Creating an existing bucket is an error.
    fn create_bucket(&self, bucket: &BucketName) -> Result<(), StoreError>;

    /// Every object in `bucket` with its stored metadata. An empty bucket
    /// yields an empty list, not an error.
    fn list(&self, bucket: &BucketName) -> Result<Vec<StoredObject>, StoreError>;

    /// An object's bytes.
    fn get(&self, bucket: &BucketName, key: &str) -> Result<Vec<u8>, StoreError>;

    /// An object's stored metadata.
    fn metadata(&self, bucket: &BucketName, key: &str) -> Result<ObjectMeta, StoreError>;

    /// Write an object, replacing any existing object at `key`.
    fn put(
        &self,
        bucket: &BucketName,
        key: &str,
        bytes: &[u8],
        meta: &ObjectMeta,
    ) -> Result<(), StoreError>;

    /// Best-effort batch delete. Returns the subset of `keys` that could
    /// not be removed; a non-empty set is partial success, not an error.
    fn delete(
        &self,
        bucket: &BucketName,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, StoreError>;

    /// Server-side copy of `key` from `src` to `dst`, replacing the
    /// destination object's metadata with `meta`.
    fn copy(
        &self,
        src: &BucketName,
        dst: &BucketName,
        key: &str,
        meta: &ObjectMeta,
    ) -> Result<(), StoreError>;
}

/// The content-delivery capability consumed by the invalidator.
pub trait CdnClient {
    /// All distributions visible to the caller.
    fn distributions(&self) -> Result<Vec<Distribution>, StoreError>;

    /// Request invalidation of `paths` on the distribution `id`.
    fn invalidate(&self, id: &str, paths: &BTreeSet<String>) -> Result<(), StoreError>;
}

/// A CDN client with no distributions. Used when no edge cache fronts the
/// store; the invalidator finds nothing to purge and moves on.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCdn;

impl CdnClient for NoopCdn {
    fn distributions(&self) -> Result<Vec<Distribution>, StoreError> {
        Ok(Vec::new())
    }

    fn invalidate(&self, _id: &str, _paths: &BTreeSet<String>) -> Result<(), StoreError> {
        Ok(())
    }
}
