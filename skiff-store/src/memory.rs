//! In-memory store and CDN doubles for tests.
//!
//! Both record enough to assert on final state and on the calls made:
//! the store can be seeded and can be told to refuse deletes for chosen
//! keys; the CDN records every invalidation request and can be told to
//! fail them all.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use skiff_core::BucketName;

use crate::error::StoreError;
use crate::{CdnClient, Distribution, ObjectMeta, ObjectStore, StoredObject};

#[derive(Debug, Clone)]
struct Object {
    bytes: Vec<u8>,
    meta: ObjectMeta,
}

type Buckets = BTreeMap<String, BTreeMap<String, Object>>;

/// In-memory [`ObjectStore`].
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    buckets: Mutex<Buckets>,
    undeletable: Mutex<BTreeSet<(String, String)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given buckets already present and empty.
    pub fn with_buckets<I, B>(names: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BucketName>,
    {
        let store = Self::new();
        {
            let mut buckets = store.buckets.lock().expect("store lock");
            for name in names {
                buckets.insert(name.into().0, BTreeMap::new());
            }
        }
        store
    }

    /// Make every future delete of `key` in `bucket` fail, to exercise
    /// the pruner's partial-failure reporting.
    pub fn refuse_delete(&self, bucket: &BucketName, key: &str) {
        self.undeletable
            .lock()
            .expect("store lock")
            .insert((bucket.0.clone(), key.to_string()));
    }

    /// Current key set of a bucket, for final-state assertions.
    pub fn keys(&self, bucket: &BucketName) -> BTreeSet<String> {
        self.buckets
            .lock()
            .expect("store lock")
            .get(&bucket.0)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn create_bucket(&self, bucket: &BucketName) -> Result<(), StoreError> {
        let mut buckets = self.buckets.lock().expect("store lock");
        if buckets.contains_key(&bucket.0) {
            return Err(StoreError::BucketExists {
                bucket: bucket.0.clone(),
            });
        }
        buckets.insert(bucket.0.clone(), BTreeMap::new());
        Ok(())
    }

    fn list(&self, bucket: &BucketName) -> Result<Vec<StoredObject>, StoreError> {
        let buckets = self.buckets.lock().expect("store lock");
        let objects = buckets.get(&bucket.0).ok_or_else(|| {
            StoreError::BucketNotFound {
                bucket: bucket.0.clone(),
            }
        })?;
        Ok(objects
            .iter()
            .map(|(key, obj)| StoredObject {
                key: key.clone(),
                meta: obj.meta.clone(),
            })
            .collect())
    }

    fn get(&self, bucket: &BucketName, key: &str) -> Result<Vec<u8>, StoreError> {
        let buckets = self.buckets.lock().expect("store lock");
        let objects = buckets.get(&bucket.0).ok_or_else(|| {
            StoreError::BucketNotFound {
                bucket: bucket.0.clone(),
            }
        })?;
        objects
            .get(key)
            .map(|obj| obj.bytes.clone())
            .ok_or_else(|| StoreError::KeyNotFound {
                bucket: bucket.0.clone(),
                key: key.to_string(),
            })
    }

    fn metadata(&self, bucket: &BucketName, key: &str) -> Result<ObjectMeta, StoreError> {
        let buckets = self.buckets.lock().expect("store lock");
        let objects = buckets.get(&bucket.0).ok_or_else(|| {
            StoreError::BucketNotFound {
                bucket: bucket.0.clone(),
            }
        })?;
        objects
            .get(key)
            .map(|obj| obj.meta.clone())
            .ok_or_else(|| StoreError::KeyNotFound {
                bucket: bucket.0.clone(),
                key: key.to_string(),
            })
    }

    fn put(
        &self,
        bucket: &BucketName,
        key: &str,
        bytes: &[u8],
        meta: &ObjectMeta,
    ) -> Result<(), StoreError> {
        let mut buckets = self.buckets.lock().expect("store lock");
        let objects = buckets.get_mut(&bucket.0).ok_or_else(|| {
            StoreError::BucketNotFound {
                bucket: bucket.0.clone(),
            }
        })?;
        objects.insert(
            key.to_string(),
            Object {
                bytes: bytes.to_vec(),
                meta: meta.clone(),
            },
        );
        Ok(())
    }

    fn delete(
        &self,
        bucket: &BucketName,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, StoreError> {
        let undeletable = self.undeletable.lock().expect("store lock");
        let mut buckets = self.buckets.lock().expect("store lock");
        let objects = buckets.get_mut(&bucket.0).ok_or_else(|| {
            StoreError::BucketNotFound {
                bucket: bucket.0.clone(),
            }
        })?;
        let mut failed = BTreeSet::new();
        for key in keys {
            if undeletable.contains(&(bucket.0.clone(), key.clone())) {
                failed.insert(key.clone());
                continue;
            }
            objects.remove(key);
        }
        Ok(failed)
    }

    fn copy(
        &self,
        src: &BucketName,
        dst: &BucketName,
        key: &str,
        meta: &ObjectMeta,
    ) -> Result<(), StoreError> {
        let mut buckets = self.buckets.lock().expect("store lock");
        let bytes = buckets
            .get(&src.0)
            .ok_or_else(|| StoreError::BucketNotFound {
                bucket: src.0.clone(),
            })?
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound {
                bucket: src.0.clone(),
                key: key.to_string(),
            })?
            .bytes
            .clone();
        let objects = buckets.get_mut(&dst.0).ok_or_else(|| {
            StoreError::BucketNotFound {
                bucket: dst.0.clone(),
            }
        })?;
        objects.insert(
            key.to_string(),
            Object {
                bytes,
                meta: meta.clone(),
            },
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryCdn
// ---------------------------------------------------------------------------

/// In-memory [`CdnClient`] recording every invalidation request.
#[derive(Debug, Default)]
pub struct MemoryCdn {
    distributions: Vec<Distribution>,
    fail_invalidations: bool,
    requests: Mutex<Vec<(String, BTreeSet<String>)>>,
}

impl MemoryCdn {
    /// A CDN with the given distributions.
    pub fn new(distributions: Vec<Distribution>) -> Self {
        Self {
            distributions,
            ..Self::default()
        }
    }

    /// Make every invalidation request fail. Deploys must still succeed.
    pub fn failing(distributions: Vec<Distribution>) -> Self {
        Self {
            distributions,
            fail_invalidations: true,
            ..Self::default()
        }
    }

    /// All `(distribution id, paths)` invalidation requests seen so far.
    pub fn requests(&self) -> Vec<(String, BTreeSet<String>)> {
        self.requests.lock().expect("cdn lock").clone()
    }
}

impl CdnClient for MemoryCdn {
    fn distributions(&self) -> Result<Vec<Distribution>, StoreError> {
        Ok(self.distributions.clone())
    }

    fn invalidate(&self, id: &str, paths: &BTreeSet<String>) -> Result<(), StoreError> {
        if self.fail_invalidations {
            return Err(StoreError::Transport(format!(
                "invalidation refused for distribution '{id}'"
            )));
        }
        self.requests
            .lock()
            .expect("cdn lock")
            .push((id.to_string(), paths.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
