//! Filesystem-backed object store.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   <bucket>/
//!     objects/<key>        (object bytes; keys may contain `/`)
//!     meta/<key>.json      (ObjectMeta sidecar)
//! ```
//!
//! Writes use the same atomic `.tmp` + rename pattern as the config.
//! This is the store the CLI wires up; it satisfies the full
//! [`ObjectStore`] contract so every pipeline can run end to end without
//! network credentials.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use skiff_core::BucketName;

use crate::error::{io_err, StoreError};
use crate::{ObjectMeta, ObjectStore, StoredObject};

/// Object store rooted at a local directory, one subdirectory per bucket.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
        Ok(Self { root })
    }

    fn bucket_dir(&self, bucket: &BucketName) -> PathBuf {
        self.root.join(&bucket.0)
    }

    fn require_bucket(&self, bucket: &BucketName) -> Result<PathBuf, StoreError> {
        let dir = self.bucket_dir(bucket);
        if !dir.is_dir() {
            return Err(StoreError::BucketNotFound {
                bucket: bucket.0.clone(),
            });
        }
        Ok(dir)
    }

    fn object_path(&self, bucket: &BucketName, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.require_bucket(bucket)?.join("objects").join(safe_key(bucket, key)?))
    }

    fn meta_path(&self, bucket: &BucketName, key: &str) -> Result<PathBuf, StoreError> {
        let rel = safe_key(bucket, key)?;
        Ok(self
            .require_bucket(bucket)?
            .join("meta")
            .join(format!("{rel}.json")))
    }
}

/// Reject keys that would escape the bucket directory.
fn safe_key<'k>(bucket: &BucketName, key: &'k str) -> Result<&'k str, StoreError> {
    let escapes = key.is_empty()
        || Path::new(key).is_absolute()
        || key.split('/').any(|part| part == ".." || part.is_empty());
    if escapes {
        return Err(StoreError::KeyNotFound {
            bucket: bucket.0.clone(),
            key: key.to_string(),
        });
    }
    Ok(key)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.skiff.tmp", path.display()));
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

impl ObjectStore for FsObjectStore {
    fn create_bucket(&self, bucket: &BucketName) -> Result<(), StoreError> {
        let dir = self.bucket_dir(bucket);
        if dir.exists() {
            return Err(StoreError::BucketExists {
                bucket: bucket.0.clone(),
            });
        }
        std::fs::create_dir_all(dir.join("objects")).map_err(|e| io_err(&dir, e))?;
        std::fs::create_dir_all(dir.join("meta")).map_err(|e| io_err(&dir, e))?;
        Ok(())
    }

    fn list(&self, bucket: &BucketName) -> Result<Vec<StoredObject>, StoreError> {
        let meta_dir = self.require_bucket(bucket)?.join("meta");
        let mut objects = Vec::new();
        if !meta_dir.is_dir() {
            return Ok(objects);
        }
        for entry in WalkDir::new(&meta_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&meta_dir).to_path_buf();
                match e.into_io_error() {
                    Some(io) => io_err(&path, io),
                    None => io_err(&path, std::io::Error::other("walk failed")),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&meta_dir)
                .unwrap_or(entry.path());
            let rel = rel.to_string_lossy().replace('\\', "/");
            let Some(key) = rel.strip_suffix(".json") else {
                continue;
            };
            let contents =
                std::fs::read_to_string(entry.path()).map_err(|e| io_err(entry.path(), e))?;
            let meta: ObjectMeta = serde_json::from_str(&contents)?;
            objects.push(StoredObject {
                key: key.to_string(),
                meta,
            });
        }
        Ok(objects)
    }

    fn get(&self, bucket: &BucketName, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        if !path.is_file() {
            return Err(StoreError::KeyNotFound {
                bucket: bucket.0.clone(),
                key: key.to_string(),
            });
        }
        std::fs::read(&path).map_err(|e| io_err(&path, e))
    }

    fn metadata(&self, bucket: &BucketName, key: &str) -> Result<ObjectMeta, StoreError> {
        let path = self.meta_path(bucket, key)?;
        if !path.is_file() {
            return Err(StoreError::KeyNotFound {
                bucket: bucket.0.clone(),
                key: key.to_string(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn put(
        &self,
        bucket: &BucketName,
        key: &str,
        bytes: &[u8],
        meta: &ObjectMeta,
    ) -> Result<(), StoreError> {
        let object_path = self.object_path(bucket, key)?;
        let meta_path = self.meta_path(bucket, key)?;
        write_atomic(&object_path, bytes)?;
        let json = serde_json::to_vec_pretty(meta)?;
        write_atomic(&meta_path, &json)?;
        Ok(())
    }

    fn delete(
        &self,
        bucket: &BucketName,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, StoreError> {
        self.require_bucket(bucket)?;
        let mut failed = BTreeSet::new();
        for key in keys {
            let (object_path, meta_path) =
                match (self.object_path(bucket, key), self.meta_path(bucket, key)) {
                    (Ok(o), Ok(m)) => (o, m),
                    _ => {
                        failed.insert(key.clone());
                        continue;
                    }
                };
            let removed_object = remove_if_present(&object_path);
            let removed_meta = remove_if_present(&meta_path);
            if !(removed_object && removed_meta) {
                failed.insert(key.clone());
            }
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
        let bytes = self.get(src, key)?;
        self.put(dst, key, &bytes, meta)
    }
}

/// Remove a file, treating "already absent" as success.
fn remove_if_present(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> FsObjectStore {
        FsObjectStore::open(dir.path().join("store")).unwrap()
    }

    fn bucket() -> BucketName {
        BucketName::from("www.example.com")
    }

    #[test]
    fn create_then_list_empty() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.create_bucket(&bucket()).unwrap();
        assert!(store.list(&bucket()).unwrap().is_empty());
    }

    #[test]
    fn missing_bucket_is_error() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        assert!(matches!(
            store.list(&bucket()).unwrap_err(),
            StoreError::BucketNotFound { .. }
        ));
    }

    #[test]
    fn put_get_metadata_roundtrip_with_nested_keys() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.create_bucket(&bucket()).unwrap();
        let meta = ObjectMeta {
            hash: Some("feedface".to_string()),
            content_type: Some("text/css".to_string()),
            robots: Some("noindex".to_string()),
            public: true,
        };
        store
            .put(&bucket(), "assets/css/site.css", b"body{}", &meta)
            .unwrap();

        assert_eq!(store.get(&bucket(), "assets/css/site.css").unwrap(), b"body{}");
        assert_eq!(store.metadata(&bucket(), "assets/css/site.css").unwrap(), meta);

        let listed = store.list(&bucket()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "assets/css/site.css");
        assert_eq!(listed[0].meta, meta);
    }

    #[test]
    fn delete_removes_bytes_and_sidecar() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.create_bucket(&bucket()).unwrap();
        store
            .put(&bucket(), "a.txt", b"a", &ObjectMeta::default())
            .unwrap();

        let failed = store
            .delete(&bucket(), &BTreeSet::from(["a.txt".to_string()]))
            .unwrap();
        assert!(failed.is_empty());
        assert!(store.list(&bucket()).unwrap().is_empty());
        assert!(matches!(
            store.get(&bucket(), "a.txt").unwrap_err(),
            StoreError::KeyNotFound { .. }
        ));
    }

    #[test]
    fn copy_restamps_metadata() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let src = BucketName::from("src");
        let dst = BucketName::from("dst");
        store.create_bucket(&src).unwrap();
        store.create_bucket(&dst).unwrap();
        store
            .put(
                &src,
                "index.html",
                b"<html>",
                &ObjectMeta {
                    hash: Some("h1".to_string()),
                    robots: Some("noindex".to_string()),
                    ..ObjectMeta::default()
                },
            )
            .unwrap();

        let dst_meta = ObjectMeta {
            hash: Some("h1".to_string()),
            robots: Some("all".to_string()),
            public: true,
            ..ObjectMeta::default()
        };
        store.copy(&src, &dst, "index.html", &dst_meta).unwrap();
        assert_eq!(store.get(&dst, "index.html").unwrap(), b"<html>");
        assert_eq!(store.metadata(&dst, "index.html").unwrap(), dst_meta);
    }

    #[test]
    fn valid_keys_pass_through_and_outlive_the_bucket_borrow() {
        let key = String::from("assets/css/site.css");
        let validated = {
            let b = bucket();
            safe_key(&b, &key).unwrap()
        };
        assert_eq!(validated, "assets/css/site.css");
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.create_bucket(&bucket()).unwrap();
        for key in ["../escape", "/abs", "a//b", ""] {
            assert!(
                store
                    .put(&bucket(), key, b"x", &ObjectMeta::default())
                    .is_err(),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn no_tmp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.create_bucket(&bucket()).unwrap();
        store
            .put(&bucket(), "index.html", b"x", &ObjectMeta::default())
            .unwrap();
        let leftovers: Vec<_> = WalkDir::new(dir.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .to_string_lossy()
                    .ends_with(".skiff.tmp")
            })
            .collect();
        assert!(leftovers.is_empty(), "tmp files left: {leftovers:?}");
    }
}
