//! Remote state snapshot.

use std::collections::BTreeMap;

use skiff_core::BucketName;
use skiff_store::ObjectStore;

use crate::error::SyncError;

/// Every key in `bucket` mapped to its stored content digest.
///
/// A `None` digest means the object was written by something other than
/// skiff (no hash metadata); the reconciler treats it as a mismatch so
/// the object is re-uploaded and stamped on the next run.
///
/// This is a point-in-time snapshot; a concurrent writer can change the
/// bucket between the snapshot and the run's mutations. skiff does not
/// lock the store.
pub fn remote_state(
    store: &dyn ObjectStore,
    bucket: &BucketName,
) -> Result<BTreeMap<String, Option<String>>, SyncError> {
    let objects = store.list(bucket)?;
    Ok(objects
        .into_iter()
        .map(|obj| (obj.key, obj.meta.hash))
        .collect())
}
