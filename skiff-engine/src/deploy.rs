//! The deploy pipeline: enumerate → hash → reconcile → upload → prune →
//! invalidate.
//!
//! Execution is sequential and per-key operations commute, so final
//! remote state does not depend on iteration order. There is no rollback:
//! a partially failed run leaves the bucket in a mixed state and the
//! recovery mechanism is an idempotent re-run.

use std::collections::BTreeSet;
use std::path::Path;

use skiff_core::{BucketName, Config, Environment};
use skiff_store::{CdnClient, ObjectMeta, ObjectStore};

use crate::content_type;
use crate::enumerate::{candidate_filter, enumerate};
use crate::error::{io_err, SyncError};
use crate::hash::hash_candidates;
use crate::invalidate::invalidate_changed;
use crate::reconcile::plan_deploy;
use crate::remote::remote_state;

/// Outcome of one deploy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub environment: Environment,
    pub bucket: BucketName,
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
    pub deleted: BTreeSet<String>,
    /// Keys classified Delete that the store could not remove. A
    /// non-empty set is partial success, not failure; the next run
    /// re-classifies them.
    pub failed_deletes: BTreeSet<String>,
}

/// Upload metadata for one key bound for `env`.
pub(crate) fn upload_meta(key: &str, digest: &str, env: Environment) -> ObjectMeta {
    ObjectMeta {
        hash: Some(digest.to_string()),
        content_type: content_type::guess(key).map(str::to_string),
        robots: Some(env.robots_directive().to_string()),
        public: true,
    }
}

/// Deploy the configured root to `env`'s bucket.
///
/// After a successful run the bucket's key set equals the local
/// candidate key set exactly, and every stored digest equals the digest
/// of the local file that produced it.
pub fn deploy(
    store: &dyn ObjectStore,
    cdn: &dyn CdnClient,
    config: &Config,
    project_dir: &Path,
    env: Environment,
    force: bool,
) -> Result<DeployReport, SyncError> {
    let bucket = config.buckets.bucket_for(env).clone();
    let root = config.root_at(project_dir);

    let filter = candidate_filter(&config.include, &config.ignore)?;
    let candidates = enumerate(&root, &filter)?;
    let local = hash_candidates(candidates)?;
    let remote = remote_state(store, &bucket)?;
    let plan = plan_deploy(&local, &remote, force);

    let upload_set: BTreeSet<&str> = plan.uploads.iter().map(String::as_str).collect();
    let mut uploaded = Vec::new();
    for file in &local {
        if !upload_set.contains(file.key.as_str()) {
            tracing::info!("skipping {} - no change", file.key);
            continue;
        }
        tracing::info!("uploading {}", file.key);
        let bytes = std::fs::read(&file.path).map_err(|e| io_err(&file.path, e))?;
        let meta = upload_meta(&file.key, &file.digest, env);
        store.put(&bucket, &file.key, &bytes, &meta)?;
        uploaded.push(file.key.clone());
    }

    let failed_deletes = if plan.deletes.is_empty() {
        BTreeSet::new()
    } else {
        tracing::info!("pruning {} remote-only key(s)", plan.deletes.len());
        store.delete(&bucket, &plan.deletes)?
    };
    for key in &failed_deletes {
        tracing::warn!("could not delete {key}");
    }
    let deleted: BTreeSet<String> = plan
        .deletes
        .difference(&failed_deletes)
        .cloned()
        .collect();

    // The store is durably updated; cache purge is best-effort from here.
    let touched: BTreeSet<String> = plan
        .uploads
        .iter()
        .cloned()
        .chain(plan.deletes.iter().cloned())
        .collect();
    invalidate_changed(cdn, &bucket, &touched);

    Ok(DeployReport {
        environment: env,
        bucket,
        uploaded,
        skipped: plan.skips,
        deleted,
        failed_deletes,
    })
}
