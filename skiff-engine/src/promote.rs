//! The promoter: environment-to-environment copy without touching local
//! disk.
//!
//! Plans from the two buckets' stored digests alone, then executes with
//! server-side copies. The destination ends up mirroring the source's
//! key set and content, but indexing directives follow the
//! *destination* environment's policy — the same bytes get different
//! crawler visibility depending on where they live.

use std::collections::{BTreeMap, BTreeSet};

use skiff_core::{Config, Environment};
use skiff_store::{CdnClient, ObjectMeta, ObjectStore};

use crate::content_type;
use crate::error::SyncError;
use crate::invalidate::invalidate_changed;
use crate::reconcile::Decision;
use crate::remote::remote_state;

/// Decision sets for one promote run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromotePlan {
    /// Keys to copy from source to destination, in key order.
    pub copies: Vec<String>,
    /// Keys whose stored digests already match.
    pub skips: Vec<String>,
    /// Destination-only keys to remove.
    pub deletes: BTreeSet<String>,
}

impl PromotePlan {
    pub fn is_noop(&self) -> bool {
        self.copies.is_empty() && self.deletes.is_empty()
    }
}

/// Classify one source key against the destination snapshot.
///
/// Stored digests are compared as-is: two missing digests compare equal
/// and skip. A skip never re-checks the
/// destination's robots directive; `force` re-copies and re-stamps.
fn classify(
    src_digest: &Option<String>,
    dst_digest: Option<&Option<String>>,
    force: bool,
) -> Decision {
    match dst_digest {
        Some(stored) if stored == src_digest && !force => Decision::Skip,
        _ => Decision::CopyOnly,
    }
}

/// Classify every key from the two bucket snapshots. Pure; no transport.
pub fn plan_promote(
    src: &BTreeMap<String, Option<String>>,
    dst: &BTreeMap<String, Option<String>>,
    force: bool,
) -> PromotePlan {
    let mut plan = PromotePlan::default();

    for (key, src_digest) in src {
        match classify(src_digest, dst.get(key), force) {
            Decision::Skip => plan.skips.push(key.clone()),
            _ => plan.copies.push(key.clone()),
        }
    }

    for key in dst.keys() {
        if !src.contains_key(key) {
            plan.deletes.insert(key.clone());
        }
    }

    plan
}

/// Outcome of one promote run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoteReport {
    pub source: Environment,
    pub destination: Environment,
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
    pub deleted: BTreeSet<String>,
    pub failed_deletes: BTreeSet<String>,
}

/// Promote `src_env`'s bucket into `dst_env`'s bucket.
///
/// `src_env == dst_env` is permitted; every key compares equal to itself
/// so the run is an effective no-op. For each key being overwritten the
/// destination object is deleted first, then copied; the copy re-stamps
/// the hash metadata, guesses the content type by extension, applies the
/// destination environment's robots directive, and preserves the
/// source's access-control state.
pub fn promote(
    store: &dyn ObjectStore,
    cdn: &dyn CdnClient,
    config: &Config,
    src_env: Environment,
    dst_env: Environment,
    force: bool,
) -> Result<PromoteReport, SyncError> {
    let src_bucket = config.buckets.bucket_for(src_env).clone();
    let dst_bucket = config.buckets.bucket_for(dst_env).clone();

    let src_state = remote_state(store, &src_bucket)?;
    let dst_state = remote_state(store, &dst_bucket)?;
    let plan = plan_promote(&src_state, &dst_state, force);

    let mut copied = Vec::new();
    for key in &plan.copies {
        tracing::info!("copying {key} from {src_env} to {dst_env}");
        if dst_state.contains_key(key) {
            // Overwrite path: drop the stale destination object first.
            let _ = store.delete(&dst_bucket, &BTreeSet::from([key.clone()]))?;
        }
        let src_meta = store.metadata(&src_bucket, key)?;
        let meta = ObjectMeta {
            hash: src_meta.hash.clone(),
            content_type: content_type::guess(key).map(str::to_string),
            robots: Some(dst_env.robots_directive().to_string()),
            public: src_meta.public,
        };
        store.copy(&src_bucket, &dst_bucket, key, &meta)?;
        copied.push(key.clone());
    }
    for key in &plan.skips {
        tracing::info!("{key} exists and is current, skipping");
    }

    let failed_deletes = if plan.deletes.is_empty() {
        BTreeSet::new()
    } else {
        tracing::info!("pruning {} destination-only key(s)", plan.deletes.len());
        store.delete(&dst_bucket, &plan.deletes)?
    };
    for key in &failed_deletes {
        tracing::warn!("could not delete {key}");
    }
    let deleted: BTreeSet<String> = plan
        .deletes
        .difference(&failed_deletes)
        .cloned()
        .collect();

    let touched: BTreeSet<String> = plan
        .copies
        .iter()
        .cloned()
        .chain(plan.deletes.iter().cloned())
        .collect();
    invalidate_changed(cdn, &dst_bucket, &touched);

    Ok(PromoteReport {
        source: src_env,
        destination: dst_env,
        copied,
        skipped: plan.skips,
        deleted,
        failed_deletes,
    })
}
