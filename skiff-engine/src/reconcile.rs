//! The reconciler — pure decision core for the deploy path.
//!
//! Compares the local candidate set against a remote snapshot and
//! classifies every key. No I/O; the executors in [`crate::deploy`] are
//! the only code that acts on the plan.

use std::collections::{BTreeMap, BTreeSet};

use crate::hash::LocalFile;

/// Per-key classification. Recomputed every run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Transmit local bytes, overwriting any remote object at the key.
    Upload,
    /// Digests match; nothing to do.
    Skip,
    /// Remote-only key; remove it.
    Delete,
    /// Remote-to-remote copy (promote path only).
    CopyOnly,
}

/// Decision sets for one deploy run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeployPlan {
    /// Keys to upload, in candidate order.
    pub uploads: Vec<String>,
    /// Keys whose digests match the remote copy.
    pub skips: Vec<String>,
    /// Remote keys absent from the local candidate set.
    pub deletes: BTreeSet<String>,
}

impl DeployPlan {
    /// Whether the run would change nothing.
    pub fn is_noop(&self) -> bool {
        self.uploads.is_empty() && self.deletes.is_empty()
    }
}

/// Classify one local key against the remote snapshot.
///
/// Equal digests without force → Skip. Anything else — key absent
/// remotely, digest mismatch, missing remote digest, or force — →
/// Upload. A remote object with no stored digest was written by
/// something other than skiff, so it is re-uploaded and stamped.
pub fn classify(local_digest: &str, remote_digest: Option<&Option<String>>, force: bool) -> Decision {
    match remote_digest {
        Some(Some(stored)) if stored == local_digest && !force => Decision::Skip,
        _ => Decision::Upload,
    }
}

/// Classify every key.
///
/// Digest equality is the sole skip criterion — size, mtime, and path
/// casing are never consulted. `force` bypasses the skip decision only;
/// it never widens the delete set.
pub fn plan_deploy(
    local: &[LocalFile],
    remote: &BTreeMap<String, Option<String>>,
    force: bool,
) -> DeployPlan {
    let mut plan = DeployPlan::default();
    let mut local_keys = BTreeSet::new();

    for file in local {
        local_keys.insert(file.key.clone());
        match classify(&file.digest, remote.get(&file.key), force) {
            Decision::Skip => plan.skips.push(file.key.clone()),
            _ => plan.uploads.push(file.key.clone()),
        }
    }

    for key in remote.keys() {
        if !local_keys.contains(key) {
            plan.deletes.insert(key.clone());
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn local(entries: &[(&str, &str)]) -> Vec<LocalFile> {
        entries
            .iter()
            .map(|(key, digest)| LocalFile {
                key: key.to_string(),
                path: PathBuf::from(key),
                len: 0,
                digest: digest.to_string(),
            })
            .collect()
    }

    fn remote(entries: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
        entries
            .iter()
            .map(|(key, digest)| (key.to_string(), digest.map(|d| d.to_string())))
            .collect()
    }

    #[test]
    fn worked_example_from_mixed_remote_state() {
        // local = {index.html: H1, style.css: H2}; remote = {index.html: H1, old.js: H3}
        let plan = plan_deploy(
            &local(&[("index.html", "H1"), ("style.css", "H2")]),
            &remote(&[("index.html", Some("H1")), ("old.js", Some("H3"))]),
            false,
        );
        assert_eq!(plan.skips, vec!["index.html"]);
        assert_eq!(plan.uploads, vec!["style.css"]);
        assert_eq!(plan.deletes, BTreeSet::from(["old.js".to_string()]));
    }

    #[test]
    fn absent_remote_key_uploads() {
        let plan = plan_deploy(&local(&[("a.txt", "H1")]), &BTreeMap::new(), false);
        assert_eq!(plan.uploads, vec!["a.txt"]);
        assert!(plan.skips.is_empty() && plan.deletes.is_empty());
    }

    #[test]
    fn digest_mismatch_is_a_silent_overwrite() {
        let plan = plan_deploy(
            &local(&[("a.txt", "H1")]),
            &remote(&[("a.txt", Some("H-old"))]),
            false,
        );
        assert_eq!(plan.uploads, vec!["a.txt"]);
    }

    #[test]
    fn missing_remote_digest_counts_as_mismatch() {
        let plan = plan_deploy(&local(&[("a.txt", "H1")]), &remote(&[("a.txt", None)]), false);
        assert_eq!(plan.uploads, vec!["a.txt"]);
    }

    #[test]
    fn force_reclassifies_every_local_key_as_upload() {
        let plan = plan_deploy(
            &local(&[("a.txt", "H1"), ("b.txt", "H2")]),
            &remote(&[("a.txt", Some("H1")), ("b.txt", Some("H2"))]),
            true,
        );
        assert_eq!(plan.uploads, vec!["a.txt", "b.txt"]);
        assert!(plan.skips.is_empty());
    }

    #[test]
    fn force_never_widens_the_delete_set() {
        let without = plan_deploy(
            &local(&[("a.txt", "H1")]),
            &remote(&[("a.txt", Some("H1")), ("gone.js", Some("H3"))]),
            false,
        );
        let with = plan_deploy(
            &local(&[("a.txt", "H1")]),
            &remote(&[("a.txt", Some("H1")), ("gone.js", Some("H3"))]),
            true,
        );
        assert_eq!(without.deletes, with.deletes);
    }

    #[test]
    fn equal_digests_without_force_is_a_noop_plan() {
        let plan = plan_deploy(
            &local(&[("a.txt", "H1")]),
            &remote(&[("a.txt", Some("H1"))]),
            false,
        );
        assert!(plan.is_noop());
        assert_eq!(plan.skips, vec!["a.txt"]);
    }
}
