//! Best-effort CDN cache invalidation.
//!
//! Runs after the object store has already been durably updated, so
//! nothing here may fail the run: every error is logged and swallowed.
//! The store is the source of truth; invalidation is an optimization.

use std::collections::BTreeSet;

use skiff_core::BucketName;
use skiff_store::CdnClient;

/// The origin host a distribution must be configured with to be
/// considered as fronting `bucket`.
pub fn origin_host(bucket: &BucketName) -> String {
    format!("{bucket}.s3.amazonaws.com")
}

/// Ask any distribution fronting `bucket` to purge the touched keys.
///
/// Keys are converted to `/`-prefixed paths. Finding no distribution is
/// not an error; neither is a failed request.
pub fn invalidate_changed(cdn: &dyn CdnClient, bucket: &BucketName, keys: &BTreeSet<String>) {
    if keys.is_empty() {
        return;
    }
    let paths: BTreeSet<String> = keys.iter().map(|key| format!("/{key}")).collect();
    let origin = origin_host(bucket);

    let distributions = match cdn.distributions() {
        Ok(d) => d,
        Err(err) => {
            tracing::warn!("could not list distributions: {err}");
            return;
        }
    };

    for dist in distributions {
        if dist.origin_host != origin {
            continue;
        }
        match cdn.invalidate(&dist.id, &paths) {
            Ok(()) => {
                tracing::info!(
                    "invalidated {} path(s) on distribution {}",
                    paths.len(),
                    dist.id
                );
            }
            Err(err) => {
                tracing::warn!("invalidation failed on distribution {}: {err}", dist.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_store::{Distribution, MemoryCdn};

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn only_the_matching_distribution_is_invalidated() {
        let bucket = BucketName::from("www.example.com");
        let cdn = MemoryCdn::new(vec![
            Distribution {
                id: "D-other".to_string(),
                origin_host: "elsewhere.s3.amazonaws.com".to_string(),
            },
            Distribution {
                id: "D-site".to_string(),
                origin_host: "www.example.com.s3.amazonaws.com".to_string(),
            },
        ]);

        invalidate_changed(&cdn, &bucket, &keys(&["index.html", "old.js"]));

        let requests = cdn.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "D-site");
        assert_eq!(requests[0].1, keys(&["/index.html", "/old.js"]));
    }

    #[test]
    fn failed_invalidation_is_swallowed() {
        let bucket = BucketName::from("www.example.com");
        let cdn = MemoryCdn::failing(vec![Distribution {
            id: "D1".to_string(),
            origin_host: "www.example.com.s3.amazonaws.com".to_string(),
        }]);
        // Must not panic or propagate.
        invalidate_changed(&cdn, &bucket, &keys(&["index.html"]));
        assert!(cdn.requests().is_empty());
    }

    #[test]
    fn empty_key_set_issues_no_request() {
        let bucket = BucketName::from("www.example.com");
        let cdn = MemoryCdn::new(vec![Distribution {
            id: "D1".to_string(),
            origin_host: "www.example.com.s3.amazonaws.com".to_string(),
        }]);
        invalidate_changed(&cdn, &bucket, &BTreeSet::new());
        assert!(cdn.requests().is_empty());
    }
}
