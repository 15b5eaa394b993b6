//! SHA-512 content digests.
//!
//! The digest is the sole change-detection signal in the system: two
//! files are "the same" exactly when their digests match. Digests are
//! computed once per file per run and never cached across runs — mtimes
//! carry no contract across filesystems, so bytes are always re-read.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha512};

use crate::enumerate::Candidate;
use crate::error::{io_err, SyncError};

/// A candidate with its content digest attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub key: String,
    pub path: std::path::PathBuf,
    pub len: u64,
    /// Hex-encoded SHA-512 of the file's bytes.
    pub digest: String,
}

/// Hex-encoded SHA-512 of a byte slice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hex-encoded SHA-512 of a file, streamed in 64 KiB chunks.
pub fn hash_file(path: &Path) -> Result<String, SyncError> {
    let mut file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha512::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Attach digests to every candidate, in order.
pub fn hash_candidates(candidates: Vec<Candidate>) -> Result<Vec<LocalFile>, SyncError> {
    candidates
        .into_iter()
        .map(|c| {
            let digest = hash_file(&c.path)?;
            tracing::debug!("{} -> {}", c.key, &digest[..16]);
            Ok(LocalFile {
                key: c.key,
                path: c.path,
                len: c.len,
                digest,
            })
        })
        .collect()
}
