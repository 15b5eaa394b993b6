pub mod create;
pub mod deploy;
pub mod init;
pub mod promote;
pub mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};

use skiff_store::FsObjectStore;

/// Resolve the object-store root: `--store-dir` if given, else
/// `~/.skiff/store`.
pub(crate) fn open_store(store_dir: Option<PathBuf>) -> Result<FsObjectStore> {
    let root = match store_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("could not determine home directory")?
            .join(".skiff")
            .join("store"),
    };
    FsObjectStore::open(root).context("could not open object store")
}
