// src/transform/remove.rs

use std::io;
use std::path::Path;
use std::sync::Arc;

use futures::stream::TryStreamExt;
use tracing::debug;

use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::stream::{FileStream, Nested, Producer};

/// Delete every file of the stream and prune directories left empty.
///
/// Yields nothing; the deletions happen when the result is drained.
pub fn remove(files: FileStream, fs: Arc<dyn FileSystem>) -> Producer {
    Producer::deferred(async move {
        let mut files = files;
        while let Some(file) = files.try_next().await? {
            remove_path(fs.as_ref(), file.path()).await?;
        }
        Ok(Nested::Empty)
    })
}

/// Remove a single file (a missing file is fine), then walk up removing
/// ancestors until one is non-empty or cannot be listed.
pub async fn remove_path(fs: &dyn FileSystem, path: &str) -> Result<()> {
    match fs.remove_file(Path::new(path)).await {
        Ok(()) => debug!(path, "removed file"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(BuildError::io(path, err)),
    }
    prune_empty_parents(fs, Path::new(path)).await
}

async fn prune_empty_parents(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    let mut current = path.parent();

    // The build root itself (empty parent) is never removed.
    while let Some(dir) = current.filter(|dir| !dir.as_os_str().is_empty()) {
        let Ok(entries) = fs.read_dir(dir).await else {
            return Ok(());
        };
        if !entries.is_empty() {
            return Ok(());
        }
        fs.remove_dir(dir)
            .await
            .map_err(|err| BuildError::io(dir, err))?;
        debug!(dir = ?dir, "removed empty directory");
        current = dir.parent();
    }

    Ok(())
}
