// src/transform/dest.rs

use std::path::Path;
use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::Stream;
use tracing::debug;

use crate::errors::{BuildError, Result};
use crate::fs::{normalize, to_slash, FileSystem};
use crate::stream::{DiskFile, FileEntity, FileStream, Producer};

/// Write every file to disk and continue with disk-backed entities at the
/// written locations.
///
/// With `target_dir` the file's path is placed below that directory,
/// otherwise the file is written back to its own path.
pub fn dest(files: FileStream, fs: Arc<dyn FileSystem>, target_dir: Option<String>) -> Producer {
    Producer::leaves(written(files, fs, target_dir))
}

fn written(
    files: FileStream,
    fs: Arc<dyn FileSystem>,
    target_dir: Option<String>,
) -> impl Stream<Item = Result<FileEntity>> + Send + 'static {
    try_stream! {
        for await file in files {
            let file = file?.read().await?;
            let target = match &target_dir {
                Some(dir) => target_path(dir, file.path()),
                None => file.path().to_string(),
            };

            if let Some(parent) = Path::new(&target).parent() {
                if !parent.as_os_str().is_empty() {
                    fs.create_dir_all(parent)
                        .await
                        .map_err(|err| BuildError::io(parent, err))?;
                }
            }

            fs.write(Path::new(&target), file.buffer().clone())
                .await
                .map_err(|err| BuildError::io(&target, err))?;
            debug!(from = file.path(), to = %target, "wrote file");

            yield FileEntity::Disk(DiskFile::new(target, Arc::clone(&fs)));
        }
    }
}

/// `dir` joined with `path`, treating `path` as relative even when it
/// starts with a separator.
pub fn target_path(dir: &str, path: &str) -> String {
    let joined = format!("{}/{}", dir.trim_end_matches('/'), path.trim_start_matches('/'));
    let normalized = to_slash(&normalize(Path::new(&joined)));
    if dir.starts_with('/') && !normalized.starts_with('/') {
        format!("/{normalized}")
    } else {
        normalized
    }
}
