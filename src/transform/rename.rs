// src/transform/rename.rs

use std::fmt;
use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::Stream;

use crate::errors::{BuildError, Result};
use crate::stream::{FileEntity, FileStream, MemoryFile, Producer};

type RenameFn = dyn Fn(&str, &MemoryFile) -> String + Send + Sync;

/// New name for every file passing through [`rename`].
#[derive(Clone)]
pub enum RenameTo {
    /// The same literal path for every file.
    Path(String),
    /// Computed from the old path and the realized file.
    With(Arc<RenameFn>),
}

impl RenameTo {
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&str, &MemoryFile) -> String + Send + Sync + 'static,
    {
        RenameTo::With(Arc::new(f))
    }

    fn target_for(&self, file: &MemoryFile) -> Result<String> {
        let target = match self {
            RenameTo::Path(path) => path.clone(),
            RenameTo::With(f) => f(file.path(), file),
        };
        if target.is_empty() {
            return Err(BuildError::config(format!(
                "New file name for {} has to be a non-empty path",
                file.path()
            )));
        }
        Ok(target)
    }
}

impl fmt::Debug for RenameTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameTo::Path(path) => f.debug_tuple("Path").field(path).finish(),
            RenameTo::With(_) => f.write_str("With(..)"),
        }
    }
}

impl From<&str> for RenameTo {
    fn from(path: &str) -> Self {
        RenameTo::Path(path.to_string())
    }
}

impl From<String> for RenameTo {
    fn from(path: String) -> Self {
        RenameTo::Path(path)
    }
}

/// Realize every file and re-emit its bytes under a new path.
pub fn rename(files: FileStream, target: RenameTo) -> Producer {
    Producer::leaves(renamed(files, target))
}

fn renamed(
    files: FileStream,
    target: RenameTo,
) -> impl Stream<Item = Result<FileEntity>> + Send + 'static {
    try_stream! {
        for await file in files {
            let file = file?.read().await?;
            let path = target.target_for(&file)?;
            yield FileEntity::Memory(file.with_path(path));
        }
    }
}
