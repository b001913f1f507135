// src/stream/file.rs

//! File entities: the unit of data flowing through a pipeline.
//!
//! A [`FileEntity`] is either disk-backed ([`DiskFile`], holds only a path
//! and the filesystem it lives on) or memory-backed ([`MemoryFile`], holds
//! the path and an immutable byte buffer). Transforms never mutate an
//! entity; they produce new ones.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;

/// Lazy, disk-backed file. Reading it loads the bytes.
#[derive(Clone)]
pub struct DiskFile {
    path: String,
    fs: Arc<dyn FileSystem>,
}

impl DiskFile {
    pub fn new(path: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Load the file contents into a [`MemoryFile`] at the same path.
    pub async fn read(&self) -> Result<MemoryFile> {
        let bytes = self
            .fs
            .read(Path::new(&self.path))
            .await
            .map_err(|e| BuildError::io(&self.path, e))?;
        Ok(MemoryFile::new(self.path.clone(), bytes))
    }
}

impl fmt::Debug for DiskFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Realized, memory-backed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    path: String,
    buffer: Bytes,
}

impl MemoryFile {
    pub fn new(path: impl Into<String>, buffer: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            buffer: buffer.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// The contents decoded as UTF-8 (invalid sequences replaced).
    pub fn contents(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Same bytes at a different path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            buffer: self.buffer.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FileEntity {
    Disk(DiskFile),
    Memory(MemoryFile),
}

impl FileEntity {
    pub fn path(&self) -> &str {
        match self {
            FileEntity::Disk(f) => f.path(),
            FileEntity::Memory(f) => f.path(),
        }
    }

    pub fn is_realized(&self) -> bool {
        matches!(self, FileEntity::Memory(_))
    }

    /// Realize the entity. A memory file is returned as-is.
    pub async fn read(&self) -> Result<MemoryFile> {
        match self {
            FileEntity::Disk(f) => f.read().await,
            FileEntity::Memory(f) => Ok(f.clone()),
        }
    }
}

impl From<DiskFile> for FileEntity {
    fn from(file: DiskFile) -> Self {
        FileEntity::Disk(file)
    }
}

impl From<MemoryFile> for FileEntity {
    fn from(file: MemoryFile) -> Self {
        FileEntity::Memory(file)
    }
}
