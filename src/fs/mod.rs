// src/fs/mod.rs

//! Filesystem capability used by discovery, entities and transforms.
//!
//! Every path handed to a [`FileSystem`] is relative to the build root
//! (the directory holding the build file). Implementations resolve it
//! against their own root, so nothing in the crate ever changes the
//! process working directory.

use std::fmt::Debug;
use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};

pub mod mock;

/// A single directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Path of the entry, formed by joining the listed directory with the
    /// entry name.
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Abstract filesystem interface.
///
/// All operations return `'static` futures so they can be held inside
/// lazily evaluated streams.
pub trait FileSystem: Send + Sync + Debug {
    fn read(&self, path: &Path) -> BoxFuture<'static, io::Result<Bytes>>;

    /// Write `contents` to `path`. The parent directory must exist.
    fn write(&self, path: &Path, contents: Bytes) -> BoxFuture<'static, io::Result<()>>;

    fn create_dir_all(&self, path: &Path) -> BoxFuture<'static, io::Result<()>>;

    fn remove_file(&self, path: &Path) -> BoxFuture<'static, io::Result<()>>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> BoxFuture<'static, io::Result<()>>;

    /// List a directory, sorted by entry name.
    fn read_dir(&self, path: &Path) -> BoxFuture<'static, io::Result<Vec<DirEntry>>>;

    /// Absolute location of `path`, used for change notifications.
    fn resolve(&self, path: &Path) -> PathBuf;
}

/// Implementation backed by `tokio::fs`, rooted at the build directory.
#[derive(Debug, Clone)]
pub struct RealFileSystem {
    root: PathBuf,
}

impl RealFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> BoxFuture<'static, io::Result<Bytes>> {
        let full = self.full_path(path);
        async move { tokio::fs::read(full).await.map(Bytes::from) }.boxed()
    }

    fn write(&self, path: &Path, contents: Bytes) -> BoxFuture<'static, io::Result<()>> {
        let full = self.full_path(path);
        async move { tokio::fs::write(full, contents).await }.boxed()
    }

    fn create_dir_all(&self, path: &Path) -> BoxFuture<'static, io::Result<()>> {
        let full = self.full_path(path);
        async move { tokio::fs::create_dir_all(full).await }.boxed()
    }

    fn remove_file(&self, path: &Path) -> BoxFuture<'static, io::Result<()>> {
        let full = self.full_path(path);
        async move { tokio::fs::remove_file(full).await }.boxed()
    }

    fn remove_dir(&self, path: &Path) -> BoxFuture<'static, io::Result<()>> {
        let full = self.full_path(path);
        async move { tokio::fs::remove_dir(full).await }.boxed()
    }

    fn read_dir(&self, path: &Path) -> BoxFuture<'static, io::Result<Vec<DirEntry>>> {
        let full = self.full_path(path);
        let base = path.to_path_buf();
        async move {
            let mut entries = Vec::new();
            let mut dir = tokio::fs::read_dir(&full).await?;
            while let Some(entry) = dir.next_entry().await? {
                let file_type = entry.file_type().await?;
                // Follow symlinks so a linked directory is walked like a real one.
                let is_dir = if file_type.is_symlink() {
                    tokio::fs::metadata(entry.path())
                        .await
                        .map(|m| m.is_dir())
                        .unwrap_or(false)
                } else {
                    file_type.is_dir()
                };
                entries.push(DirEntry {
                    path: base.join(entry.file_name()),
                    is_dir,
                });
            }
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(entries)
        }
        .boxed()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let full = self.full_path(path);
        full.canonicalize().unwrap_or(full)
    }
}

/// Lexically resolve `.` and `..` components and drop trailing separators
/// so `./a/b/`, `a/c/../b` and `a/b` address the same entry.
///
/// A `..` with no normal component left to cancel is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Render a relative path with forward slashes.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
