// src/fs/mock.rs

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures::future::{self, BoxFuture, FutureExt};

use super::{normalize, DirEntry, FileSystem};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Bytes),
    Dir(BTreeSet<String>), // child names
}

/// In-memory filesystem tree. The root is the empty path.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::new(), MockEntry::Dir(BTreeSet::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    /// Add a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = normalize(path.as_ref());
        let mut files = self.lock();
        if let Some(parent) = path.parent() {
            ensure_dir(&mut files, parent);
        }
        link_child(&mut files, &path);
        files.insert(path, MockEntry::File(Bytes::from(content.into())));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let mut files = self.lock();
        ensure_dir(&mut files, &path);
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.lock().contains_key(&normalize(path.as_ref()))
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        matches!(
            self.lock().get(&normalize(path.as_ref())),
            Some(MockEntry::Dir(_))
        )
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Bytes> {
        match self.lock().get(&normalize(path.as_ref())) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_now(&self, path: &Path, contents: Bytes) -> io::Result<()> {
        let path = normalize(path);
        let mut files = self.lock();
        let parent = path.parent().unwrap_or(Path::new(""));
        match files.get(parent) {
            Some(MockEntry::Dir(_)) => {}
            _ => return Err(not_found(parent)),
        }
        if let Some(MockEntry::Dir(_)) = files.get(&path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path:?}"),
            ));
        }
        link_child(&mut files, &path);
        files.insert(path, MockEntry::File(contents));
        Ok(())
    }

    fn remove_file_now(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut files = self.lock();
        match files.get(&path) {
            Some(MockEntry::File(_)) => {
                files.remove(&path);
                unlink_child(&mut files, &path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path:?}"),
            )),
            None => Err(not_found(&path)),
        }
    }

    fn remove_dir_now(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut files = self.lock();
        match files.get(&path) {
            Some(MockEntry::Dir(children)) if children.is_empty() => {
                files.remove(&path);
                unlink_child(&mut files, &path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                io::ErrorKind::DirectoryNotEmpty,
                format!("directory not empty: {path:?}"),
            )),
            Some(MockEntry::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {path:?}"),
            )),
            None => Err(not_found(&path)),
        }
    }

    fn read_dir_now(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let base = normalize(path);
        let files = self.lock();
        match files.get(&base) {
            Some(MockEntry::Dir(children)) => Ok(children
                .iter()
                .map(|name| {
                    let child = base.join(name);
                    let is_dir = matches!(files.get(&child), Some(MockEntry::Dir(_)));
                    DirEntry {
                        path: path.join(name),
                        is_dir,
                    }
                })
                .collect()),
            Some(MockEntry::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {base:?}"),
            )),
            None => Err(not_found(&base)),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {path:?}"))
}

fn ensure_dir(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if files.contains_key(path) {
        return;
    }
    if let Some(parent) = path.parent() {
        ensure_dir(files, parent);
    }
    link_child(files, path);
    files.insert(path.to_path_buf(), MockEntry::Dir(BTreeSet::new()));
}

fn link_child(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
        children.insert(name.to_string_lossy().into_owned());
    }
}

fn unlink_child(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
        children.remove(name.to_string_lossy().as_ref());
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> BoxFuture<'static, io::Result<Bytes>> {
        let path = normalize(path);
        let result = match self.lock().get(&path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path:?}"),
            )),
            None => Err(not_found(&path)),
        };
        future::ready(result).boxed()
    }

    fn write(&self, path: &Path, contents: Bytes) -> BoxFuture<'static, io::Result<()>> {
        future::ready(self.write_now(path, contents)).boxed()
    }

    fn create_dir_all(&self, path: &Path) -> BoxFuture<'static, io::Result<()>> {
        self.add_dir(path);
        future::ready(Ok(())).boxed()
    }

    fn remove_file(&self, path: &Path) -> BoxFuture<'static, io::Result<()>> {
        future::ready(self.remove_file_now(path)).boxed()
    }

    fn remove_dir(&self, path: &Path) -> BoxFuture<'static, io::Result<()>> {
        future::ready(self.remove_dir_now(path)).boxed()
    }

    fn read_dir(&self, path: &Path) -> BoxFuture<'static, io::Result<Vec<DirEntry>>> {
        future::ready(self.read_dir_now(path)).boxed()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        normalize(path)
    }
}
