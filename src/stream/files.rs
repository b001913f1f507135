// src/stream/files.rs

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as PollContext, Poll};

use futures::stream::{BoxStream, Fuse, Stream, StreamExt, TryStreamExt};

use crate::builder::Context;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::stream::file::{DiskFile, FileEntity, MemoryFile};
use crate::stream::nested::{flatten, Nested};
use crate::task::Task;
use crate::transform::{self, Checker, RenameTo};

/// Anything a [`FileStream`] can be built from.
pub type Producer = Nested<FileEntity>;

/// Lazy, ordered sequence of file entities.
///
/// A stream built from producers is single-pass: once drained, further
/// polling yields nothing. [`FileStream::ensure_completion`] drains it into
/// an owned sequence and returns a replayable stream over it; only such a
/// stream can hand out independent cursors via [`FileStream::replay`].
pub struct FileStream {
    inner: Inner,
}

enum Inner {
    Lazy(Fuse<BoxStream<'static, Result<FileEntity>>>),
    Replay {
        files: Arc<[FileEntity]>,
        next: usize,
    },
}

impl FileStream {
    pub fn new(producer: impl Into<Producer>) -> Self {
        Self {
            inner: Inner::Lazy(flatten(producer.into()).fuse()),
        }
    }

    pub fn empty() -> Self {
        Self::from_files(Vec::new())
    }

    /// A replayable stream over an already materialised sequence.
    pub fn from_files(files: impl Into<Arc<[FileEntity]>>) -> Self {
        Self {
            inner: Inner::Replay {
                files: files.into(),
                next: 0,
            },
        }
    }

    pub fn is_replayable(&self) -> bool {
        matches!(self.inner, Inner::Replay { .. })
    }

    /// An independent cursor over the whole sequence of a replayable stream.
    pub fn replay(&self) -> Option<FileStream> {
        match &self.inner {
            Inner::Replay { files, .. } => Some(FileStream::from_files(Arc::clone(files))),
            Inner::Lazy(_) => None,
        }
    }

    /// Drain the stream into an owned sequence.
    ///
    /// Fails with the first error any element produced.
    pub async fn into_files(self) -> Result<Arc<[FileEntity]>> {
        match self.inner {
            Inner::Replay { files, next: 0 } => Ok(files),
            Inner::Replay { files, next } => Ok(files[next..].into()),
            Inner::Lazy(stream) => {
                let files: Vec<FileEntity> = stream.try_collect().await?;
                Ok(files.into())
            }
        }
    }

    /// Drain the stream once and return a replayable stream over the result.
    pub async fn ensure_completion(self) -> Result<FileStream> {
        Ok(FileStream::from_files(self.into_files().await?))
    }

    /// Build `transform(self)` into a new stream without evaluating it.
    pub fn pipe<F, P>(self, transform: F) -> FileStream
    where
        F: FnOnce(FileStream) -> P,
        P: Into<Producer>,
    {
        FileStream::new(transform(self))
    }

    pub fn rename(self, target: impl Into<RenameTo>) -> FileStream {
        let target = target.into();
        self.pipe(|files| transform::rename(files, target))
    }

    pub fn remove(self, fs: Arc<dyn FileSystem>) -> FileStream {
        self.pipe(|files| transform::remove(files, fs))
    }

    pub fn dest(self, fs: Arc<dyn FileSystem>, target_dir: Option<String>) -> FileStream {
        self.pipe(|files| transform::dest(files, fs, target_dir))
    }

    pub fn check(self, checker: Arc<dyn Checker>) -> FileStream {
        self.pipe(|files| transform::check(files, checker))
    }

    /// Watch the paths of this stream and rerun `tasks` on every change.
    /// Draining the result never finishes while subscriptions are alive.
    pub fn watch(self, ctx: &Context, tasks: Vec<Task>) -> FileStream {
        let ctx = ctx.clone();
        self.pipe(|files| {
            Producer::deferred(async move {
                crate::watch::watch(&ctx, files, tasks).await?;
                Ok(Nested::Empty)
            })
        })
    }
}

impl Default for FileStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Lazy(_) => f.write_str("FileStream(lazy)"),
            Inner::Replay { files, next } => f
                .debug_struct("FileStream")
                .field("files", &files.len())
                .field("next", next)
                .finish(),
        }
    }
}

impl Stream for FileStream {
    type Item = Result<FileEntity>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut PollContext<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.get_mut().inner {
            Inner::Lazy(stream) => stream.poll_next_unpin(cx),
            Inner::Replay { files, next } => match files.get(*next) {
                Some(file) => {
                    *next += 1;
                    Poll::Ready(Some(Ok(file.clone())))
                }
                None => Poll::Ready(None),
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Lazy(stream) => stream.size_hint(),
            Inner::Replay { files, next } => {
                let left = files.len().saturating_sub(*next);
                (left, Some(left))
            }
        }
    }
}

impl From<FileEntity> for Producer {
    fn from(file: FileEntity) -> Self {
        Nested::Leaf(file)
    }
}

impl From<DiskFile> for Producer {
    fn from(file: DiskFile) -> Self {
        Nested::Leaf(file.into())
    }
}

impl From<MemoryFile> for Producer {
    fn from(file: MemoryFile) -> Self {
        Nested::Leaf(file.into())
    }
}

impl From<FileStream> for Producer {
    fn from(stream: FileStream) -> Self {
        Nested::leaves(stream)
    }
}

impl From<()> for Producer {
    fn from(_: ()) -> Self {
        Nested::Empty
    }
}

impl<U: Into<Producer>> From<Vec<U>> for Producer {
    fn from(items: Vec<U>) -> Self {
        Nested::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<U: Into<Producer>> From<Option<U>> for Producer {
    fn from(item: Option<U>) -> Self {
        item.map(Into::into).unwrap_or(Nested::Empty)
    }
}
