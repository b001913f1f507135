// src/task/mod.rs

//! Tasks: handlers with identity, optional names, a running flag and a
//! single-flight cache for input-less runs.
//!
//! - A run **without input** is shared: every caller awaits the same
//!   execution, and later callers observe the cached result (or failure).
//! - A run **with input** always executes the handler afresh.
//! - A **named** task logs start/finish/failure with elapsed time and turns
//!   any failure into the fatal [`BuildError::TaskFailed`] signal. Unnamed
//!   tasks pass failures through untouched.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error};

use crate::builder::Context;
use crate::errors::{BuildError, Result};
use crate::stream::{FileEntity, FileStream, Producer};

pub mod compose;
pub mod registry;

pub use compose::{parallel, series};
pub use registry::TaskRegistry;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique task identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type HandlerFuture = BoxFuture<'static, Result<Producer>>;

/// User code behind a task.
///
/// Implemented for every `Fn(Context, Option<FileStream>) -> impl Future`
/// whose output converts into a [`Producer`].
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: Context, input: Option<FileStream>) -> HandlerFuture;
}

impl<F, Fut, P> Handler for F
where
    F: Fn(Context, Option<FileStream>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P>> + Send + 'static,
    P: Into<Producer> + Send + 'static,
{
    fn call(&self, ctx: Context, input: Option<FileStream>) -> HandlerFuture {
        let fut = self(ctx, input);
        async move { fut.await.map(Into::into) }.boxed()
    }
}

type SharedRun =
    Shared<BoxFuture<'static, std::result::Result<Arc<[FileEntity]>, Arc<BuildError>>>>;

struct TaskInner {
    id: TaskId,
    name: OnceLock<String>,
    handler: Arc<dyn Handler>,
    running: Arc<AtomicBool>,
    cached: Mutex<Option<SharedRun>>,
}

/// Cheap, clonable handle to a task. Clones share identity, name, running
/// flag and cache.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

impl Task {
    pub fn from_handler(handler: Arc<dyn Handler>) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                id: TaskId::next(),
                name: OnceLock::new(),
                handler,
                running: Arc::new(AtomicBool::new(false)),
                cached: Mutex::new(None),
            }),
        }
    }

    pub fn from_fn<F, Fut, P>(f: F) -> Self
    where
        F: Fn(Context, Option<FileStream>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P>> + Send + 'static,
        P: Into<Producer> + Send + 'static,
    {
        Self::from_handler(Arc::new(f))
    }

    pub fn named<F, Fut, P>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Context, Option<FileStream>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P>> + Send + 'static,
        P: Into<Producer> + Send + 'static,
    {
        let task = Self::from_fn(f);
        task.name_if_unset(name.into());
        task
    }

    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.get().map(String::as_str)
    }

    /// Give the task a name unless it already has one. Returns the name in
    /// effect afterwards.
    pub(crate) fn name_if_unset(&self, name: String) -> &str {
        self.inner.name.get_or_init(|| name)
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Whether two handles refer to the same task.
    pub fn ptr_eq(a: &Task, b: &Task) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Run the task.
    ///
    /// Without input the execution is shared and cached for the lifetime of
    /// the task; with input the handler runs again on that input. The
    /// returned stream is already drained and replayable.
    pub fn run(&self, ctx: &Context, input: Option<FileStream>) -> BoxFuture<'static, Result<FileStream>> {
        if let Some(input) = input {
            let exec = self.execution(ctx);
            return async move { exec.execute(Some(input)).await.map(FileStream::from_files) }
                .boxed();
        }

        let shared = {
            let mut slot = self
                .inner
                .cached
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slot.get_or_insert_with(|| {
                let exec = self.execution(ctx);
                async move { exec.execute(None).await.map_err(Arc::new) }
                    .boxed()
                    .shared()
            })
            .clone()
        };

        async move {
            shared
                .await
                .map(FileStream::from_files)
                .map_err(BuildError::Shared)
        }
        .boxed()
    }

    fn execution(&self, ctx: &Context) -> Execution {
        Execution {
            ctx: ctx.clone(),
            name: self.name().map(str::to_owned),
            handler: Arc::clone(&self.inner.handler),
            running: Arc::clone(&self.inner.running),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Everything one execution needs, detached from the task handle so the
/// cached future does not keep the task alive.
struct Execution {
    ctx: Context,
    name: Option<String>,
    handler: Arc<dyn Handler>,
    running: Arc<AtomicBool>,
}

impl Execution {
    async fn execute(self, input: Option<FileStream>) -> Result<Arc<[FileEntity]>> {
        let _running = RunningGuard::enter(&self.running);

        let Some(name) = self.name.clone() else {
            return self.drain(input).await;
        };

        self.ctx.log(format_args!("Starting '{name}'..."));
        let started = Instant::now();

        match self.drain(input).await {
            Ok(files) => {
                let elapsed = format_elapsed(started.elapsed());
                self.ctx.log(format_args!("Finished '{name}' after {elapsed}"));
                Ok(files)
            }
            // Already fatal further down: report it once, where it happened.
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                let elapsed = format_elapsed(started.elapsed());
                self.ctx.log(format_args!("'{name}' errored after {elapsed}"));
                error!(task = %name, error = %err, "task failed");
                Err(BuildError::TaskFailed {
                    task: name,
                    elapsed,
                    source: Box::new(err),
                })
            }
        }
    }

    async fn drain(&self, input: Option<FileStream>) -> Result<Arc<[FileEntity]>> {
        let produced = self.handler.call(self.ctx.clone(), input).await?;
        let files = FileStream::new(produced).into_files().await?;
        debug!(task = ?self.name, files = files.len(), "handler output drained");
        Ok(files)
    }
}

/// Holds the running flag up until dropped, including on cancellation.
struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Human readable duration: seconds with two decimals from one second up,
/// whole milliseconds below.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms >= 1000 {
        format!("{:.2} s", ms as f64 / 1000.0)
    } else {
        format!("{ms} ms")
    }
}
