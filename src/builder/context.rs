// src/builder/context.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::discover;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::stream::FileStream;
use crate::task::{Task, TaskRegistry};
use crate::types::{FlagValue, Flags, MatchOptions};

/// Everything a running task can reach: flags, the filesystem rooted at
/// the build directory, discovery, logging and the other tasks of the
/// build.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    flags: Flags,
    fs: Arc<dyn FileSystem>,
    tasks: Arc<TaskRegistry>,
    build_file: Option<PathBuf>,
}

impl Context {
    /// A context with no tasks and no build file, mostly useful to run
    /// tasks directly.
    pub fn new(flags: Flags, fs: Arc<dyn FileSystem>) -> Self {
        Self::from_parts(flags, fs, Arc::new(TaskRegistry::new()), None)
    }

    pub(crate) fn from_parts(
        flags: Flags,
        fs: Arc<dyn FileSystem>,
        tasks: Arc<TaskRegistry>,
        build_file: Option<PathBuf>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                flags,
                fs,
                tasks,
                build_file,
            }),
        }
    }

    /// Emit a build log line.
    pub fn log(&self, message: impl fmt::Display) {
        info!(target: "pipebuild::build", "{message}");
    }

    pub fn flags(&self) -> &Flags {
        &self.inner.flags
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.inner.flags.has(name)
    }

    pub fn get_flag(&self, name: &str) -> Option<&FlagValue> {
        self.inner.flags.get(name)
    }

    pub fn fs(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.inner.fs)
    }

    pub fn build_file(&self) -> Option<&Path> {
        self.inner.build_file.as_deref()
    }

    /// Discover files with default matching options.
    pub fn src<I, S>(&self, globs: I) -> Result<FileStream>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.src_with(globs, &MatchOptions::default())
    }

    pub fn src_with<I, S>(&self, globs: I, options: &MatchOptions) -> Result<FileStream>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        discover::src(self.fs(), globs, options)
    }

    /// Look up another task of the build by name.
    pub fn task(&self, name: &str) -> Option<Task> {
        self.inner.tasks.by_name(name).cloned()
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.inner.tasks
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("flags", &self.inner.flags)
            .field("build_file", &self.inner.build_file)
            .field("tasks", &self.inner.tasks.len())
            .finish_non_exhaustive()
    }
}
