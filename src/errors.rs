// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Errors fall into a handful of classes:
//! - configuration errors, raised synchronously at the call that violates
//!   a contract (bad arguments, double load, only negative globs, ...)
//! - filesystem errors, which propagate unless a caller explicitly
//!   suppresses them (idempotent removal, ancestor pruning)
//! - task failures: a *named* task failing produces the fatal
//!   [`BuildError::TaskFailed`] signal, which the top-level run loop turns
//!   into a non-zero exit status.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(
        "Cannot run task {0}, no such task defined. To list available tasks run with --tasks"
    )]
    TaskNotFound(String),

    #[error("Cycle detected in task graph: {0}")]
    TaskCycle(String),

    /// A named task failed. This is the unrecoverable signal: nothing below
    /// the top-level run loop tries to handle it.
    #[error("task '{task}' failed after {elapsed}")]
    TaskFailed {
        task: String,
        elapsed: String,
        #[source]
        source: Box<BuildError>,
    },

    #[error("check found problems in {files} file(s)")]
    CheckFailed { files: usize },

    /// The same failure observed by every caller sharing a single-flight
    /// task execution.
    #[error(transparent)]
    Shared(Arc<BuildError>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    pub fn config(msg: impl Into<String>) -> Self {
        BuildError::ConfigError(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must stop the whole build.
    pub fn is_fatal(&self) -> bool {
        match self {
            BuildError::TaskFailed { .. } => true,
            BuildError::Shared(inner) => inner.is_fatal(),
            _ => false,
        }
    }

    /// Name of the failed task, if this is a fatal task failure.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            BuildError::TaskFailed { task, .. } => Some(task),
            BuildError::Shared(inner) => inner.failed_task(),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildError>;
