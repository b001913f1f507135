// src/watch/mod.rs

//! File watching.
//!
//! [`watch`] drains a file stream, subscribes to change notifications for
//! every path in it and reruns a set of tasks on each change. It only
//! returns when the subscriptions end or a rerun fails.

pub mod rerun;
pub mod watcher;

use std::path::{Path, PathBuf};

use crate::builder::Context;
use crate::errors::Result;
use crate::stream::FileStream;
use crate::task::Task;

pub use rerun::RerunLoop;
pub use watcher::{subscribe, ChangeEvent, WatcherHandle};

pub async fn watch(ctx: &Context, files: FileStream, tasks: Vec<Task>) -> Result<()> {
    let files = files.into_files().await?;

    let fs = ctx.fs();
    let paths: Vec<PathBuf> = files
        .iter()
        .map(|file| fs.resolve(Path::new(file.path())))
        .collect();

    let (handle, events) = subscribe(&paths)?;
    ctx.log("Waiting for file changes...");

    let result = RerunLoop::new(ctx.clone(), files, tasks).run(events).await;
    drop(handle);
    result
}
