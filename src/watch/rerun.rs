// src/watch/rerun.rs

use std::sync::Arc;

use futures::future::{self, BoxFuture};
use tokio::sync::mpsc;
use tracing::debug;

use crate::builder::Context;
use crate::errors::Result;
use crate::stream::{FileEntity, FileStream};
use crate::task::{parallel, Task};

use super::watcher::ChangeEvent;

type Run = BoxFuture<'static, Result<FileStream>>;

/// Reruns a fixed set of tasks on the watched files whenever a change
/// arrives.
///
/// At most one rerun is in flight. A change arriving while a rerun is still
/// going is dropped, not queued.
pub struct RerunLoop {
    ctx: Context,
    files: Arc<[FileEntity]>,
    tasks: Task,
}

impl RerunLoop {
    pub fn new(ctx: Context, files: Arc<[FileEntity]>, tasks: Vec<Task>) -> Self {
        Self {
            ctx,
            files,
            tasks: parallel(tasks),
        }
    }

    /// Consume `events` until the channel closes.
    ///
    /// A failing rerun ends the loop with its error.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<ChangeEvent>) -> Result<()> {
        let mut in_flight: Option<Run> = None;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if in_flight.is_some() {
                        debug!(paths = ?event.paths, "rerun in progress; dropping change");
                        continue;
                    }
                    debug!(paths = ?event.paths, "change detected; rerunning tasks");
                    in_flight = Some(self.start());
                }
                result = poll_run(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    result?;
                }
            }
        }

        if let Some(run) = in_flight {
            run.await?;
        }
        Ok(())
    }

    fn start(&self) -> Run {
        let input = FileStream::from_files(Arc::clone(&self.files));
        self.tasks.run(&self.ctx, Some(input))
    }
}

async fn poll_run(slot: &mut Option<Run>) -> Result<FileStream> {
    match slot {
        Some(run) => run.await,
        None => future::pending().await,
    }
}
