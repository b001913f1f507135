// src/watch/watcher.rs

use std::fmt;
use std::path::PathBuf;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// A change reported for one or more watched paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub paths: Vec<PathBuf>,
}

/// Keeps the underlying `RecommendedWatcher` alive. Dropping it ends every
/// subscription and closes the event channel.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watched: usize,
}

impl WatcherHandle {
    pub fn watched(&self) -> usize {
        self.watched
    }
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watched", &self.watched)
            .finish()
    }
}

/// Subscribe to changes of every path in `paths` (one subscription each,
/// not recursive).
///
/// Access-only notifications are dropped; everything else is forwarded to
/// the returned receiver.
pub fn subscribe(paths: &[PathBuf]) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<ChangeEvent>)> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<ChangeEvent>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
            Ok(event) => {
                debug!(?event, "received notify event");
                if event_tx.send(ChangeEvent { paths: event.paths }).is_err() {
                    debug!("change receiver gone; dropping notify event");
                }
            }
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    for path in paths {
        watcher.watch(path, RecursiveMode::NonRecursive)?;
    }
    info!(paths = paths.len(), "file watcher started");

    Ok((
        WatcherHandle {
            _inner: watcher,
            watched: paths.len(),
        },
        event_rx,
    ))
}
