//! Watch mode
//!
//! Every dependency source directory gets one recursive filesystem watch.
//! All events feed a single channel, and a [`Debouncer`] turns each burst of
//! events into exactly one job run. Jobs run on the debouncer's own thread,
//! so two passes can never overlap; events that arrive while a pass is
//! running wait in the channel and collapse into a single follow-up pass.

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use linkdeps_fs::constants::{GIT_DIR, NODE_MODULES};

use crate::Result;

/// Coalesces bursts of trigger events into single job runs.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay: Duration,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The quiet window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `job` once for every burst of events received on `events`.
    ///
    /// A burst ends when no event arrives for the quiet window. Returns the
    /// number of job runs once every sender is gone.
    ///
    /// # Errors
    ///
    /// A configuration error from `job` stops the loop and is returned.
    /// Any other error is logged and the loop keeps waiting for events.
    pub fn run<T, F>(&self, events: &Receiver<T>, mut job: F) -> Result<usize>
    where
        F: FnMut() -> Result<()>,
    {
        let mut runs = 0;

        while events.recv().is_ok() {
            loop {
                match events.recv_timeout(self.delay) {
                    Ok(_) => continue,
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            runs += 1;
            tracing::debug!(run = runs, "Debounce window closed; running job");
            match job() {
                Ok(()) => {}
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => tracing::error!(error = %e, "Synchronization pass failed"),
            }
        }

        Ok(runs)
    }
}

/// Filesystem watches over dependency source directories.
pub struct WatchScheduler {
    debouncer: Debouncer,
    watched: Vec<PathBuf>,
    events: Receiver<()>,
    // Dropping a watcher stops its events
    _watchers: Vec<RecommendedWatcher>,
}

impl WatchScheduler {
    /// Start watching every path in `paths` recursively.
    ///
    /// # Errors
    ///
    /// Fails if a watcher cannot be created or a path cannot be watched.
    pub fn new(paths: &[PathBuf], delay: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watchers = Vec::with_capacity(paths.len());

        for path in paths {
            let tx = tx.clone();
            let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
                match res {
                    Ok(event) if is_relevant(&event) => {
                        tracing::trace!(paths = ?event.paths, "Change detected");
                        let _ = tx.send(());
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Watch error"),
                }
            })?;
            watcher.watch(path, RecursiveMode::Recursive)?;
            tracing::info!("Watching '{}'", path.display());
            watchers.push(watcher);
        }

        Ok(Self {
            debouncer: Debouncer::new(delay),
            watched: paths.to_vec(),
            events: rx,
            _watchers: watchers,
        })
    }

    /// Directories being watched.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Run `job` after every burst of changes, until a configuration error
    /// occurs. Blocks the calling thread.
    pub fn run<F>(self, job: F) -> Result<usize>
    where
        F: FnMut() -> Result<()>,
    {
        self.debouncer.run(&self.events, job)
    }
}

fn is_relevant(event: &Event) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.is_empty() || event.paths.iter().any(|p| !is_tooling_path(p))
}

/// Paths inside `.git` or `node_modules` never affect the fingerprint.
fn is_tooling_path(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name == GIT_DIR || name == NODE_MODULES,
        _ => false,
    })
}
