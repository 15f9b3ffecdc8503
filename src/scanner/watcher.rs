use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};

use crate::error::{PurgeError, Result};

/// Debounced change notifications for everything under a scan root.
pub struct ContentWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    receiver: Receiver<std::result::Result<Vec<DebouncedEvent>, notify::Error>>,
}

impl ContentWatcher {
    pub fn new(root: &Path) -> Result<Self> {
        Self::with_delay(root, Duration::from_millis(500))
    }

    pub fn with_delay(root: &Path, delay: Duration) -> Result<Self> {
        let (tx, rx) = channel();

        let mut debouncer =
            new_debouncer(delay, tx).map_err(|e| PurgeError::Watcher(e.to_string()))?;

        debouncer
            .watcher()
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| PurgeError::Watcher(e.to_string()))?;

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
        })
    }

    /// Block until the next batch of changes; `None` when the batch was an
    /// error or the watcher has shut down.
    pub fn recv(&self) -> Option<Vec<PathBuf>> {
        match self.receiver.recv() {
            Ok(Ok(events)) => Some(events.into_iter().map(|e| e.path).collect()),
            Ok(Err(e)) => {
                tracing::warn!("Watch error: {}", e);
                None
            }
            Err(_) => None,
        }
    }
}
