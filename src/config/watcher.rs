//! Configuration file watcher for hot reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::VhostsConfig;

/// Monitors the configuration file and forwards every valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<VhostsConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<VhostsConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The parent directory is watched so that files replaced by rename
    /// keep being followed. Watching stops when the returned watcher is
    /// dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event)
                    if (event.kind.is_modify() || event.kind.is_create())
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == file_name.as_deref()) =>
                {
                    tracing::info!(path = ?path, "config file change detected, reloading");
                    match read_update(&path) {
                        Ok(Some(config)) => {
                            let _ = tx.send(config);
                        }
                        Ok(None) => {
                            tracing::debug!(path = ?path, "config file empty, waiting for content");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to reload config, keeping current vhosts");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "config watcher started");
        Ok(watcher)
    }
}

/// Loads the changed file, or `None` while it is empty.
///
/// Saving in place truncates the file before writing it, and an empty file
/// would otherwise parse as a table with no sites.
pub fn read_update(path: &Path) -> Result<Option<VhostsConfig>, ConfigError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    parse_config(&content).map(Some)
}
