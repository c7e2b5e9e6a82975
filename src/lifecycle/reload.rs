//! Matcher rebuild on configuration change.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::compile::build_matcher;
use crate::config::schema::{SiteConfig, VhostsConfig};
use crate::routing::shared::SharedVhosts;

/// Spawns a task that rebuilds and swaps the matcher for every config
/// received on `updates`.
///
/// The task ends when `shutdown` fires or the sending side is dropped.
pub fn spawn_reloader(
    vhosts: Arc<SharedVhosts<Arc<SiteConfig>>>,
    mut updates: mpsc::UnboundedReceiver<VhostsConfig>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(config) = update else {
                        tracing::debug!("config update channel closed");
                        break;
                    };
                    let generation = vhosts.store(build_matcher(&config));
                    tracing::info!(generation, sites = config.sites.len(), "vhosts reloaded");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("reloader stopping");
                    break;
                }
            }
        }
    })
}
