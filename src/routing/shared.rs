//! Atomically swappable matcher handle.
//!
//! # Responsibilities
//! - Hand request handlers a consistent snapshot of the current matcher
//! - Publish a freshly built matcher without blocking readers
//!
//! # Design Decisions
//! - Backed by `ArcSwap`: loads are lock-free, stores never wait for readers
//! - Only frozen [`VhostTrie`]s can be stored, so readers never see a
//!   partially built matcher

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::trie::VhostTrie;

/// Owned result of [`SharedVhosts::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<S> {
    pub site: S,
    pub path: String,
}

/// Shared, reloadable virtual host matcher.
#[derive(Debug)]
pub struct SharedVhosts<S> {
    current: ArcSwap<VhostTrie<S>>,
    generation: AtomicU64,
}

impl<S> SharedVhosts<S> {
    pub fn new(matcher: VhostTrie<S>) -> Self {
        Self {
            current: ArcSwap::from_pointee(matcher),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the matcher in use right now.
    ///
    /// Hold on to it for the duration of one request so every lookup made
    /// while handling it sees the same routing table.
    pub fn load(&self) -> Arc<VhostTrie<S>> {
        self.current.load_full()
    }

    /// Replaces the matcher. Returns the new generation number.
    pub fn store(&self, matcher: VhostTrie<S>) -> u64 {
        let sites = matcher.len();
        self.current.store(Arc::new(matcher));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, sites, "vhost matcher swapped");
        generation
    }

    /// How many times the matcher has been replaced.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl<S: Clone> SharedVhosts<S> {
    /// Looks `key` up in the current matcher, returning owned results.
    pub fn resolve(&self, key: &str) -> Option<Resolved<S>> {
        let guard = self.current.load();
        guard.lookup(key).map(|m| Resolved {
            site: m.site.clone(),
            path: m.path.to_string(),
        })
    }
}

impl<S> Default for SharedVhosts<S> {
    fn default() -> Self {
        Self::new(VhostTrie::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_store_replaces_matcher() {
        let shared = SharedVhosts::new([("a.com", Arc::new("a"))].into_iter().collect());
        assert_eq!(shared.resolve("a.com/x").map(|r| *r.site), Some("a"));
        assert_eq!(shared.generation(), 0);

        let next = [("b.com/x", Arc::new("b"))].into_iter().collect();
        assert_eq!(shared.store(next), 1);
        assert_eq!(shared.resolve("a.com/x"), None);
        assert_eq!(
            shared.resolve("b.com/x/y"),
            Some(Resolved {
                site: Arc::new("b"),
                path: "/x".to_string()
            })
        );
    }

    #[test]
    fn test_snapshot_outlives_swap() {
        let shared = SharedVhosts::new([("a.com", 1u32)].into_iter().collect());
        let snapshot = shared.load();
        shared.store(VhostTrie::default());

        assert_eq!(snapshot.lookup("a.com").map(|m| *m.site), Some(1));
        assert!(shared.load().is_empty());
    }

    #[test]
    fn test_concurrent_readers_during_swap() {
        let shared = Arc::new(SharedVhosts::new(
            [("a.com", 1u32)].into_iter().collect(),
        ));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        // Every snapshot is a complete matcher: one of the two tables.
                        let site = shared.resolve("a.com/").map(|r| r.site);
                        assert!(site == Some(1) || site == Some(2));
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            shared.store([("a.com", 2u32)].into_iter().collect());
            shared.store([("a.com", 1u32)].into_iter().collect());
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.generation(), 200);
    }
}
