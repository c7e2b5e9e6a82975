//! Two-tier virtual host trie.
//!
//! # Responsibilities
//! - Map full hostnames (and `*` label patterns) to a path subtree
//! - Map path characters to nodes, recording the site at terminal nodes
//! - Resolve a request key to the longest registered path under the
//!   best host match
//!
//! # Design Decisions
//! - Build and serve are separate types: [`VhostTrieBuilder`] is the only
//!   place `insert` exists, [`VhostTrie`] is immutable and `Sync`
//! - Nodes live in one arena and reference children by index
//! - Host fallback order is exact, cumulative wildcard, `0.0.0.0`, empty host
//! - A node without a site never counts as a match, even if it is terminal

use std::collections::HashMap;
use std::fmt;

use crate::routing::key::split_host_path;

type NodeId = usize;

/// Host that matches any request when nothing more specific does.
pub const CATCH_ALL_ADDR: &str = "0.0.0.0";

/// Empty host, the last resort of host resolution.
pub const CATCH_ALL_EMPTY: &str = "";

/// One path character's worth of trie.
#[derive(Clone)]
struct PathNode<S> {
    // Path fan-out is small, so a flat list beats hashing.
    children: Vec<(u8, NodeId)>,
    site: Option<S>,
    path: String,
}

impl<S> PathNode<S> {
    fn new() -> Self {
        Self {
            children: Vec::new(),
            site: None,
            path: String::new(),
        }
    }

    fn child(&self, byte: u8) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, id)| *id)
    }
}

/// Result of a successful lookup.
#[derive(Debug, PartialEq, Eq)]
pub struct Matched<'a, S> {
    /// Site attached to the longest matching path.
    pub site: &'a S,
    /// The path string that was registered with `site`.
    pub path: &'a str,
}

/// Mutable trie used while sites are being registered.
///
/// Call [`freeze`](Self::freeze) once every site is inserted to obtain a
/// [`VhostTrie`] that can be shared between request handlers.
pub struct VhostTrieBuilder<S> {
    hosts: HashMap<String, NodeId>,
    nodes: Vec<PathNode<S>>,
    sites: usize,
}

impl<S> Default for VhostTrieBuilder<S> {
    fn default() -> Self {
        Self {
            hosts: HashMap::new(),
            nodes: Vec::new(),
            sites: 0,
        }
    }
}

impl<S> VhostTrieBuilder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `site` under `key` (`host`, `host/path` or `host:port/path`).
    ///
    /// Re-inserting a key replaces the site stored for it; the previous one is
    /// returned.
    pub fn insert(&mut self, key: &str, site: S) -> Option<S> {
        self.insert_opt(key, Some(site))
    }

    /// Like [`insert`](Self::insert), but `None` leaves the node registered
    /// without a site, so lookups pass over it.
    pub fn insert_opt(&mut self, key: &str, site: Option<S>) -> Option<S> {
        let (host, path) = split_host_path(key);

        let mut current = match self.hosts.get(&host) {
            Some(id) => *id,
            None => {
                let id = self.alloc();
                self.hosts.insert(host, id);
                id
            }
        };

        for byte in path.bytes() {
            current = match self.nodes[current].child(byte) {
                Some(id) => id,
                None => {
                    let id = self.alloc();
                    self.nodes[current].children.push((byte, id));
                    id
                }
            };
        }

        let node = &mut self.nodes[current];
        node.path = path.to_string();
        let previous = std::mem::replace(&mut node.site, site);
        match (&previous, &node.site) {
            (None, Some(_)) => self.sites += 1,
            (Some(_), None) => self.sites -= 1,
            _ => {}
        }
        previous
    }

    /// Number of keys currently carrying a site.
    pub fn len(&self) -> usize {
        self.sites
    }

    pub fn is_empty(&self) -> bool {
        self.sites == 0
    }

    /// Ends the build phase.
    pub fn freeze(self) -> VhostTrie<S> {
        tracing::trace!(
            hosts = self.hosts.len(),
            nodes = self.nodes.len(),
            sites = self.sites,
            "vhost trie frozen"
        );
        VhostTrie {
            hosts: self.hosts,
            nodes: self.nodes,
            sites: self.sites,
        }
    }

    fn alloc(&mut self) -> NodeId {
        self.nodes.push(PathNode::new());
        self.nodes.len() - 1
    }
}

impl<K: AsRef<str>, S> Extend<(K, S)> for VhostTrieBuilder<S> {
    fn extend<I: IntoIterator<Item = (K, S)>>(&mut self, iter: I) {
        for (key, site) in iter {
            self.insert(key.as_ref(), site);
        }
    }
}

impl<S> fmt::Debug for VhostTrieBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VhostTrieBuilder")
            .field("hosts", &self.hosts.len())
            .field("nodes", &self.nodes.len())
            .field("sites", &self.sites)
            .finish()
    }
}

/// Immutable virtual host matcher.
///
/// Matches first by hostname, supporting `*` labels the way certificate
/// names do, then by longest registered path prefix.
#[derive(Clone)]
pub struct VhostTrie<S> {
    hosts: HashMap<String, NodeId>,
    nodes: Vec<PathNode<S>>,
    sites: usize,
}

impl<S> Default for VhostTrie<S> {
    fn default() -> Self {
        VhostTrieBuilder::new().freeze()
    }
}

impl<S> VhostTrie<S> {
    pub fn builder() -> VhostTrieBuilder<S> {
        VhostTrieBuilder::new()
    }

    /// Finds the site responsible for `key`.
    ///
    /// The matched path is a prefix of the key's path, if not the whole path.
    /// Returns `None` when no host resolves or no registered path is a prefix.
    pub fn lookup(&self, key: &str) -> Option<Matched<'_, S>> {
        let (host, path) = split_host_path(key);

        let root = self
            .match_host(&host)
            .or_else(|| self.match_host(CATCH_ALL_ADDR))
            .or_else(|| self.match_host(CATCH_ALL_EMPTY));

        let Some(root) = root else {
            tracing::trace!(host = %host, "no vhost for host");
            return None;
        };

        let node = &self.nodes[self.match_path(root, path)?];
        let site = node.site.as_ref()?;
        tracing::trace!(host = %host, path, matched = %node.path, "vhost matched");
        Some(Matched {
            site,
            path: &node.path,
        })
    }

    /// Registered hosts and host patterns, in no particular order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// Number of keys carrying a site.
    pub fn len(&self) -> usize {
        self.sites
    }

    pub fn is_empty(&self) -> bool {
        self.sites == 0
    }

    fn match_host(&self, host: &str) -> Option<NodeId> {
        if let Some(id) = self.hosts.get(host) {
            return Some(*id);
        }
        wildcard_candidates(host).find_map(|candidate| self.hosts.get(&candidate).copied())
    }

    /// Walks as far along `path` as the trie allows and returns the deepest
    /// visited node that carries a site.
    fn match_path(&self, root: NodeId, path: &str) -> Option<NodeId> {
        let mut longest = None;
        let mut current = root;
        for byte in path.bytes() {
            let Some(next) = self.nodes[current].child(byte) else {
                break;
            };
            if self.nodes[next].site.is_some() {
                longest = Some(next);
            }
            current = next;
        }
        longest
    }
}

impl<K: AsRef<str>, S> FromIterator<(K, S)> for VhostTrie<S> {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut builder = VhostTrieBuilder::new();
        builder.extend(iter);
        builder.freeze()
    }
}

impl<S> fmt::Debug for VhostTrie<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VhostTrie")
            .field("hosts", &self.hosts.len())
            .field("nodes", &self.nodes.len())
            .field("sites", &self.sites)
            .finish()
    }
}

/// Wildcard host patterns tried for `host` after the exact name, in order.
///
/// Labels are replaced with `*` from the left and stay replaced, so
/// `a.b.example.com` yields `*.b.example.com`, `*.*.example.com`,
/// `*.*.*.com` and `*.*.*.*`.
pub fn wildcard_candidates(host: &str) -> WildcardCandidates<'_> {
    WildcardCandidates {
        labels: host.split('.').collect(),
        next: 0,
    }
}

/// Iterator returned by [`wildcard_candidates`].
#[derive(Debug, Clone)]
pub struct WildcardCandidates<'a> {
    labels: Vec<&'a str>,
    next: usize,
}

impl Iterator for WildcardCandidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let label = self.labels.get_mut(self.next)?;
        *label = "*";
        self.next += 1;
        Some(self.labels.join("."))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.labels.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WildcardCandidates<'_> {}
