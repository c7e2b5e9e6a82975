//! Virtual host routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host header, URL path)
//!     → key.rs (split host/path, lowercase host, strip port)
//!     → trie.rs (host layer: exact → *.wildcards → 0.0.0.0 → "")
//!     → trie.rs (path layer: longest registered prefix)
//!     → Return: site + matched path, or no match
//!
//! Matcher compilation (at startup and on reload):
//!     SiteConfig[]
//!     → VhostTrieBuilder::insert per site address
//!     → freeze into an immutable VhostTrie
//!     → shared.rs (atomic swap for readers)
//! ```
//!
//! # Design Decisions
//! - Matchers are built once, immutable at runtime
//! - No regex and no path parameters (prefix matching only)
//! - Deterministic: same input always matches same site
//! - First host hit wins, then longest path

pub mod key;
pub mod shared;
pub mod trie;

pub use key::{request_key, split_host_path};
pub use shared::{Resolved, SharedVhosts};
pub use trie::{wildcard_candidates, Matched, VhostTrie, VhostTrieBuilder};
