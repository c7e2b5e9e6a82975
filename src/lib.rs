//! Virtual host dispatch library.
//!
//! Resolves a request key (`host[:port][/path]`) to the site configured to
//! serve it: exact host, then `*` label wildcards, then catch-all hosts,
//! then the longest registered path prefix.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::{SiteConfig, VhostsConfig};
pub use lifecycle::Shutdown;
pub use routing::{Matched, SharedVhosts, VhostTrie, VhostTrieBuilder};
