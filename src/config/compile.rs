//! Turns a validated configuration into a frozen matcher.

use std::str::FromStr;
use std::sync::Arc;

use crate::config::address::SiteAddress;
use crate::config::schema::{SiteConfig, VhostsConfig};
use crate::routing::trie::{VhostTrie, VhostTrieBuilder};

/// Registers every address of every site, in file order, and freezes.
///
/// Sites sharing an address resolve to the one listed last. Addresses that
/// do not parse are registered verbatim; the matcher accepts any key.
pub fn build_matcher(config: &VhostsConfig) -> VhostTrie<Arc<SiteConfig>> {
    let mut builder = VhostTrieBuilder::new();

    for site in &config.sites {
        let site = Arc::new(site.clone());
        for address in &site.addresses {
            let keys = match SiteAddress::from_str(address) {
                Ok(parsed) => parsed.matcher_keys(),
                Err(e) => {
                    tracing::warn!(site = %site.name, address = %address, error = %e, "registering unparsed address");
                    vec![address.clone()]
                }
            };
            for key in keys {
                if let Some(previous) = builder.insert(&key, site.clone()) {
                    tracing::debug!(key = %key, previous = %previous.name, site = %site.name, "address reassigned");
                }
            }
        }
    }

    let matcher = builder.freeze();
    tracing::info!(sites = config.sites.len(), keys = matcher.len(), "vhost matcher built");
    matcher
}
