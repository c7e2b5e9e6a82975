//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every site address parses
//! - Reject ambiguous site names
//! - Report addresses that more than one site claims
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: VhostsConfig → Result<(), Vec<ValidationError>>
//! - Duplicate addresses are legal (the later site wins) and only reported
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

use crate::config::address::{AddressError, SiteAddress};
use crate::config::schema::VhostsConfig;
use crate::routing::key::split_host_path;

/// A semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("site #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate site name '{0}'")]
    DuplicateName(String),

    #[error("site '{site}' has no addresses")]
    NoAddresses { site: String },

    #[error("site '{site}' has invalid address '{address}': {source}")]
    InvalidAddress {
        site: String,
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

/// Validates a configuration, collecting every problem found.
pub fn validate_config(config: &VhostsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, site) in config.sites.iter().enumerate() {
        if site.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(site.name.as_str()) {
            errors.push(ValidationError::DuplicateName(site.name.clone()));
        }

        if site.addresses.is_empty() {
            errors.push(ValidationError::NoAddresses {
                site: site.name.clone(),
            });
        }

        for address in &site.addresses {
            if let Err(source) = SiteAddress::from_str(address) {
                errors.push(ValidationError::InvalidAddress {
                    site: site.name.clone(),
                    address: address.clone(),
                    source,
                });
            }
        }
    }

    if LevelFilter::from_str(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Normalized matcher keys that more than one address maps to, in first-seen
/// order. Unparseable addresses are skipped.
pub fn duplicate_addresses(config: &VhostsConfig) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();

    let keys = config
        .sites
        .iter()
        .flat_map(|site| site.addresses.iter())
        .filter_map(|address| SiteAddress::from_str(address).ok());

    for address in keys {
        let key = address.key();
        let (host, path) = split_host_path(&key);
        let normalized = format!("{}{}", host, path);
        let count = seen.entry(normalized.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(normalized);
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SiteConfig;

    fn config(sites: Vec<SiteConfig>) -> VhostsConfig {
        VhostsConfig {
            sites,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(vec![
            SiteConfig::new("a", "a.com"),
            SiteConfig::new("b", "https://*.b.com/api"),
        ]);
        assert_eq!(validate_config(&cfg), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut no_addr = SiteConfig::new("c", "x");
        no_addr.addresses.clear();

        let mut cfg = config(vec![
            SiteConfig::new("", "a.com"),
            SiteConfig::new("b", "gopher://b.com"),
            SiteConfig::new("b", "b.com"),
            no_addr,
        ]);
        cfg.observability.log_level = "loud".to_string();

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyName { index: 0 },
                ValidationError::InvalidAddress {
                    site: "b".to_string(),
                    address: "gopher://b.com".to_string(),
                    source: AddressError::UnknownScheme("gopher".to_string()),
                },
                ValidationError::DuplicateName("b".to_string()),
                ValidationError::NoAddresses {
                    site: "c".to_string()
                },
                ValidationError::InvalidLogLevel("loud".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_addresses_are_normalized() {
        let cfg = config(vec![
            SiteConfig::new("a", "Example.com:80/x"),
            SiteConfig::new("b", "https://example.com/x"),
            SiteConfig::new("c", "example.com/x"),
            SiteConfig::new("d", "example.com"),
        ]);
        assert_eq!(duplicate_addresses(&cfg), vec!["example.com/x".to_string()]);
        assert_eq!(validate_config(&cfg), Ok(()));
    }
}
