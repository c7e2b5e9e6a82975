//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the virtual host
//! table. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration: the sites served on a listener.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct VhostsConfig {
    /// Site definitions, in registration order.
    pub sites: Vec<SiteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A single virtual host.
///
/// The matcher never looks inside this; it is handed back to the caller on a
/// successful match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Site identifier for logging.
    pub name: String,

    /// Addresses this site answers to, e.g. `"example.com/blog"`,
    /// `"https://*.example.com"` or `":8080"`.
    pub addresses: Vec<String>,

    /// Document root, if the site serves files.
    #[serde(default)]
    pub root: Option<String>,

    /// Extra response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl SiteConfig {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addresses: vec![address.into()],
            root: None,
            headers: BTreeMap::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (off, trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
