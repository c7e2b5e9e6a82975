//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → VhostsConfig (validated, immutable)
//!     → compile.rs (site addresses → frozen VhostTrie)
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → compile.rs builds a new matcher
//!     → atomic swap in routing::SharedVhosts
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod address;
pub mod compile;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use address::{AddressError, Scheme, SiteAddress};
pub use compile::build_matcher;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, SiteConfig, VhostsConfig};
pub use validation::{duplicate_addresses, validate_config, ValidationError};
pub use watcher::ConfigWatcher;
