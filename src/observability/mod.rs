//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!       (routing at trace, reloads at info, config problems at warn/error)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, text or JSON)
//! ```

pub mod logging;

pub use logging::init_logging;
