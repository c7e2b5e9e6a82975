//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build matcher → Publish in SharedVhosts
//!
//! Reload (reload.rs):
//!     ConfigWatcher update → Build new matcher → Atomic swap
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Broadcast → Background tasks exit
//! ```
//!
//! # Design Decisions
//! - A matcher is published only after it is fully built
//! - A failed reload keeps the previous matcher in service

pub mod reload;
pub mod shutdown;

pub use reload::spawn_reloader;
pub use shutdown::Shutdown;
