//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() or Ctrl+C (signals.rs)
//!     → server stops accepting
//!     → in-flight requests drain
//!     → start()/serve() returns
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
