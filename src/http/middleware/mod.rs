//! Request pipeline stages that run before route dispatch.
//!
//! ```text
//! request → auth gate → upgrade guard → version guard → dispatch
//! ```

pub mod auth;
pub mod upgrade;
pub mod version;

pub use auth::{auth_gate, AuthHandler, AuthOutcome};
pub use upgrade::reject_upgrades;
pub use version::{version_guard, ApiVersions};
