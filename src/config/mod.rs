//! Configuration management.
//!
//! # Data Flow
//! ```text
//! route-server.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (+ handlers, formatters, logger set in code)
//!     → consumed once by RouteServer::new
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation reports every problem, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{HttpsOptions, LimitsConfig, ObservabilityConfig, ServerConfig, TimeoutConfig, VersionSpec};
pub use validation::{validate_config, ValidationError};
