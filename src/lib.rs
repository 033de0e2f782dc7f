//! REST route server library.
//!
//! A thin façade over axum: register `get`/`post`/`put`/`del` handlers,
//! optionally gate every request through an auth handler, and let handler
//! outcomes be turned into uniform HTTP responses.
//!
//! ```no_run
//! use route_server::{RouteServer, ServerConfig};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), route_server::RouteServerError> {
//! let mut server = RouteServer::new(ServerConfig::default())?;
//! server.get("/ping", |_, respond| respond.ok(json!({"ok": true})))?;
//! server.start().await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use error::{HandlerError, RouteServerError};
pub use handler::{HandlerResult, Responder, RouteHandler};
pub use http::middleware::{AuthHandler, AuthOutcome};
pub use http::RouteServer;
pub use lifecycle::Shutdown;
pub use routing::{HandlerRegistry, RouteDescriptor, Verb};
