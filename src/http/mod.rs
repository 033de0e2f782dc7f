//! HTTP façade over axum.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (axum / axum-server)
//!     → tower-http layers (request id, trace, Server header, timeout, body limit)
//!     → middleware/ (upgrade guard, version guard, auth gate)
//!     → server.rs dispatch (route lookup)
//!     → request.rs (handler input per verb)
//!     → route handler + responder
//!     → response.rs (status + serialization)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use response::Formatters;
pub use server::RouteServer;
