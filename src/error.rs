//! Error types for construction, startup and route handlers.
//!
//! # Design Decisions
//! - Misconfiguration surfaces synchronously from `RouteServer::new`
//! - Startup failures (bind, TLS material) are returned from `start`
//! - Handler failures never leave the request path; they become 500s

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while building or starting a [`RouteServer`](crate::RouteServer).
#[derive(Debug, Error)]
pub enum RouteServerError {
    /// Malformed construction input (bad pattern, half-configured TLS, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Certificate or key could not be loaded.
    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    /// Serving failed after the listener was bound.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error reported by a route handler through its responder.
///
/// Its message becomes the body of the 500 response. Any `std::error::Error`
/// converts into it, so handlers can use `?` on their own results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error,
{
    fn from(error: E) -> Self {
        Self::new(error.to_string())
    }
}
