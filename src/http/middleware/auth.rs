//! Authorization gate.
//! Runs the configured auth handler before every route.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::observability::metrics;

/// Verdict returned by an auth handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
}

impl AuthOutcome {
    pub fn allow() -> Self {
        Self { success: true }
    }

    pub fn deny() -> Self {
        Self { success: false }
    }
}

impl From<bool> for AuthOutcome {
    fn from(success: bool) -> Self {
        Self { success }
    }
}

type AuthFn = dyn Fn(&Request) -> AuthOutcome + Send + Sync;

/// Synchronous check applied to every incoming request.
#[derive(Clone)]
pub struct AuthHandler(Arc<AuthFn>);

impl AuthHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Request) -> AuthOutcome + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Whether the request may proceed. A panicking handler denies.
    pub fn authorize(&self, request: &Request) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.0)(request))) {
            Ok(outcome) => outcome.success,
            Err(_) => {
                tracing::error!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    "Auth handler panicked, denying request"
                );
                false
            }
        }
    }
}

impl fmt::Debug for AuthHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthHandler")
    }
}

/// Middleware: 403 with an empty body unless the auth handler allows the request.
pub async fn auth_gate(State(handler): State<AuthHandler>, request: Request, next: Next) -> Response {
    if handler.authorize(&request) {
        return next.run(request).await;
    }

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "Request denied by auth handler"
    );
    metrics::record_denied(request.method().as_str());
    StatusCode::FORBIDDEN.into_response()
}
