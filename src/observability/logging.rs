//! Structured logging setup.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    let default_filter = format!("route_server={level},tower_http={level}");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Middleware: run the rest of the request under the server's own logger.
pub async fn scoped_logger(State(dispatch): State<Dispatch>, request: Request, next: Next) -> Response {
    next.run(request).with_subscriber(dispatch).await
}
