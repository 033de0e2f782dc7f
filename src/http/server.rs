//! Route server setup and dispatch.
//!
//! # Responsibilities
//! - Validate configuration and register routes before start
//! - Build the axum Router with all middleware layers
//! - Bind plain or TLS listeners and serve until shutdown
//! - Dispatch requests to route handlers and finalize responses

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::instrument::WithSubscriber;

use crate::config::{validate_config, HttpsOptions, ServerConfig};
use crate::error::RouteServerError;
use crate::handler::{Responder, RouteHandler};
use crate::http::middleware::{auth_gate, reject_upgrades, version_guard, ApiVersions, AuthHandler};
use crate::http::request::extract_input;
use crate::http::response::{process_result, Formatters};
use crate::lifecycle::{signals::shutdown_signal, Shutdown};
use crate::net::tls::load_tls_config;
use crate::observability::{logging::scoped_logger, metrics};
use crate::routing::{Lookup, PathPattern, RouteDescriptor, RouteTable, Verb};

/// State shared by every dispatched request.
struct DispatchState {
    table: RouteTable,
    formatters: Formatters,
}

/// REST façade: register handlers per verb and pattern, then start.
#[derive(Debug)]
pub struct RouteServer {
    config: ServerConfig,
    table: RouteTable,
    auth_handler: Option<AuthHandler>,
    shutdown: Shutdown,
}

impl RouteServer {
    /// Create a server. Fails with `InvalidArgument` on malformed
    /// configuration or route patterns. No socket is opened.
    pub fn new(mut config: ServerConfig) -> Result<Self, RouteServerError> {
        validate_config(&config).map_err(|errors| {
            RouteServerError::InvalidArgument(
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            )
        })?;

        let routes = config.routes.take();
        let auth_handler = config.auth_handler.take();
        if auth_handler.is_some() {
            tracing::debug!(name = %config.name, "Auth handler installed");
        }

        let mut server = Self {
            config,
            table: RouteTable::new(),
            auth_handler,
            shutdown: Shutdown::new(),
        };

        if let Some(routes) = routes {
            server.set_routes(routes)?;
        }
        Ok(server)
    }

    /// Register a GET handler; it receives path and query parameters.
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteServerError>
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        self.route(Verb::Get, pattern, RouteHandler::new(handler))
    }

    /// Register a POST handler; it receives the request body.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteServerError>
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        self.route(Verb::Post, pattern, RouteHandler::new(handler))
    }

    /// Register a PUT handler; it receives the request body.
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteServerError>
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        self.route(Verb::Put, pattern, RouteHandler::new(handler))
    }

    /// Register a DELETE handler; it receives the request body.
    pub fn del<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteServerError>
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        self.route(Verb::Delete, pattern, RouteHandler::new(handler))
    }

    /// Register a prebuilt handler for a verb. A later registration of the
    /// same verb and pattern replaces this one.
    pub fn route(&mut self, verb: Verb, pattern: &str, handler: RouteHandler) -> Result<&mut Self, RouteServerError> {
        let compiled = PathPattern::parse(pattern).map_err(RouteServerError::InvalidArgument)?;
        if self.table.insert(verb, compiled, handler) {
            tracing::debug!(method = %verb, pattern, "Route handler replaced");
        } else {
            tracing::debug!(method = %verb, pattern, "Route registered");
        }
        Ok(self)
    }

    /// Register routes in order, skipping entries without a handler or with
    /// an unrecognized method.
    pub fn set_routes(&mut self, routes: Vec<RouteDescriptor>) -> Result<(), RouteServerError> {
        for descriptor in routes {
            let Some(handler) = descriptor.handler else {
                tracing::debug!(url = %descriptor.url, "Skipping route without handler");
                continue;
            };
            let Ok(verb) = descriptor.method.parse::<Verb>() else {
                tracing::debug!(method = %descriptor.method, url = %descriptor.url, "Skipping route with unknown method");
                continue;
            };
            self.route(verb, &descriptor.url, handler)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of registered (verb, pattern) pairs.
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    /// Handle that stops a running server gracefully when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Freeze the route table and build the axum Router with all layers.
    #[allow(deprecated)]
    pub fn into_router(self) -> Router {
        let RouteServer {
            config,
            table,
            auth_handler,
            ..
        } = self;

        let state = Arc::new(DispatchState {
            table,
            formatters: config.formatters.clone(),
        });

        let mut router = Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state);

        if let Some(versions) = ApiVersions::new(config.versions()) {
            router = router.layer(middleware::from_fn_with_state(versions, version_guard));
        }
        if !config.handle_upgrades {
            router = router.layer(middleware::from_fn(reject_upgrades));
        }
        router = router
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        // The gate answers before any size or time limit can.
        if let Some(handler) = auth_handler {
            router = router.layer(middleware::from_fn_with_state(handler, auth_gate));
        }

        let server_name = HeaderValue::from_str(&config.name).unwrap_or_else(|_| HeaderValue::from_static("restapi"));
        router = router
            .layer(SetResponseHeaderLayer::overriding(header::SERVER, server_name))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        if let Some(dispatch) = config.logger {
            router = router.layer(middleware::from_fn_with_state(dispatch, scoped_logger));
        }
        router
    }

    /// Bind `host:port` and serve until Ctrl+C or the shutdown handle fires.
    pub async fn start(self) -> Result<(), RouteServerError> {
        let bind_address = self.config.bind_address();
        let addr = tokio::net::lookup_host(bind_address.as_str())
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| RouteServerError::InvalidArgument(format!("cannot resolve {}", bind_address)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RouteServerError::Bind { addr, source })?;

        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), RouteServerError> {
        match self.config.logger.clone() {
            Some(dispatch) => self.run(listener).with_subscriber(dispatch).await,
            None => self.run(listener).await,
        }
    }

    async fn run(self, listener: TcpListener) -> Result<(), RouteServerError> {
        let addr = listener.local_addr()?;
        let tls = self.tls_config().await?;
        let name = self.config.name.clone();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let shutdown = shutdown_signal(self.shutdown.subscribe());
        let scheme = if tls.is_some() { "https" } else { "http" };
        let app = self.into_router().into_make_service();

        tracing::info!(name = %name, address = %addr, "{} listening at {}://{}", name, scheme, addr);

        match tls {
            None => {
                let (fired_tx, fired_rx) = oneshot::channel::<()>();
                let signal = async move {
                    shutdown.await;
                    let _ = fired_tx.send(());
                };
                let server = async move { axum::serve(listener, app).with_graceful_shutdown(signal).await };
                tokio::select! {
                    result = server => result?,
                    _ = grace_elapsed(fired_rx, grace) => {
                        tracing::warn!(name = %name, grace_secs = grace.as_secs(), "Grace period elapsed, dropping open connections");
                    }
                }
            }
            Some(tls) => {
                let std_listener = listener.into_std()?;
                let handle = axum_server::Handle::new();
                let trigger = handle.clone();
                let forwarder = tokio::spawn(async move {
                    shutdown.await;
                    trigger.graceful_shutdown(Some(grace));
                });
                let result = axum_server::from_tcp_rustls(std_listener, tls)
                    .handle(handle)
                    .serve(app)
                    .await;
                forwarder.abort();
                result?;
            }
        }

        tracing::info!(name = %name, "Server stopped");
        Ok(())
    }

    async fn tls_config(&self) -> Result<Option<RustlsConfig>, RouteServerError> {
        if let Some(HttpsOptions(options)) = &self.config.https_server_options {
            return Ok(Some(options.clone()));
        }
        match self.config.tls_paths() {
            Some((cert, key)) => load_tls_config(Path::new(cert), Path::new(key))
                .await
                .map(Some)
                .map_err(RouteServerError::Tls),
            None => Ok(None),
        }
    }
}

/// Resolves once `grace` has passed after the shutdown signal fired.
async fn grace_elapsed(fired: oneshot::Receiver<()>, grace: Duration) {
    if fired.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

/// Look up the route, build the handler input, run the handler and
/// finalize the response.
async fn dispatch(State(state): State<Arc<DispatchState>>, request: Request) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (verb, pattern, handler, params) = match state.table.lookup(&method, &path) {
        Lookup::Found {
            verb,
            pattern,
            handler,
            params,
        } => (verb, pattern, handler, params),
        Lookup::MethodNotAllowed { allowed } => {
            tracing::debug!(method = %method, path = %path, "Method not allowed");
            let allow = allowed.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ");
            return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, allow)]).into_response();
        }
        Lookup::NotFound => {
            tracing::debug!(method = %method, path = %path, "No route matched");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    tracing::debug!(method = %method, path = %path, route = %pattern, "Dispatching request");

    let accept = request.headers().get(header::ACCEPT).cloned();
    let input = match extract_input(verb.input_source(), &params, request).await {
        Ok(input) => input,
        Err(rejection) => return rejection,
    };

    let result = handler.invoke(input).await;
    if let Err(error) = &result {
        tracing::warn!(method = %method, route = %pattern, error = %error, "Route handler reported an error");
    }

    let response = process_result(result, accept.as_ref(), &state.formatters);
    metrics::record_request(verb.as_str(), &pattern, response.status().as_u16(), start);
    response
}
