//! Configuration schema definitions.
//!
//! File-backed fields derive `Deserialize` and all have defaults. Fields that
//! carry code (handlers, formatters, logger, prebuilt TLS options) are set
//! programmatically and skipped by serde.

use std::fmt;

use axum_server::tls_rustls::RustlsConfig;
use serde::Deserialize;
use tracing::Dispatch;

use crate::http::middleware::AuthHandler;
use crate::http::response::Formatters;
use crate::routing::{RouteDescriptor, RouteSpec};

/// Root configuration for a [`RouteServer`](crate::RouteServer).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,

    /// Interface to bind.
    pub host: String,

    /// Sent in the `Server` header of every response.
    pub name: String,

    /// PEM certificate; HTTPS is enabled when both paths are set.
    pub certificate_path: Option<String>,

    /// PEM private key.
    pub key_path: Option<String>,

    /// Supported API version(s); the first is the default.
    pub version: Option<VersionSpec>,

    /// Pass `Connection: Upgrade` requests through the normal chain.
    pub handle_upgrades: bool,

    pub timeouts: TimeoutConfig,

    pub limits: LimitsConfig,

    pub observability: ObservabilityConfig,

    /// Routes declared in the configuration file.
    #[serde(rename = "routes")]
    pub declared_routes: Vec<RouteSpec>,

    /// Prebuilt rustls configuration; overrides the path fields.
    #[serde(skip)]
    pub https_server_options: Option<HttpsOptions>,

    /// Response serializers by content type.
    #[serde(skip)]
    pub formatters: Formatters,

    /// Logger scoped to this server's requests.
    #[serde(skip)]
    pub logger: Option<Dispatch>,

    #[serde(skip)]
    pub auth_handler: Option<AuthHandler>,

    /// Routes registered at construction.
    #[serde(skip)]
    pub routes: Option<Vec<RouteDescriptor>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            name: "restapi".to_string(),
            certificate_path: None,
            key_path: None,
            version: None,
            handle_upgrades: false,
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            declared_routes: Vec::new(),
            https_server_options: None,
            formatters: Formatters::default(),
            logger: None,
            auth_handler: None,
            routes: None,
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configured versions, in order.
    pub fn versions(&self) -> Vec<String> {
        match &self.version {
            None => Vec::new(),
            Some(VersionSpec::Single(v)) => vec![v.clone()],
            Some(VersionSpec::Many(vs)) => vs.clone(),
        }
    }

    /// Certificate and key paths, when both are configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.certificate_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }

    /// Whether the server will terminate TLS.
    pub fn is_https(&self) -> bool {
        self.https_server_options.is_some() || self.tls_paths().is_some()
    }
}

/// A single version string or an ordered list of them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VersionSpec {
    Single(String),
    Many(Vec<String>),
}

/// Prebuilt rustls server configuration.
#[derive(Clone)]
pub struct HttpsOptions(pub RustlsConfig);

impl fmt::Debug for HttpsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HttpsOptions(..)")
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time a request may take, handler included, in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 10,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus endpoint bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
