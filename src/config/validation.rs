//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Value ranges (timeouts and limits > 0)
//! - TLS material configured as a pair
//! - Route patterns and header-bound strings are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: &ServerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::PathPattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.name.is_empty() || HeaderValue::from_str(&config.name).is_err() {
        errors.push(ValidationError::new("name", "must be a non-empty header-safe string"));
    }

    if config.host.is_empty() {
        errors.push(ValidationError::new("host", "must not be empty"));
    }

    if config.https_server_options.is_none()
        && config.certificate_path.is_some() != config.key_path.is_some()
    {
        errors.push(ValidationError::new(
            "certificate_path",
            "certificate_path and key_path must be set together",
        ));
    }

    for (i, version) in config.versions().iter().enumerate() {
        if version.trim().is_empty() || HeaderValue::from_str(version).is_err() {
            errors.push(ValidationError::new(format!("version[{}]", i), "must be a non-empty header-safe string"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("{:?} is not a socket address", addr),
            ));
        }
    }

    for (i, route) in config.declared_routes.iter().enumerate() {
        if let Err(message) = PathPattern::parse(&route.url) {
            errors.push(ValidationError::new(format!("routes[{}].url", i), message));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
