//! API version check.
//!
//! With versions configured, a request's `Accept-Version` must be `*` or one
//! of them. Matching is exact. The response advertises the served version in
//! `Api-Version`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub static ACCEPT_VERSION: HeaderName = HeaderName::from_static("accept-version");
pub static API_VERSION: HeaderName = HeaderName::from_static("api-version");

/// Configured versions; the first is the default.
#[derive(Debug, Clone)]
pub struct ApiVersions(Arc<Vec<String>>);

impl ApiVersions {
    /// `None` when no versions are configured.
    pub fn new(versions: Vec<String>) -> Option<Self> {
        (!versions.is_empty()).then(|| Self(Arc::new(versions)))
    }

    /// The version to serve for a requested one, if acceptable.
    pub fn select(&self, requested: Option<&str>) -> Option<&str> {
        match requested.map(str::trim) {
            None | Some("*") | Some("") => self.0.first().map(String::as_str),
            Some(wanted) => self.0.iter().find(|v| *v == wanted).map(String::as_str),
        }
    }
}

pub async fn version_guard(State(versions): State<ApiVersions>, request: Request, next: Next) -> Response {
    let requested = request
        .headers()
        .get(&ACCEPT_VERSION)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    let Some(selected) = versions.select(requested.as_deref()).map(str::to_string) else {
        tracing::debug!(requested = ?requested, "Rejecting unsupported API version");
        return (
            StatusCode::BAD_REQUEST,
            format!("InvalidVersion: {} is not supported", requested.unwrap_or_default()),
        )
            .into_response();
    };

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&selected) {
        response.headers_mut().insert(API_VERSION.clone(), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        let versions = ApiVersions::new(vec!["1.0.0".into(), "2.0.0".into()]).unwrap();
        assert_eq!(versions.select(None), Some("1.0.0"));
        assert_eq!(versions.select(Some("*")), Some("1.0.0"));
        assert_eq!(versions.select(Some("2.0.0")), Some("2.0.0"));
        assert_eq!(versions.select(Some("3.0.0")), None);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(ApiVersions::new(Vec::new()).is_none());
    }
}
