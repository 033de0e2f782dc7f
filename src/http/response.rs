//! Result processing and response formatting.
//!
//! # Responsibilities
//! - Turn a handler outcome into exactly one HTTP response
//! - Choose a formatter from the request's `Accept` header
//!
//! # Design Decisions
//! - Handler error → 500 with the error message as a plain-text body
//! - Success → 200 with the negotiated serialization
//! - A `null` payload is sent as an empty 200
//! - Unmatched `Accept` falls back to the first formatter instead of 406

use std::fmt;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::HandlerError;
use crate::handler::HandlerResult;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";

/// Serializer for one content type.
pub type FormatFn = dyn Fn(&Value) -> Result<Vec<u8>, HandlerError> + Send + Sync;

/// Ordered content-type → serializer table. The first entry is the default.
#[derive(Clone)]
pub struct Formatters {
    entries: Vec<(String, Arc<FormatFn>)>,
}

impl Formatters {
    /// Add a formatter, or replace the one registered for `content_type`.
    pub fn with<F>(mut self, content_type: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Vec<u8>, HandlerError> + Send + Sync + 'static,
    {
        let content_type = content_type.into().to_ascii_lowercase();
        let f: Arc<FormatFn> = Arc::new(f);
        match self.entries.iter_mut().find(|(ct, _)| *ct == content_type) {
            Some(entry) => entry.1 = f,
            None => self.entries.push((content_type, f)),
        }
        self
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(ct, _)| ct.as_str())
    }

    /// Pick the formatter for an `Accept` header value.
    pub fn negotiate(&self, accept: Option<&str>) -> (&str, &FormatFn) {
        let fallback = &self.entries[0];
        let chosen = accept
            .map(parse_accept)
            .unwrap_or_default()
            .into_iter()
            .find_map(|range| self.find(&range))
            .unwrap_or(fallback);
        (chosen.0.as_str(), chosen.1.as_ref())
    }

    fn find(&self, range: &str) -> Option<&(String, Arc<FormatFn>)> {
        if range == "*/*" {
            return self.entries.first();
        }
        if let Some(kind) = range.strip_suffix("/*") {
            return self
                .entries
                .iter()
                .find(|(ct, _)| ct.split('/').next() == Some(kind));
        }
        self.entries.iter().find(|(ct, _)| ct == range)
    }
}

impl Default for Formatters {
    fn default() -> Self {
        Self { entries: Vec::new() }
            .with(APPLICATION_JSON, |value| Ok(serde_json::to_vec(value)?))
            .with(TEXT_PLAIN, |value| {
                Ok(match value {
                    Value::String(s) => s.clone().into_bytes(),
                    other => other.to_string().into_bytes(),
                })
            })
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.content_types()).finish()
    }
}

/// Media ranges from an `Accept` header, highest quality first.
fn parse_accept(accept: &str) -> Vec<String> {
    let mut ranges: Vec<(String, f32)> = accept
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let media = parts.next()?.trim().to_ascii_lowercase();
            if media.is_empty() {
                return None;
            }
            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then_some((media, quality))
        })
        .collect();
    // Stable sort keeps header order among equal weights.
    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges.into_iter().map(|(media, _)| media).collect()
}

/// Convert a handler outcome into the HTTP response.
pub fn process_result(result: HandlerResult, accept: Option<&HeaderValue>, formatters: &Formatters) -> Response {
    let payload = match result {
        Ok(payload) => payload,
        Err(error) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, error.message().to_string()).into_response();
        }
    };

    if payload.is_null() {
        return StatusCode::OK.into_response();
    }

    let accept = accept.and_then(|v| v.to_str().ok());
    let (content_type, format) = formatters.negotiate(accept);
    match format(&payload) {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.to_string())],
            bytes,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(content_type, error = %error, "Failed to format response payload");
            (StatusCode::INTERNAL_SERVER_ERROR, error.message().to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_success_is_json_by_default() {
        let response = process_result(Ok(json!({"ok": true})), None, &Formatters::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(body_text(response).await, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_error_is_500_with_message() {
        let response = process_result(Err(HandlerError::new("bad data")), None, &Formatters::default());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "bad data");
    }

    #[tokio::test]
    async fn test_null_payload_is_empty_ok() {
        let response = process_result(Ok(Value::Null), None, &Formatters::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_accept_selects_text() {
        let accept = HeaderValue::from_static("text/plain");
        let response = process_result(Ok(json!("hi")), Some(&accept), &Formatters::default());
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(body_text(response).await, "hi");
    }

    #[test]
    fn test_negotiation_rules() {
        let formatters = Formatters::default().with("application/xml", |_| Ok(b"<x/>".to_vec()));
        assert_eq!(formatters.negotiate(None).0, APPLICATION_JSON);
        assert_eq!(formatters.negotiate(Some("*/*")).0, APPLICATION_JSON);
        assert_eq!(formatters.negotiate(Some("image/png")).0, APPLICATION_JSON);
        assert_eq!(formatters.negotiate(Some("text/*")).0, TEXT_PLAIN);
        assert_eq!(
            formatters.negotiate(Some("application/json;q=0.5, application/xml")).0,
            "application/xml"
        );
        assert_eq!(formatters.negotiate(Some("text/plain;q=0, */*")).0, APPLICATION_JSON);
    }

    #[tokio::test]
    async fn test_formatter_failure_is_500() {
        let formatters = Formatters::default().with(APPLICATION_JSON, |_| Err(HandlerError::new("no json today")));
        let response = process_result(Ok(json!(1)), None, &formatters);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "no json today");
    }
}
