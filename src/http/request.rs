//! Handler input extraction.
//!
//! # Responsibilities
//! - Build the handler-facing input value for a matched route
//! - GET: path parameters merged with query parameters
//! - POST/PUT/DELETE: the decoded request body
//!
//! # Design Decisions
//! - Path parameters are percent-decoded here, after matching on the raw path
//! - Query parameters override path parameters of the same name
//! - Repeated query keys keep the last value
//! - Empty bodies become `null`; JSON and form bodies become objects;
//!   anything else is passed as text

use axum::{
    body::Body,
    extract::Query,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::routing::{InputSource, PathParams};

/// Extract the input for a handler, or an error response for input the
/// framework could not decode.
pub async fn extract_input(
    source: InputSource,
    params: &PathParams,
    request: Request<Body>,
) -> Result<Value, Response> {
    match source {
        InputSource::PathAndQuery => path_and_query(params, &request),
        InputSource::Body => body(request).await,
    }
}

fn path_and_query(params: &PathParams, request: &Request<Body>) -> Result<Value, Response> {
    let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map_err(IntoResponse::into_response)?;

    let mut input = Map::new();
    for (key, raw) in params.iter() {
        let value = percent_decode_str(raw).decode_utf8().map_err(|_| {
            tracing::debug!(param = key, value = raw, "Path parameter is not valid UTF-8");
            (StatusCode::BAD_REQUEST, format!("Invalid path parameter: {}", key)).into_response()
        })?;
        input.insert(key.to_string(), Value::String(value.into_owned()));
    }
    for (key, value) in query {
        input.insert(key, Value::String(value));
    }
    Ok(Value::Object(input))
}

async fn body(request: Request<Body>) -> Result<Value, Response> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Size is capped by the body limit layer in front of dispatch.
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| {
            if exceeds_limit(&e) {
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
            tracing::warn!(error = %e, "Failed to read request body");
            (StatusCode::BAD_REQUEST, "Failed to read request body").into_response()
        })?;

    decode_body(content_type.as_deref(), &bytes)
}

/// Whether a body error comes from the length limit, however deeply wrapped.
fn exceeds_limit(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Decode a request body according to its content type.
pub fn decode_body(content_type: Option<&str>, bytes: &[u8]) -> Result<Value, Response> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "application/json" || mime.ends_with("+json") {
        return serde_json::from_slice(bytes).map_err(|e| {
            (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e)).into_response()
        });
    }

    if mime == "application/x-www-form-urlencoded" {
        let form: Map<String, Value> = url::form_urlencoded::parse(bytes)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        return Ok(Value::Object(form));
    }

    if mime.is_empty() {
        if let Ok(value) = serde_json::from_slice(bytes) {
            return Ok(value);
        }
    }

    Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::PathPattern;
    use serde_json::json;

    fn params(pattern: &str, path: &str) -> PathParams {
        PathPattern::parse(pattern).unwrap().matches(path).unwrap()
    }

    #[tokio::test]
    async fn test_get_merges_params_and_query() {
        let request = axum::http::Request::builder()
            .uri("/users/42?fields=name&id=override")
            .body(Body::empty())
            .unwrap();
        let input = extract_input(InputSource::PathAndQuery, &params("/users/:id", "/users/42"), request)
            .await
            .unwrap();
        assert_eq!(input, json!({"id": "override", "fields": "name"}));
    }

    #[tokio::test]
    async fn test_path_params_are_percent_decoded() {
        let request = axum::http::Request::builder()
            .uri("/users/ada%20lovelace?x=a%20b")
            .body(Body::empty())
            .unwrap();
        let input = extract_input(
            InputSource::PathAndQuery,
            &params("/users/:name", "/users/ada%20lovelace"),
            request,
        )
        .await
        .unwrap();
        assert_eq!(input, json!({"name": "ada lovelace", "x": "a b"}));
    }

    #[tokio::test]
    async fn test_splat_keeps_encoded_slash_as_one_value() {
        let request = axum::http::Request::builder()
            .uri("/files/a%2Fb/c")
            .body(Body::empty())
            .unwrap();
        let input = extract_input(InputSource::PathAndQuery, &params("/files/*", "/files/a%2Fb/c"), request)
            .await
            .unwrap();
        assert_eq!(input, json!({"*": "a/b/c"}));
    }

    #[tokio::test]
    async fn test_invalid_utf8_path_param_is_rejected() {
        let request = axum::http::Request::builder()
            .uri("/users/%FF")
            .body(Body::empty())
            .unwrap();
        let response = extract_input(InputSource::PathAndQuery, &params("/users/:name", "/users/%FF"), request)
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_without_query() {
        let request = axum::http::Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let input = extract_input(InputSource::PathAndQuery, &PathParams::default(), request)
            .await
            .unwrap();
        assert_eq!(input, json!({}));
    }

    #[tokio::test]
    async fn test_body_ignores_path_params() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/users/42")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"ada"}"#))
            .unwrap();
        let input = extract_input(InputSource::Body, &params("/users/:id", "/users/42"), request)
            .await
            .unwrap();
        assert_eq!(input, json!({"name": "ada"}));
    }

    #[test]
    fn test_decode_variants() {
        assert_eq!(decode_body(None, b"").unwrap(), Value::Null);
        assert_eq!(decode_body(None, b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(decode_body(None, b"hello").unwrap(), json!("hello"));
        assert_eq!(decode_body(Some("text/plain"), b"{}").unwrap(), json!("{}"));
        assert_eq!(
            decode_body(Some("application/x-www-form-urlencoded"), b"a=1&b=two+words").unwrap(),
            json!({"a": "1", "b": "two words"})
        );
        assert_eq!(
            decode_body(Some("application/vnd.api+json; charset=utf-8"), br#"{"x":true}"#).unwrap(),
            json!({"x": true})
        );
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let response = decode_body(Some("application/json"), b"{nope").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
