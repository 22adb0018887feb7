//! Shared HTTP response helpers for the backend client.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`ApiError::Api`] with the FastAPI `detail`) and
//! body decoding, so [`super::client`] stays focused on request construction
//! and response mapping.

use serde_json::Value;

use super::error::ApiError;
use crate::parsers::SchemaError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`ApiError::RateLimited`] with the `detail`, if any, and
///   `Retry-After` header parsing (falls back to 60 s if absent or unparseable).
/// - **Non-success status** → [`ApiError::Api`] carrying the backend's
///   `detail`, or `fallback` when the body has none.
pub async fn check_response(
    resp: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = parse_retry_after(&resp);
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::RateLimited { retry_after_secs, detail: detail_message(&body) });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = detail_message(&body).unwrap_or_else(|| fallback.to_string());
        tracing::debug!(status = status.as_u16(), %message, "backend returned an error");
        return Err(ApiError::Api { status: status.as_u16(), message });
    }
    Ok(resp)
}

/// Check the response and decode its body as JSON.
pub async fn read_json(
    resp: reqwest::Response,
    what: &'static str,
    fallback: &str,
) -> Result<Value, ApiError> {
    let resp = check_response(resp, fallback).await?;
    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json { what, source }.into())
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(60)
}

/// Extract a human-readable message from a FastAPI error body.
///
/// `detail` is either a string (`HTTPException`) or a list of validation
/// errors whose `msg` fields are joined with `"; "`.
pub(crate) fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("detail")? {
        Value::String(detail) => detail.trim().to_string(),
        Value::Array(errors) => errors
            .iter()
            .filter_map(|e| e.get("msg").and_then(Value::as_str))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    (!message.is_empty()).then_some(message)
}
