//! HTTP error classification and normalization
//!
//! Turns non-success responses into an [`ApiError`] whose message depends on
//! the response media type:
//! - `application/json`: details of a problem-object array, newline-joined
//! - `text/plain`: the body as-is
//! - anything else: `HTTP {code} {reason}: {body}`

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::http::content::{self, MediaType};
use crate::http::transport::map_reqwest_error;
use crate::Result;

/// Message used when a JSON error body is not a problem array
pub const INVALID_JSON_ERROR: &str = "Invalid JSON error format.";

/// Message used when a JSON error body carries no problems
pub const UNKNOWN_JSON_ERROR: &str = "Unknown error in JSON response.";

/// Structured error entry returned by an API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Normalized error for a non-success HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status_code: u16,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Read the body of a non-success response and classify it.
    ///
    /// A body that cannot be read is a transport failure, not an API error.
    pub async fn from_response(response: reqwest::Response, timeout: Duration) -> Result<Self> {
        let status = response.status();
        let media_type = content::media_type(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        Ok(classify(status, media_type.as_ref(), &body))
    }

    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code).ok()
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error [{}]: {}", self.status_code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Build the [`ApiError`] for a response with the given status, media type and body
pub fn classify(status: StatusCode, media_type: Option<&MediaType>, body: &str) -> ApiError {
    let message = match media_type {
        Some(mt) if mt.is_json() => problem_details(body),
        Some(mt) if mt.is_plain_text() => body.to_string(),
        _ => format!(
            "HTTP {} {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            body
        ),
    };
    ApiError::new(status.as_u16(), message)
}

/// Join the `detail` of every problem in a JSON array
fn problem_details(body: &str) -> String {
    match serde_json::from_str::<Option<Vec<Problem>>>(body) {
        Ok(Some(problems)) if !problems.is_empty() => problems
            .into_iter()
            .map(|p| p.detail.unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"),
        Ok(_) => UNKNOWN_JSON_ERROR.to_string(),
        Err(_) => INVALID_JSON_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json() -> MediaType {
        MediaType::parse("application/json; charset=utf-8")
    }

    #[test]
    fn test_json_problem_detail() {
        let err = classify(StatusCode::NOT_FOUND, Some(&json()), r#"[{"detail":"not found"}]"#);
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "not found");
    }

    #[test]
    fn test_json_problem_details_are_joined() {
        let body = r#"[
            {"type":"validation","title":"Bad","detail":"name is required"},
            {"detail":"age must be positive","status":400}
        ]"#;
        let err = classify(StatusCode::BAD_REQUEST, Some(&json()), body);
        assert_eq!(err.message, "name is required\nage must be positive");
    }

    #[test]
    fn test_json_not_an_array() {
        let err = classify(StatusCode::BAD_REQUEST, Some(&json()), r#"{"detail":"x"}"#);
        assert_eq!(err.message, INVALID_JSON_ERROR);
        assert_eq!(err.status_code, 400);

        let err = classify(StatusCode::BAD_REQUEST, Some(&json()), "<html>");
        assert_eq!(err.message, INVALID_JSON_ERROR);
    }

    #[test]
    fn test_json_without_problems() {
        let err = classify(StatusCode::CONFLICT, Some(&json()), "[]");
        assert_eq!(err.message, UNKNOWN_JSON_ERROR);

        let err = classify(StatusCode::CONFLICT, Some(&json()), "null");
        assert_eq!(err.message, UNKNOWN_JSON_ERROR);
    }

    #[test]
    fn test_plain_text_body() {
        let plain = MediaType::parse("text/plain");
        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, Some(&plain), "boom");
        assert_eq!(err.status_code, 500);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_fallback_message() {
        let html = MediaType::parse("text/html");
        let err = classify(StatusCode::BAD_GATEWAY, Some(&html), "<h1>down</h1>");
        assert_eq!(err.message, "HTTP 502 Bad Gateway: <h1>down</h1>");

        let err = classify(StatusCode::SERVICE_UNAVAILABLE, None, "");
        assert_eq!(err.message, "HTTP 503 Service Unavailable: ");
    }

    #[test]
    fn test_status_helpers() {
        assert!(ApiError::new(404, "x").is_client_error());
        assert!(ApiError::new(503, "x").is_server_error());
        assert_eq!(ApiError::new(404, "x").status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_from_response() {
        let response = ::http::Response::builder()
            .status(422)
            .header("content-type", "application/json")
            .body(r#"[{"detail":"invalid email"}]"#)
            .unwrap();
        let err = ApiError::from_response(reqwest::Response::from(response), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(err, ApiError::new(422, "invalid email"));
    }
}
