//! Error types for the SmartHttp core library
//!
//! Every failure the pipeline can produce is normalized into [`Error`], using
//! thiserror for the definitions and anyhow for loosely typed sources.

use std::time::Duration;
use thiserror::Error;

use crate::http::error::ApiError;

/// Main error type for SmartHttp operations
#[derive(Error, Debug)]
pub enum Error {
    /// The transport deadline elapsed before the request completed
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        timeout: Duration,
    },

    /// The server answered with a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The caller cancelled the request
    #[error("Request was cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The descriptor could not be turned into a transport request
    #[error("HTTP request error: {message}")]
    HttpRequest {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection, TLS or protocol failure reported by the transport
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response body does not match the requested result shape
    #[error("Unexpected response content: {message}")]
    UnexpectedContent {
        message: String,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a configuration error without an underlying source
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Build a request-construction error without an underlying source
    pub fn http_request(message: impl Into<String>) -> Self {
        Error::HttpRequest {
            message: message.into(),
            source: None,
        }
    }

    /// HTTP status associated with this error.
    ///
    /// Timeouts report `408 Request Timeout`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status_code),
            Error::Timeout { .. } => Some(408),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// The API error carried by this error, if the server rejected the request
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
