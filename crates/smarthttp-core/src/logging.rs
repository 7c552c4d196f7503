//! Logging utilities
//!
//! This module provides:
//! - Structured logging setup on top of `tracing-subscriber`
//! - Request ID generation for per-dispatch spans
//! - Redaction of credentials before URIs and headers reach the logs

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{Error, Result};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("SMARTHTTP_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "compact" => self.format = LogFormat::Compact,
                "full" => self.format = LogFormat::Full,
                "json" => self.format = LogFormat::Json,
                _ => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }
    }
}

/// Install a global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level).map_err(|e| Error::Configuration {
        message: format!("Invalid log filter: {}", config.level),
        source: Some(e.into()),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
        LogFormat::Json => builder.json().with_ansi(false).try_init(),
    };

    installed.map_err(|e| Error::Configuration {
        message: format!("Failed to initialize logging: {}", e),
        source: None,
    })?;

    tracing::debug!(config = ?config, "Logging system initialized");
    Ok(())
}

/// Generate a unique ID for one dispatched request
pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Sensitive data redaction utilities
pub mod redaction {
    use std::borrow::Cow;

    const MASK: &str = "***";

    /// Mask credential-looking query parameter values in a URI
    pub fn redact_uri(uri: &str) -> Cow<'_, str> {
        let Some(query_start) = uri.find('?') else {
            return Cow::Borrowed(uri);
        };
        let (head, rest) = uri.split_at(query_start + 1);
        let (query, fragment) = match rest.find('#') {
            Some(pos) => rest.split_at(pos),
            None => (rest, ""),
        };

        if !query.split('&').any(is_sensitive_pair) {
            return Cow::Borrowed(uri);
        }

        let redacted: Vec<String> = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if is_sensitive_key(key) => format!("{}={}", key, MASK),
                _ => pair.to_string(),
            })
            .collect();

        Cow::Owned(format!("{}{}{}", head, redacted.join("&"), fragment))
    }

    /// Render a header value for logging, masking credentials
    pub fn redact_header(name: &str, value: &str) -> String {
        if is_sensitive_key(name) {
            match value.split_once(' ') {
                Some((scheme, _)) => format!("{} {}", scheme, MASK),
                None => MASK.to_string(),
            }
        } else {
            value.to_string()
        }
    }

    fn is_sensitive_pair(pair: &str) -> bool {
        pair.split_once('=')
            .map(|(key, _)| is_sensitive_key(key))
            .unwrap_or(false)
    }

    /// Check if a key names credential material
    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        key_lower.contains("key")
            || key_lower.contains("token")
            || key_lower.contains("password")
            || key_lower.contains("secret")
            || key_lower.contains("auth")
            || key_lower.contains("signature")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_request_id_format() {
        let id = generate_request_id();
        assert!(id.starts_with("req_"));
        assert_eq!(id.len(), 4 + 32);
        assert_ne!(id, generate_request_id());
    }

    #[test]
    fn test_redact_uri() {
        let uri = "https://api.example.com/x?user=bob&api_key=s3cr3t&page=2#top";
        assert_eq!(
            redaction::redact_uri(uri),
            "https://api.example.com/x?user=bob&api_key=***&page=2#top"
        );
    }

    #[test]
    fn test_redact_uri_untouched_without_secrets() {
        let uri = "https://api.example.com/x?page=2";
        assert!(matches!(
            redaction::redact_uri(uri),
            std::borrow::Cow::Borrowed(_)
        ));
        assert_eq!(redaction::redact_uri("https://a.b/c"), "https://a.b/c");
    }

    #[test]
    fn test_redact_header() {
        assert_eq!(
            redaction::redact_header("Authorization", "Bearer abc.def"),
            "Bearer ***"
        );
        assert_eq!(redaction::redact_header("X-Api-Key", "raw"), "***");
        assert_eq!(redaction::redact_header("Accept", "application/json"), "application/json");
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("RUST_LOG", "smarthttp_core=trace");
        std::env::set_var("SMARTHTTP_LOG_FORMAT", "JSON");

        let mut config = LoggingConfig::default();
        config.merge_with_env();
        std::env::remove_var("RUST_LOG");
        std::env::remove_var("SMARTHTTP_LOG_FORMAT");

        assert_eq!(config.level, "smarthttp_core=trace");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_env_unknown_format_keeps_default() {
        std::env::remove_var("RUST_LOG");
        std::env::set_var("SMARTHTTP_LOG_FORMAT", "xml");

        let mut config = LoggingConfig::default();
        config.merge_with_env();
        std::env::remove_var("SMARTHTTP_LOG_FORMAT");

        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LoggingConfig {
            level: "smarthttp=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
