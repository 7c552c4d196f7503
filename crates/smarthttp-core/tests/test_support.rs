//! Shared test support utilities for integration tests

#![allow(dead_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smarthttp_core::{ClientConfig, HttpClient};
use wiremock::MockServer;

/// Typed payload used by dispatcher tests
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Create a sample user
pub fn user(id: u64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: None,
    }
}

/// Client with default configuration and a recognizable user agent
pub fn client() -> HttpClient {
    HttpClient::new(ClientConfig::default().with_user_agent("smarthttp-tests"))
        .expect("default config is valid")
}

/// Client whose transport default timeout is `timeout`
pub fn client_with_timeout(timeout: Duration) -> HttpClient {
    let config = ClientConfig {
        request_timeout_secs: timeout.as_secs().max(1),
        connect_timeout_secs: 1,
        ..ClientConfig::default()
    };
    HttpClient::new(config).expect("config is valid")
}

/// Absolute URL of `path` on the mock server
pub fn url(server: &MockServer, path: &str) -> String {
    format!("{}{}", server.uri(), path)
}

/// Route pipeline logs to the test writer; repeated calls are harmless
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("smarthttp_core=debug")
        .with_test_writer()
        .try_init();
}
