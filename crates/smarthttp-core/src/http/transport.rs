//! Transport abstraction
//!
//! The dispatcher never owns a connection itself: it asks a
//! [`TransportFactory`] for a [`Transport`] per request and drops it once the
//! request is done. The default factory hands out handles onto one shared
//! `reqwest` connection pool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Request, Response};

use crate::config::ClientConfig;
use crate::{Error, Result};

/// Executes a fully built request
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Source of transport clients
pub trait TransportFactory: Send + Sync {
    fn create_client(&self) -> Result<Box<dyn Transport>>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    default_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(client: ReqwestClient, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let timeout = request.timeout().copied().unwrap_or(self.default_timeout);
        self.client
            .execute(request)
            .await
            .map_err(|e| map_reqwest_error(e, timeout))
    }
}

/// Factory sharing a single `reqwest` client (and its pool) between requests
#[derive(Debug, Clone)]
pub struct ReqwestTransportFactory {
    client: ReqwestClient,
    default_timeout: Duration,
}

impl ReqwestTransportFactory {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!config.validate_tls)
            .build()
            .map_err(|e| Error::HttpRequest {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            default_timeout: config.request_timeout(),
        })
    }
}

impl TransportFactory for ReqwestTransportFactory {
    fn create_client(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(ReqwestTransport::new(
            self.client.clone(),
            self.default_timeout,
        )))
    }
}

/// Normalize a `reqwest` failure; elapsed deadlines become [`Error::Timeout`]
pub fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        return Error::Timeout { timeout };
    }

    let message = if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_body() || err.is_decode() {
        format!("Failed to read response body: {}", err)
    } else {
        err.to_string()
    };

    Error::Transport {
        message,
        source: Some(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_from_default_config() {
        let factory = ReqwestTransportFactory::new(&ClientConfig::default()).unwrap();
        assert_eq!(factory.default_timeout, Duration::from_secs(100));
        assert!(factory.create_client().is_ok());
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let factory = ReqwestTransportFactory::new(&ClientConfig::default()).unwrap();
        let transport = factory.create_client().unwrap();

        // port 9 (discard) on loopback is expected to refuse connections
        let url = reqwest::Url::parse("http://127.0.0.1:9/").unwrap();
        let err = transport
            .execute(Request::new(reqwest::Method::GET, url))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
