//! HTTP client orchestrating the request pipeline
//!
//! Every operation follows the same path: build the request, acquire a
//! transport, send under the resolved deadline, classify non-success
//! responses, then interpret the body.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::config::ClientConfig;
use crate::http::builder::RequestBuilder;
use crate::http::content::{self, ResponseContent};
use crate::http::error::ApiError;
use crate::http::timeout::{resolve_timeout, with_deadline};
use crate::http::transport::{map_reqwest_error, ReqwestTransportFactory, TransportFactory};
use crate::logging::{generate_request_id, redaction};
use crate::types::{FileResult, RequestDescriptor};
use crate::Result;

/// Generic HTTP client
#[derive(Clone)]
pub struct HttpClient {
    /// Source of a transport for each request
    factory: Arc<dyn TransportFactory>,
    /// Request builder for constructing requests
    request_builder: RequestBuilder,
    /// Client configuration
    config: ClientConfig,
}

impl HttpClient {
    /// Create a client backed by `reqwest`
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let factory = ReqwestTransportFactory::new(&config)?;
        Ok(Self::with_factory(config, Arc::new(factory)))
    }

    /// Create with default configuration
    pub fn with_default_config() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Create a client that acquires transports from `factory`
    pub fn with_factory(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            request_builder: RequestBuilder::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send and return the response untouched: no status classification and
    /// no body consumption
    pub async fn send_raw(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        self.run(descriptor, |response, _| async move { Ok(response) })
            .await
    }

    /// Send, classify, and interpret the body
    pub async fn send_content<T>(&self, descriptor: &RequestDescriptor) -> Result<ResponseContent<T>>
    where
        T: DeserializeOwned + Default,
    {
        self.run(descriptor, read_content::<T>).await
    }

    /// Send and deserialize the JSON body into `T`.
    ///
    /// An empty JSON body, or a body that is neither JSON nor a file,
    /// yields `T::default()`.
    pub async fn send<T>(&self, descriptor: &RequestDescriptor) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        self.run(descriptor, |response, timeout| async move {
            read_content::<T>(response, timeout).await?.into_value()
        })
        .await
    }

    /// Send and return the attached file
    pub async fn send_file(&self, descriptor: &RequestDescriptor) -> Result<FileResult> {
        self.run(descriptor, |response, timeout| async move {
            read_content::<Value>(response, timeout).await?.into_file()
        })
        .await
    }

    /// Send, failing only when the server rejects the request
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<()> {
        self.run(descriptor, |response, timeout| async move {
            ensure_success(response, timeout).await.map(drop)
        })
        .await
    }

    /// Dispatch under the resolved deadline and hand the response to `handle`
    async fn run<T, F, Fut>(&self, descriptor: &RequestDescriptor, handle: F) -> Result<T>
    where
        F: FnOnce(Response, Duration) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let request_id = generate_request_id();
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            method = %descriptor.method(),
            uri = %redaction::redact_uri(descriptor.base_uri()),
        );

        async move {
            let timeout = resolve_timeout(descriptor.timeout(), self.config.request_timeout());
            let work = async {
                let response = self.dispatch(descriptor, timeout).await?;
                handle(response, timeout).await
            };

            let result = with_deadline(work, timeout, descriptor.cancellation()).await;
            match &result {
                Ok(_) => tracing::debug!("Request completed"),
                Err(e) => tracing::warn!(error = %e, "Request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, descriptor: &RequestDescriptor, timeout: Duration) -> Result<Response> {
        let request = self.request_builder.build(descriptor, timeout)?;
        let transport = self.factory.create_client()?;

        tracing::debug!(timeout = ?timeout, "Sending request");
        let response = transport.execute(request).await?;
        tracing::debug!(status = response.status().as_u16(), "Received response");

        Ok(response)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("request_builder", &self.request_builder)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Turn a non-success response into [`crate::Error::Api`]
async fn ensure_success(response: Response, timeout: Duration) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let error = ApiError::from_response(response, timeout).await?;
    tracing::warn!(
        status = error.status_code,
        message = %error.message,
        "Server rejected request"
    );
    Err(error.into())
}

async fn read_content<T>(response: Response, timeout: Duration) -> Result<ResponseContent<T>>
where
    T: DeserializeOwned + Default,
{
    let response = ensure_success(response, timeout).await?;
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|e| map_reqwest_error(e, timeout))?;
    content::decode(&headers, body)
}
