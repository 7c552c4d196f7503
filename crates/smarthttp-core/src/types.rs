//! Core types for describing requests and their file results
//!
//! A [`RequestDescriptor`] is an immutable description of one outbound call;
//! it is assembled with [`RequestDescriptorBuilder`] and consumed by the
//! request pipeline.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::http::auth::AuthDescriptor;
use crate::query::{QueryParams, ToQueryParams};
use crate::{Error, Result};

/// Pre-built request body sent verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl Payload {
    /// Raw bytes with an explicit content type
    pub fn bytes(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: Some(content_type.into()),
        }
    }

    /// Raw bytes without a declared content type
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::bytes(text.into(), "text/plain; charset=utf-8")
    }

    /// Already serialized JSON document
    pub fn json_bytes(json: impl Into<Bytes>) -> Self {
        Self::bytes(json, "application/json")
    }

    /// `application/x-www-form-urlencoded` body
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = crate::query::append_query("", pairs);
        let body = encoded.strip_prefix('?').unwrap_or(&encoded).to_string();
        Self::bytes(body, "application/x-www-form-urlencoded")
    }
}

/// File returned by an endpoint that answers with `Content-Disposition`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResult {
    pub file_name: String,
    pub content: Bytes,
}

impl FileResult {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Immutable description of a single outbound request
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    base_uri: String,
    method: Method,
    headers: Vec<(String, String)>,
    auth: Option<AuthDescriptor>,
    payload: Option<Payload>,
    timeout: Option<Duration>,
    json_body: Option<Value>,
    query: Option<QueryParams>,
    cancellation: Option<CancellationToken>,
}

impl RequestDescriptor {
    /// Start describing a request to `base_uri`
    pub fn builder(method: Method, base_uri: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method, base_uri)
    }

    pub fn get(base_uri: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(Method::GET, base_uri)
    }

    pub fn post(base_uri: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(Method::POST, base_uri)
    }

    pub fn put(base_uri: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(Method::PUT, base_uri)
    }

    pub fn patch(base_uri: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(Method::PATCH, base_uri)
    }

    pub fn delete(base_uri: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(Method::DELETE, base_uri)
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn auth(&self) -> Option<&AuthDescriptor> {
        self.auth.as_ref()
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Requested timeout; `None` when the transport default applies
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.json_body.as_ref()
    }

    pub fn query(&self) -> Option<&QueryParams> {
        self.query.as_ref()
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

/// Builder for [`RequestDescriptor`]
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    base_uri: String,
    method: Method,
    headers: Vec<(String, String)>,
    auth: Option<AuthDescriptor>,
    payload: Option<Payload>,
    timeout: Option<Duration>,
    json_body: Option<std::result::Result<Value, serde_json::Error>>,
    query: Option<QueryParams>,
    cancellation: Option<CancellationToken>,
}

impl RequestDescriptorBuilder {
    pub fn new(method: Method, base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            method,
            headers: Vec::new(),
            auth: None,
            payload: None,
            timeout: None,
            json_body: None,
            query: None,
            cancellation: None,
        }
    }

    /// Set a header; a later call with the same name (any case) replaces it
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn auth(mut self, auth: AuthDescriptor) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Per-request timeout; zero means "use the transport default"
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Structured body serialized to JSON when the request is built
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.json_body = Some(serde_json::to_value(body));
        self
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.json_body = Some(Ok(body));
        self
    }

    /// Endpoint parameters appended to the base URI
    pub fn query<P: ToQueryParams + ?Sized>(mut self, params: &P) -> Self {
        self.query = Some(params.to_query_params());
        self
    }

    /// Append one parameter to whatever query was declared so far
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let params = self.query.take().unwrap_or_default();
        self.query = Some(params.push(key, value));
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn build(self) -> Result<RequestDescriptor> {
        let json_body = self.json_body.transpose()?;

        if self.payload.is_some() && json_body.is_some() {
            return Err(Error::configuration(
                "A request cannot carry both a pre-built payload and a JSON body",
            ));
        }

        if self.base_uri.trim().is_empty() {
            return Err(Error::configuration("Request base URI is empty"));
        }

        Ok(RequestDescriptor {
            base_uri: self.base_uri,
            method: self.method,
            headers: self.headers,
            auth: self.auth,
            payload: self.payload,
            timeout: self.timeout,
            json_body,
            query: self.query,
            cancellation: self.cancellation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let descriptor = RequestDescriptor::get("https://api.example.com").build().unwrap();
        assert_eq!(descriptor.method(), &Method::GET);
        assert_eq!(descriptor.base_uri(), "https://api.example.com");
        assert!(descriptor.headers().is_empty());
        assert!(descriptor.auth().is_none());
        assert!(descriptor.timeout().is_none());
        assert!(descriptor.query().is_none());
    }

    #[test]
    fn test_header_keys_are_unique_ignoring_case() {
        let descriptor = RequestDescriptor::get("https://api.example.com")
            .header("X-Trace", "1")
            .header("x-trace", "2")
            .header("X-Other", "3")
            .build()
            .unwrap();
        assert_eq!(
            descriptor.headers(),
            &[
                ("X-Trace".to_string(), "2".to_string()),
                ("X-Other".to_string(), "3".to_string())
            ]
        );
    }

    #[test]
    fn test_zero_timeout_means_default() {
        let descriptor = RequestDescriptor::get("https://api.example.com")
            .timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert!(descriptor.timeout().is_none());

        let descriptor = RequestDescriptor::get("https://api.example.com")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(descriptor.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_payload_and_json_body_are_exclusive() {
        let err = RequestDescriptor::post("https://api.example.com")
            .payload(Payload::text("hello"))
            .json(&json!({"a": 1}))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_empty_base_uri_rejected() {
        assert!(RequestDescriptor::get("  ").build().is_err());
    }

    #[test]
    fn test_query_param_accumulates() {
        let descriptor = RequestDescriptor::get("https://api.example.com")
            .query(&[("a", "1")])
            .query_param("b", "2")
            .build()
            .unwrap();
        let pairs: Vec<_> = descriptor.query().unwrap().iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_form_payload() {
        let payload = Payload::form([("grant_type", "client_credentials"), ("scope", "read write")]);
        assert_eq!(
            payload.bytes,
            Bytes::from("grant_type=client_credentials&scope=read%20write")
        );
        assert_eq!(
            payload.content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
    }
}
