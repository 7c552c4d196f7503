//! HTTP request builder
//!
//! Turns a [`RequestDescriptor`] into a transport-level `reqwest::Request`

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Body, Request};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::logging::redaction;
use crate::query::append_query;
use crate::types::RequestDescriptor;
use crate::{Error, Result};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Builder for transport requests
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    user_agent: Option<String>,
}

impl RequestBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
        }
    }

    /// Build the request for `descriptor` with the resolved `timeout`
    pub fn build(&self, descriptor: &RequestDescriptor, timeout: Duration) -> Result<Request> {
        let url = self.build_url(descriptor)?;
        let mut request = Request::new(descriptor.method().clone(), url);

        self.apply_headers(request.headers_mut(), descriptor)?;

        if let Some(auth) = descriptor.auth() {
            if let Some(value) = auth.header_value()? {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
        }

        if let Some(payload) = descriptor.payload() {
            if let Some(content_type) = &payload.content_type {
                let value = header_value(CONTENT_TYPE.as_str(), content_type)?;
                request.headers_mut().insert(CONTENT_TYPE, value);
            }
            *request.body_mut() = Some(Body::from(payload.bytes.clone()));
        } else if let Some(json) = descriptor.json_body() {
            let body = serialize_json_body(json)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
            *request.body_mut() = Some(Body::from(body));
        }

        *request.timeout_mut() = Some(timeout);

        tracing::debug!(
            url = %redaction::redact_uri(request.url().as_str()),
            headers = request.headers().len(),
            has_body = request.body().is_some(),
            "Built request"
        );

        Ok(request)
    }

    /// Base URI with the declared query parameters appended
    fn build_url(&self, descriptor: &RequestDescriptor) -> Result<Url> {
        let uri = match descriptor.query() {
            Some(params) if !params.is_empty() => append_query(descriptor.base_uri(), params.iter()),
            _ => descriptor.base_uri().to_string(),
        };

        Url::parse(&uri).map_err(|e| Error::HttpRequest {
            message: format!("Invalid request URI '{}': {}", redaction::redact_uri(&uri), e),
            source: Some(Box::new(e)),
        })
    }

    /// Accept, User-Agent, then descriptor headers; all appended
    fn apply_headers(&self, headers: &mut HeaderMap, descriptor: &RequestDescriptor) -> Result<()> {
        headers.append(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

        if let Some(user_agent) = &self.user_agent {
            headers.append(USER_AGENT, header_value(USER_AGENT.as_str(), user_agent)?);
        }

        for (name, value) in descriptor.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::HttpRequest {
                message: format!("Invalid header name '{}'", name),
                source: Some(Box::new(e)),
            })?;
            headers.append(header_name, header_value(name, value)?);
        }

        Ok(())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::HttpRequest {
        message: format!(
            "Invalid value for header '{}': {}",
            name,
            redaction::redact_header(name, value)
        ),
        source: Some(Box::new(e)),
    })
}

/// Serialize a structured body, leaving out null object members
fn serialize_json_body(json: &Value) -> Result<Bytes> {
    let mut body = json.clone();
    strip_nulls(&mut body);
    Ok(Bytes::from(serde_json::to_vec(&body)?))
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
