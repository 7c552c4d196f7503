//! Authentication handling for outbound requests
//!
//! Maps an [`AuthDescriptor`] onto a single `Authorization` header value of
//! the form `"{Scheme} {credential}"`:
//! - `Basic`: base64 of `username:password`
//! - `Bearer`: the raw token
//! - `ApiKey`: the raw key

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;

use crate::{Error, Result};

/// Authentication scheme names as they appear in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    None,
    Basic,
    Bearer,
    ApiKey,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::None => "None",
            AuthScheme::Basic => "Basic",
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AuthScheme::None),
            "basic" => Ok(AuthScheme::Basic),
            "bearer" => Ok(AuthScheme::Bearer),
            "apikey" | "api_key" | "api-key" => Ok(AuthScheme::ApiKey),
            _ => Err(Error::configuration(format!(
                "Invalid authorization type: {}",
                s
            ))),
        }
    }
}

/// Credentials attached to a single request
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthDescriptor {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer(String),
    ApiKey(String),
}

impl AuthDescriptor {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthDescriptor::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        AuthDescriptor::Bearer(token.into())
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        AuthDescriptor::ApiKey(key.into())
    }

    pub fn scheme(&self) -> AuthScheme {
        match self {
            AuthDescriptor::None => AuthScheme::None,
            AuthDescriptor::Basic { .. } => AuthScheme::Basic,
            AuthDescriptor::Bearer(_) => AuthScheme::Bearer,
            AuthDescriptor::ApiKey(_) => AuthScheme::ApiKey,
        }
    }

    /// `Authorization` header value, or `None` when no auth applies
    pub fn authorization(&self) -> Option<String> {
        let credential = match self {
            AuthDescriptor::None => return None,
            AuthDescriptor::Basic { username, password } => encode_basic(username, password),
            AuthDescriptor::Bearer(token) => token.clone(),
            AuthDescriptor::ApiKey(key) => key.clone(),
        };
        Some(format!("{} {}", self.scheme(), credential))
    }

    /// Header-ready form of [`authorization`](Self::authorization), marked sensitive
    pub fn header_value(&self) -> Result<Option<HeaderValue>> {
        let Some(value) = self.authorization() else {
            return Ok(None);
        };
        let mut header = HeaderValue::from_str(&value).map_err(|e| Error::Configuration {
            message: format!("{} credentials cannot be sent as a header value", self.scheme()),
            source: Some(e.into()),
        })?;
        header.set_sensitive(true);
        Ok(Some(header))
    }
}

// Keeps credentials out of debug output and logs
impl fmt::Debug for AuthDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthDescriptor::None => f.write_str("None"),
            AuthDescriptor::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            AuthDescriptor::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
            AuthDescriptor::ApiKey(_) => f.debug_tuple("ApiKey").field(&"***").finish(),
        }
    }
}

/// Base64 of `"{username}:{password}"`
pub fn encode_basic(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// Split a base64 Basic credential back into username and password.
///
/// Accepts the bare credential or a full `Basic <credential>` header value.
pub fn decode_basic(value: &str) -> Result<(String, String)> {
    let encoded = value
        .strip_prefix("Basic ")
        .unwrap_or(value)
        .trim();
    let bytes = STANDARD.decode(encoded).map_err(|e| Error::Configuration {
        message: "Basic credential is not valid base64".to_string(),
        source: Some(e.into()),
    })?;
    let text = String::from_utf8(bytes).map_err(|e| Error::Configuration {
        message: "Basic credential is not valid UTF-8".to_string(),
        source: Some(e.into()),
    })?;
    match text.split_once(':') {
        Some((user, pass)) => Ok((user.to_string(), pass.to_string())),
        None => Err(Error::configuration("Basic credential is missing ':' separator")),
    }
}
