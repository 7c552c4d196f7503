//! Response content inspection and decoding
//!
//! Decides how a successful response body is interpreted:
//! 1. `application/json` is deserialized into the requested type, matching
//!    field names without regard to case
//! 2. a `Content-Disposition` header marks a file download
//! 3. anything else carries no value

use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::types::FileResult;
use crate::{Error, Result};

static FILE_NAME_EDGES: OnceLock<Regex> = OnceLock::new();

/// Essence of a `Content-Type` header (`type/subtype`, lower-cased)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
}

impl MediaType {
    /// Parse a `Content-Type` value, ignoring its parameters
    pub fn parse(value: &str) -> Self {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self { essence }
    }

    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn is_json(&self) -> bool {
        self.essence == "application/json"
    }

    pub fn is_plain_text(&self) -> bool {
        self.essence == "text/plain"
    }
}

/// Media type declared by `headers`, if any
pub fn media_type(headers: &HeaderMap) -> Option<MediaType> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(MediaType::parse)
}

/// Interpreted body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseContent<T> {
    /// JSON body deserialized into `T` (`T::default()` for an empty body)
    Json(T),
    /// Body declared as a file attachment
    File(FileResult),
    /// Body with no interpretable content
    Empty,
}

impl<T: Default> ResponseContent<T> {
    /// The typed value; an empty body yields `T::default()`
    pub fn into_value(self) -> Result<T> {
        match self {
            ResponseContent::Json(value) => Ok(value),
            ResponseContent::Empty => Ok(T::default()),
            ResponseContent::File(file) => Err(Error::UnexpectedContent {
                message: format!(
                    "response is a file attachment ('{}'), not a {}",
                    file.file_name,
                    std::any::type_name::<T>()
                ),
            }),
        }
    }
}

impl<T> ResponseContent<T> {
    /// The file payload; an empty body yields an empty file
    pub fn into_file(self) -> Result<FileResult> {
        match self {
            ResponseContent::File(file) => Ok(file),
            ResponseContent::Empty => Ok(FileResult::default()),
            ResponseContent::Json(_) => Err(Error::UnexpectedContent {
                message: "response is a JSON document, not a file attachment".to_string(),
            }),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ResponseContent::File(_))
    }
}

/// Interpret a successful response body
pub fn decode<T>(headers: &HeaderMap, body: Bytes) -> Result<ResponseContent<T>>
where
    T: DeserializeOwned + Default,
{
    if media_type(headers).is_some_and(|mt| mt.is_json()) {
        if body.is_empty() {
            return Ok(ResponseContent::Json(T::default()));
        }
        let value = crate::http::json::from_slice(&body)?;
        return Ok(ResponseContent::Json(value));
    }

    if let Some(disposition) = headers
        .get(CONTENT_DISPOSITION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    {
        let file_name = disposition_file_name(&disposition)
            .map(|name| trim_file_name(&name))
            .unwrap_or_default();
        return Ok(ResponseContent::File(FileResult {
            file_name,
            content: body,
        }));
    }

    Ok(ResponseContent::Empty)
}

/// Extract the file name of a `Content-Disposition` value.
///
/// Prefers `filename`, falling back to the RFC 5987 `filename*` form.
pub fn disposition_file_name(disposition: &str) -> Option<String> {
    let params = disposition_params(disposition);

    let plain = params
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value.clone());
    if plain.is_some() {
        return plain;
    }

    params
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("filename*"))
        .map(|(_, value)| decode_ext_value(value))
}

/// Strip leading and trailing characters that are not letters or digits
pub fn trim_file_name(file_name: &str) -> String {
    let re = FILE_NAME_EDGES
        .get_or_init(|| Regex::new(r"^[\W_]+|[\W_]+$").expect("Valid regex pattern"));
    re.replace_all(file_name, "").into_owned()
}

/// Split the parameters after the disposition type into `(name, value)`
/// pairs, unquoting quoted-string values
fn disposition_params(disposition: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = disposition.chars().peekable();

    // skip the disposition type
    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
    }

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ';').is_some() {}

        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && *c != ';') {
            name.push(c);
        }
        if name.trim().is_empty() && chars.peek().is_none() {
            break;
        }

        let mut value = String::new();
        if chars.next_if_eq(&'=').is_some() {
            while chars.next_if(|c| *c == ' ' || *c == '\t').is_some() {}
            if chars.next_if_eq(&'"').is_some() {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        other => value.push(other),
                    }
                }
                // drop anything between the closing quote and the next ';'
                while chars.next_if(|c| *c != ';').is_some() {}
            } else {
                while let Some(c) = chars.next_if(|c| *c != ';') {
                    value.push(c);
                }
                value = value.trim_end().to_string();
            }
        }

        let name = name.trim();
        if !name.is_empty() {
            params.push((name.to_string(), value));
        }
    }

    params
}

/// Decode `charset'language'percent-encoded` (RFC 5987)
fn decode_ext_value(value: &str) -> String {
    let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
    String::from_utf8_lossy(&urlencoding::decode_binary(encoded.as_bytes())).into_owned()
}
