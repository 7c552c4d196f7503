//! SmartHttp Core - descriptor-driven HTTP request pipeline
//!
//! This crate turns an immutable [`RequestDescriptor`] into an outbound HTTP
//! request, dispatches it, and maps the response into a typed value, a file
//! or nothing at all, normalizing failures into [`Error`].
//!
//! # Main Components
//!
//! - **Query Codec**: percent-encoded query appending and multimap parsing
//! - **Request Builder**: headers, authorization and body assembly
//! - **Dispatcher**: deadline- and cancellation-aware execution
//! - **Error Classifier**: media-type driven [`ApiError`] messages
//!
//! # Example
//!
//! ```no_run
//! use serde::Deserialize;
//! use smarthttp_core::{AuthDescriptor, ClientConfig, HttpClient, RequestDescriptor, Result};
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! async fn example() -> Result<()> {
//!     let client = HttpClient::new(ClientConfig::default())?;
//!     let request = RequestDescriptor::get("https://api.example.com/users")
//!         .auth(AuthDescriptor::bearer("token"))
//!         .query_param("page", "2")
//!         .build()?;
//!
//!     let users: Vec<User> = client.send(&request).await?;
//!     println!("{} users", users.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod query;
pub mod types;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{
    ApiError, AuthDescriptor, AuthScheme, HttpClient, ResponseContent, Transport,
    TransportFactory,
};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use query::{append_query, parse_query, QueryMap, QueryParams, ToQueryParams};
pub use types::{FileResult, Payload, RequestDescriptor, RequestDescriptorBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
