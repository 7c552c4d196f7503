//! HTTP request pipeline
//!
//! This module provides:
//! - Request building from [`crate::types::RequestDescriptor`]s
//! - Authorization header construction
//! - Dispatch through a pluggable transport under a deadline
//! - Response decoding into typed values or files, with case-insensitive
//!   JSON field matching
//! - Error classification and normalization

pub mod auth;
pub mod builder;
pub mod client;
pub mod content;
pub mod error;
pub mod json;
pub mod timeout;
pub mod transport;

pub use auth::{AuthDescriptor, AuthScheme};
pub use builder::RequestBuilder;
pub use client::HttpClient;
pub use content::{MediaType, ResponseContent};
pub use error::{ApiError, Problem};
pub use transport::{ReqwestTransport, ReqwestTransportFactory, Transport, TransportFactory};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
