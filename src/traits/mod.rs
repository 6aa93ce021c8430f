//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`UpstreamClient`] - HTTP operations against the upstream API (buffered and streaming)
//! - [`UpstreamAuthenticator`] - Source of the bearer credential injected by the gateway

pub mod credentials;
pub mod http;

pub use credentials::UpstreamAuthenticator;
pub use http::{
    ByteStream, Headers, HttpError, Response, StreamingResponse, UpstreamClient, UpstreamRequest,
};
