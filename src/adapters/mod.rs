//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestUpstreamClient`] - upstream client using reqwest
//! - [`StaticBearer`] / [`EnvBearer`] - bearer credential sources
//!
//! The [`mock`] submodule provides test doubles.

pub mod bearer;
pub mod mock;
pub mod reqwest_http;

pub use bearer::{EnvBearer, StaticBearer};
pub use mock::{MockReply, MockUpstreamClient};
pub use reqwest_http::ReqwestUpstreamClient;
