//! Edge Relay - a credential-injecting HTTP relay and event-stream consumer
//!
//! This library exposes modules for use by the binary and integration tests.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod sse;
pub mod traits;
