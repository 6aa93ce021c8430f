//! Mock implementations for testing.
//!
//! - [`MockUpstreamClient`] - upstream client with configurable replies and request recording

pub mod upstream;

pub use upstream::{MockReply, MockUpstreamClient};
