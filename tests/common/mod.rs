//! Common test utilities for integration tests.
//!
//! Starts a real gateway on an ephemeral port in front of a wiremock
//! upstream, so tests exercise the reqwest adapter and axum server together.
//!
//! # Example
//!
//! ```ignore
//! let upstream = MockServer::start().await;
//! let gateway = TestGateway::start(&upstream).await;
//! let client = gateway.client().with_user_id(TEST_USER_ID);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::net::SocketAddr;

use edge_relay::client::RelayClient;
use edge_relay::config::GatewayConfig;
use edge_relay::gateway::{start_gateway_on, GatewayState};
use tokio::task::JoinHandle;
use wiremock::MockServer;

/// Credential the gateway under test presents upstream.
pub const TEST_API_KEY: &str = "test-relay-key-12345";

pub const TEST_USER_ID: &str = "u1";

/// Path prefix of the upstream base URL.
pub const UPSTREAM_PREFIX: &str = "/api/v1";

/// A gateway bound to `127.0.0.1:0`, stopped when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestGateway {
    /// Gateway with the test credential configured.
    pub async fn start(upstream: &MockServer) -> Self {
        Self::start_with(config_for(upstream).with_api_key(TEST_API_KEY)).await
    }

    /// Gateway with no credential; every relay should answer 500.
    pub async fn start_unconfigured(upstream: &MockServer) -> Self {
        Self::start_with(config_for(upstream)).await
    }

    pub async fn start_with(config: GatewayConfig) -> Self {
        let state = GatewayState::from_config(&config).expect("valid gateway config");
        let (handle, addr) = start_gateway_on("127.0.0.1:0".parse().unwrap(), state)
            .await
            .expect("gateway should bind");
        Self { addr, handle }
    }

    /// Base URL of the gateway, with a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Gateway URL for a raw query string.
    pub fn url_with_query(&self, query: &str) -> String {
        format!("http://{}/?{}", self.addr, query)
    }

    pub fn client(&self) -> RelayClient {
        RelayClient::new(self.url())
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Config pointing at `upstream` under [`UPSTREAM_PREFIX`].
pub fn config_for(upstream: &MockServer) -> GatewayConfig {
    GatewayConfig::default().with_upstream_url(format!("{}{}", upstream.uri(), UPSTREAM_PREFIX))
}

/// Full upstream path for a virtual path.
pub fn upstream_path(virtual_path: &str) -> String {
    format!("{}{}", UPSTREAM_PREFIX, virtual_path)
}
