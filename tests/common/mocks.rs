//! Upstream fixtures for integration tests.
//!
//! Helpers that mount canned upstream behavior on a wiremock server.

use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{upstream_path, TEST_API_KEY};

/// Render messages as newline-delimited `data:` lines.
pub fn event_stream_body(messages: &[Value]) -> String {
    messages
        .iter()
        .map(|m| format!("data: {}\n", m))
        .collect()
}

/// Mount a JSON response that only matches requests carrying the test credential.
pub async fn mount_json(
    server: &MockServer,
    http_method: &str,
    virtual_path: &str,
    status: u16,
    body: Value,
) {
    Mock::given(method(http_method))
        .and(path(upstream_path(virtual_path)))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY)))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount an event-stream response for `POST virtual_path`.
pub async fn mount_event_stream(server: &MockServer, virtual_path: &str, body: String) {
    Mock::given(method("POST"))
        .and(path(upstream_path(virtual_path)))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

/// Fail the test if the upstream receives any request at all.
pub async fn expect_no_upstream_calls(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}
