//! The relay request descriptor and header forwarding rules.

use axum::http::{HeaderMap, Method};
use bytes::Bytes;

use super::target::{normalize_virtual_path, UpstreamTarget, PATH_PARAM};
use crate::error::GatewayError;
use crate::traits::{Headers, UpstreamRequest};

/// Caller headers that never reach the upstream API.
///
/// `authorization` is replaced by the gateway's own credential; the rest are
/// recomputed by the HTTP client, hop-by-hop, or tied to the caller's own
/// connection (`origin`, `accept-encoding`).
pub const STRIPPED_HEADERS: &[&str] = &[
    "authorization",
    "host",
    "content-length",
    "origin",
    "accept-encoding",
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "te",
    "trailer",
    "proxy-authorization",
    "proxy-connection",
];

pub fn is_forwardable(name: &str) -> bool {
    !STRIPPED_HEADERS
        .iter()
        .any(|stripped| stripped.eq_ignore_ascii_case(name))
}

/// Copy forwardable headers, joining repeated values with `", "`.
///
/// Values that are not visible ASCII are dropped.
pub fn forwardable_headers(headers: &HeaderMap) -> Headers {
    let mut forwarded = Headers::new();
    for (name, value) in headers {
        if !is_forwardable(name.as_str()) {
            continue;
        }
        let Ok(value) = value.to_str() else {
            tracing::debug!(header = %name, "Dropping non-text header value");
            continue;
        };
        forwarded
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    forwarded
}

/// One caller request, validated and ready to forward.
///
/// Owned by the in-flight request and dropped once the response is sent.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    /// Normalized virtual path
    pub path: String,
    /// Every decoded query pair, `path` included
    pub query: Vec<(String, String)>,
    /// Forwardable caller headers
    pub headers: Headers,
    pub body: Bytes,
}

impl RelayRequest {
    /// Validate the `path` parameter and capture forwardable headers.
    ///
    /// The first `path` pair wins. Fails with [`GatewayError::MissingPath`]
    /// when there is none or it is blank.
    pub fn from_parts(
        method: Method,
        headers: &HeaderMap,
        query: Vec<(String, String)>,
    ) -> Result<Self, GatewayError> {
        let raw_path = query
            .iter()
            .find(|(key, _)| key == PATH_PARAM)
            .map(|(_, value)| value.as_str())
            .ok_or(GatewayError::MissingPath)?;
        let path = normalize_virtual_path(raw_path)?;

        Ok(Self {
            method,
            path,
            query,
            headers: forwardable_headers(headers),
            body: Bytes::new(),
        })
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// The upstream request, with the gateway credential attached.
    pub fn into_upstream(
        self,
        target: &UpstreamTarget,
        token: &str,
    ) -> Result<UpstreamRequest, GatewayError> {
        let url = target.resolve(&self.path, &self.query)?;
        let mut request = UpstreamRequest::new(self.method, url.as_str()).with_body(self.body);
        request.headers = self.headers;
        Ok(request.with_header("authorization", format!("Bearer {}", token)))
    }
}
