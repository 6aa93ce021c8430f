//! Mock upstream client for testing.
//!
//! Returns predefined replies and records every request so tests can assert
//! on the exact URL, headers and call count the gateway produced.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{
    Headers, HttpError, Response, StreamingResponse, UpstreamClient, UpstreamRequest,
};

/// Configuration for a mock reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Buffered response with a raw body
    Body { status: u16, body: Bytes },
    /// Response whose body is delivered as the given chunks
    Stream { status: u16, chunks: Vec<Bytes> },
    /// Chunks followed by a transport error mid-stream
    BrokenStream { chunks: Vec<Bytes>, error: HttpError },
    /// Transport failure before any response
    Error(HttpError),
}

impl MockReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockReply::Body {
            status,
            body: Bytes::from(body.to_string()),
        }
    }

    pub fn event_stream(chunks: &[&str]) -> Self {
        MockReply::Stream {
            status: 200,
            chunks: chunks
                .iter()
                .map(|c| Bytes::copy_from_slice(c.as_bytes()))
                .collect(),
        }
    }
}

/// Mock upstream client.
///
/// # Example
///
/// ```ignore
/// use edge_relay::adapters::mock::{MockReply, MockUpstreamClient};
///
/// let upstream = MockUpstreamClient::new();
/// upstream.set_reply("/projects", MockReply::json(200, json!({"projects": []})));
/// // ... drive the gateway ...
/// assert_eq!(upstream.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockUpstreamClient {
    /// Replies keyed by a substring of the upstream URL path
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    default_reply: Arc<Mutex<Option<MockReply>>>,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
}

impl MockUpstreamClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to any request whose URL contains `url_fragment`.
    pub fn set_reply(&self, url_fragment: &str, reply: MockReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.insert(url_fragment.to_string(), reply);
        }
    }

    pub fn set_default_reply(&self, reply: MockReply) {
        if let Ok(mut default) = self.default_reply.lock() {
            *default = Some(reply);
        }
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn record(&self, request: &UpstreamRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
    }

    fn reply_for(&self, url: &str) -> Option<MockReply> {
        let path = url.split('?').next().unwrap_or(url);
        let matched = self.replies.lock().ok().and_then(|replies| {
            replies
                .iter()
                .filter(|(fragment, _)| path.contains(fragment.as_str()))
                .max_by_key(|(fragment, _)| fragment.len())
                .map(|(_, reply)| reply.clone())
        });
        matched.or_else(|| self.default_reply.lock().ok().and_then(|d| d.clone()))
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn send(&self, request: UpstreamRequest) -> Result<Response, HttpError> {
        self.record(&request);

        match self.reply_for(&request.url) {
            Some(MockReply::Body { status, body }) => Ok(Response::new(status, body)),
            Some(MockReply::Stream { status, chunks }) => {
                Ok(Response::new(status, Bytes::from(chunks.concat())))
            }
            Some(MockReply::BrokenStream { error, .. }) | Some(MockReply::Error(error)) => {
                Err(error)
            }
            None => Err(HttpError::Other(format!(
                "No mock reply for URL: {}",
                request.url
            ))),
        }
    }

    async fn send_streaming(
        &self,
        request: UpstreamRequest,
    ) -> Result<StreamingResponse, HttpError> {
        self.record(&request);

        match self.reply_for(&request.url) {
            Some(MockReply::Stream { status, chunks }) => {
                let stream = futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>));
                Ok(StreamingResponse {
                    status,
                    headers: Headers::new(),
                    body: Box::pin(stream),
                })
            }
            Some(MockReply::Body { status, body }) => {
                let stream = futures::stream::iter(std::iter::once(Ok::<Bytes, HttpError>(body)));
                Ok(StreamingResponse {
                    status,
                    headers: Headers::new(),
                    body: Box::pin(stream),
                })
            }
            Some(MockReply::BrokenStream { chunks, error }) => {
                let items = chunks
                    .into_iter()
                    .map(Ok::<Bytes, HttpError>)
                    .chain(std::iter::once(Err(error)));
                Ok(StreamingResponse {
                    status: 200,
                    headers: Headers::new(),
                    body: Box::pin(futures::stream::iter(items)),
                })
            }
            Some(MockReply::Error(error)) => Err(error),
            None => Err(HttpError::Other(format!(
                "No mock reply for URL: {}",
                request.url
            ))),
        }
    }
}
