//! Reqwest-based upstream client adapter.
//!
//! Production implementation of [`UpstreamClient`]. It applies no timeout of
//! its own; whatever the wrapped `reqwest::Client` enforces is inherited.

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::traits::{
    Headers, HttpError, Response, StreamingResponse, UpstreamClient, UpstreamRequest,
};

/// Upstream client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use edge_relay::adapters::ReqwestUpstreamClient;
/// use edge_relay::traits::{UpstreamClient, UpstreamRequest};
///
/// let client = ReqwestUpstreamClient::new();
/// let response = client
///     .send(UpstreamRequest::new(Method::GET, "https://api.example.com/projects"))
///     .await?;
/// println!("Status: {}", response.status);
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestUpstreamClient {
    client: reqwest::Client,
}

impl ReqwestUpstreamClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap a preconfigured `reqwest::Client` (timeouts, pools, TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Convert reqwest error to HttpError.
    pub(crate) fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert reqwest headers to our Headers type.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    fn build(&self, request: UpstreamRequest) -> Result<reqwest::RequestBuilder, HttpError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| HttpError::Other(format!("unsupported method: {e}")))?;
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = self.client.request(method, url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }
        Ok(builder)
    }
}

impl Default for ReqwestUpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn send(&self, request: UpstreamRequest) -> Result<Response, HttpError> {
        let response = self
            .build(request)?
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(Self::convert_error)?;

        Ok(Response::with_headers(status, headers, body))
    }

    async fn send_streaming(
        &self,
        request: UpstreamRequest,
    ) -> Result<StreamingResponse, HttpError> {
        let response = self
            .build(request)?
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout(e.to_string())
                } else {
                    HttpError::Io(e.to_string())
                }
            })
        });

        Ok(StreamingResponse {
            status,
            headers,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_convert_headers() {
        let mut header_map = reqwest::header::HeaderMap::new();
        header_map.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        header_map.insert(reqwest::header::CONTENT_LENGTH, "100".parse().unwrap());

        let headers = ReqwestUpstreamClient::convert_headers(&header_map);
        assert_eq!(
            headers.get("content-type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(headers.get("content-length"), Some(&"100".to_string()));
    }

    #[tokio::test]
    async fn test_send_invalid_url() {
        let client = ReqwestUpstreamClient::new();
        let result = client
            .send(UpstreamRequest::new(Method::GET, "not-a-valid-url"))
            .await;
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_send_connection_refused() {
        let client = ReqwestUpstreamClient::new();
        let result = client
            .send(UpstreamRequest::new(Method::GET, "http://127.0.0.1:1/projects"))
            .await;
        assert!(matches!(
            result,
            Err(HttpError::ConnectionFailed(_)) | Err(HttpError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_send_streaming_connection_refused() {
        let client = ReqwestUpstreamClient::new();
        let result = client
            .send_streaming(UpstreamRequest::new(
                Method::POST,
                "http://127.0.0.1:1/ai/brief-analysis",
            ))
            .await;
        assert!(result.is_err());
    }
}
