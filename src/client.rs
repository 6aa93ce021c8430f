//! Relay gateway client.
//!
//! Caller-side helper that addresses the upstream API through the gateway's
//! `?path=` scheme and feeds streaming responses into a [`StreamConsumer`].

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::{multipart, Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::gateway::{BRIEF_ANALYSIS_PATH, PATH_PARAM};
use crate::sse::{StreamConsumer, StreamObserver, StreamSchema};

/// Query parameter carrying the caller identity.
pub const USER_ID_PARAM: &str = "user_id";

/// A response body read chunk by chunk.
pub type RelayStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx answer, with the `error` or `detail` text when the body had one.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The stream-level failure this error represents when opening a stream.
    pub fn into_stream_error(self) -> StreamError {
        match self {
            ClientError::ServerError { status, message } => {
                StreamError::OpenFailed { status, message }
            }
            ClientError::Http(e) => StreamError::ConnectionLost {
                message: e.to_string(),
            },
            other => StreamError::OpenFailed {
                status: 0,
                message: other.to_string(),
            },
        }
    }
}

/// One file attached to a brief.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn into_part(self) -> Result<multipart::Part, ClientError> {
        let part = multipart::Part::bytes(self.bytes).file_name(self.file_name);
        match self.content_type {
            Some(mime) => Ok(part.mime_str(&mime)?),
            None => Ok(part),
        }
    }
}

/// A campaign brief submitted for analysis.
#[derive(Debug, Clone, Default)]
pub struct BriefSubmission {
    pub brief: String,
    pub files: Vec<Attachment>,
}

impl BriefSubmission {
    pub fn new(brief: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: Attachment) -> Self {
        self.files.push(file);
        self
    }

    /// Multipart form with a `brief` text field and one `files` part per attachment.
    pub fn into_form(self) -> Result<multipart::Form, ClientError> {
        let mut form = multipart::Form::new().text("brief", self.brief);
        for file in self.files {
            form = form.part("files", file.into_part()?);
        }
        Ok(form)
    }
}

/// Client for the relay gateway.
#[derive(Debug, Clone)]
pub struct RelayClient {
    /// Gateway endpoint, e.g. `http://127.0.0.1:8787/`
    pub gateway_url: String,
    /// Sent as `user_id` on every call when set
    pub user_id: Option<String>,
    client: Client,
}

impl RelayClient {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            user_id: None,
            client: Client::new(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Gateway URL addressing `path` upstream, with `user_id` and `query` appended.
    pub fn relay_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.gateway_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.gateway_url)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(PATH_PARAM, path);
            if let Some(user_id) = &self.user_id {
                pairs.append_pair(USER_ID_PARAM, user_id);
            }
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// `GET` a JSON resource through the gateway.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = self.relay_url(path, query)?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    /// `POST` a JSON body through the gateway.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.relay_url(path, &[])?;
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    /// `POST` a multipart form and return the response body as a byte stream.
    ///
    /// Fails without reading the body when the gateway answers non-2xx.
    pub async fn open_stream(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<RelayStream, ClientError> {
        let url = self.relay_url(path, &[])?;
        let response = self
            .client
            .post(url)
            .header("Accept", "text/event-stream")
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        Ok(Box::pin(response.bytes_stream()))
    }

    /// Submit a brief and consume the analysis stream.
    ///
    /// Returns the `data` of the final `complete` message. A stream that
    /// cannot be opened is reported to `observer` through `on_abandoned`,
    /// the same as one that breaks midway.
    pub async fn analyze_brief<O>(
        &self,
        submission: BriefSubmission,
        observer: &mut O,
        cancel: Option<CancellationToken>,
    ) -> Result<Option<Value>, StreamError>
    where
        O: StreamObserver + ?Sized,
    {
        let open = async move {
            let form = submission.into_form()?;
            self.open_stream(BRIEF_ANALYSIS_PATH, form).await
        };
        let opened = match &cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(StreamError::Cancelled),
                    result = open => result.map_err(ClientError::into_stream_error),
                }
            }
            None => open.await.map_err(ClientError::into_stream_error),
        };
        let body = match opened {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "Brief analysis stream did not open");
                observer.on_abandoned(&err);
                return Err(err);
            }
        };

        let mut consumer = StreamConsumer::new(StreamSchema::brief_analysis());
        if let Some(token) = cancel {
            consumer = consumer.with_cancellation(token);
        }
        consumer.consume(body, observer).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn server_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ClientError::ServerError {
            status,
            message: error_text(&text),
        }
    }
}

/// Pull the human-readable message out of an error body.
fn error_text(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

/// Drain a relay stream into memory. Mostly useful in tests and scripts.
pub async fn collect_stream(mut stream: RelayStream) -> Result<Vec<u8>, ClientError> {
    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk?);
    }
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_url_carries_path_user_and_query() {
        let client = RelayClient::new("http://127.0.0.1:8787/").with_user_id("u1");
        let url = client
            .relay_url("/campaigns/c1", &[("limit", "10")])
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("path".to_string(), "/campaigns/c1".to_string()),
                ("user_id".to_string(), "u1".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_relay_url_rejects_bad_gateway_url() {
        let client = RelayClient::new("not a url");
        assert!(matches!(
            client.relay_url("/projects", &[]),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_text_prefers_error_field() {
        assert_eq!(
            error_text(r#"{"error":"Missing path parameter"}"#),
            "Missing path parameter"
        );
        assert_eq!(error_text(r#"{"detail":"Not found"}"#), "Not found");
        assert_eq!(error_text("plain failure"), "plain failure");
    }

    #[test]
    fn test_server_error_becomes_open_failed() {
        let err = ClientError::ServerError {
            status: 500,
            message: "Server configuration error".to_string(),
        };
        assert_eq!(
            err.into_stream_error(),
            StreamError::OpenFailed {
                status: 500,
                message: "Server configuration error".to_string()
            }
        );
    }

    #[test]
    fn test_brief_form_builds_with_attachments() {
        let submission = BriefSubmission::new("Launch the spring campaign")
            .with_file(Attachment::new("brief.pdf", b"%PDF-1.4".to_vec()).with_content_type("application/pdf"))
            .with_file(Attachment::new("notes.txt", b"notes".to_vec()));
        assert_eq!(submission.files.len(), 2);
        assert!(submission.into_form().is_ok());
    }

    #[test]
    fn test_invalid_attachment_mime_is_rejected() {
        let submission = BriefSubmission::new("brief")
            .with_file(Attachment::new("x.bin", vec![0u8]).with_content_type("not a mime"));
        assert!(submission.into_form().is_err());
    }
}
