//! Relay gateway error types.
//!
//! Every failure inside the relay handler ends up as a [`GatewayError`], which
//! renders as `{"error": "<message>"}` with a 400 or 500 status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use super::ErrorCategory;
use crate::traits::HttpError;

/// Public text for configuration failures. The real cause stays in server logs.
pub const CONFIGURATION_ERROR_MESSAGE: &str = "Server configuration error";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No upstream credential is configured.
    #[error("upstream credential is not configured")]
    MissingCredential,

    /// The credential source failed.
    #[error("failed to obtain upstream credential: {0}")]
    CredentialSource(HttpError),

    /// The `path` query parameter is absent or empty.
    #[error("Missing path parameter")]
    MissingPath,

    /// The virtual path tries to leave the upstream base.
    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    /// The query string could not be decoded.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The incoming request body could not be read.
    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    /// The upstream base and path do not form a valid URL.
    #[error("Invalid upstream URL: {0}")]
    InvalidTarget(String),

    /// Transport failure talking to the upstream API.
    #[error("{0}")]
    Upstream(#[from] HttpError),

    /// Upstream answered in buffered mode with a body that is not JSON.
    #[error("Upstream returned invalid JSON: {0}")]
    InvalidUpstreamJson(String),

    /// The relay response could not be assembled.
    #[error("Failed to build response: {0}")]
    ResponseBuild(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingPath
            | GatewayError::InvalidPath(_)
            | GatewayError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::MissingCredential
            | GatewayError::CredentialSource(_)
            | GatewayError::InvalidTarget(_) => ErrorCategory::Configuration,
            GatewayError::MissingPath
            | GatewayError::InvalidPath(_)
            | GatewayError::InvalidQuery(_)
            | GatewayError::RequestBody(_) => ErrorCategory::Client,
            GatewayError::Upstream(_) => ErrorCategory::Network,
            GatewayError::InvalidUpstreamJson(_) | GatewayError::ResponseBuild(_) => {
                ErrorCategory::Server
            }
        }
    }

    /// Message placed in the JSON body returned to the caller.
    pub fn public_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => CONFIGURATION_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Server | ErrorCategory::Network => {
                tracing::error!(category = %self.category(), status = status.as_u16(), "relay failed: {}", self);
            }
            ErrorCategory::Client => {
                tracing::warn!(status = status.as_u16(), "rejected relay request: {}", self);
            }
        }
        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}
