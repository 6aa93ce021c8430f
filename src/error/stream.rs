//! Streaming-related error types.
//!
//! These are the ways a consumed event stream can fail as a whole. Errors in a
//! single event line are not listed here; those are skipped by the consumer.

use super::ErrorCategory;

/// Terminal failure of one consumed stream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// Reading the next chunk failed.
    #[error("stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// The stream could not be opened at all.
    #[error("failed to open stream ({status}): {message}")]
    OpenFailed { status: u16, message: String },

    /// The backend reported an `error` message.
    #[error("backend error: {message}")]
    BackendError { message: String },

    /// Input ended before any `complete` or `error` message.
    #[error("stream ended without a terminal message")]
    EndedWithoutTerminal,

    /// The owner stopped reading before a terminal message.
    #[error("stream cancelled before completion")]
    Cancelled,
}

impl StreamError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::ConnectionLost { .. } | StreamError::EndedWithoutTerminal => {
                ErrorCategory::Network
            }
            StreamError::OpenFailed { status, .. } if *status < 500 => ErrorCategory::Client,
            StreamError::OpenFailed { .. } | StreamError::BackendError { .. } => {
                ErrorCategory::Server
            }
            StreamError::Cancelled => ErrorCategory::Client,
        }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StreamError::Cancelled) && self.category().is_retryable()
    }

    /// Returns true if the stream never produced a terminal message.
    pub fn is_abandonment(&self) -> bool {
        !matches!(self, StreamError::BackendError { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost. Please try again.".to_string()
            }
            StreamError::OpenFailed { message, .. } => {
                format!("The request could not be started: {}", message)
            }
            StreamError::BackendError { message } => message.clone(),
            StreamError::EndedWithoutTerminal => {
                "The server stopped responding before finishing. Please try again.".to_string()
            }
            StreamError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}
