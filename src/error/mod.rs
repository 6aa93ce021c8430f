//! Unified error handling for the relay.
//!
//! - [`GatewayError`] - failures while relaying one request, rendered as JSON
//! - [`StreamError`] - terminal failures of a consumed event stream
//! - [`ErrorCategory`] - shared classification used for logging and retry hints
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, dropped stream | Yes |
//! | Server | Upstream reported a failure | Yes |
//! | Client | Bad relay request, cancelled stream | No |
//! | Configuration | Missing credential, bad upstream base | No |

mod category;
mod gateway;
mod stream;

pub use category::ErrorCategory;
pub use gateway::{GatewayError, CONFIGURATION_ERROR_MESSAGE};
pub use stream::StreamError;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::traits::HttpError;

    #[test]
    fn test_every_error_is_categorized() {
        let gateway: Vec<GatewayError> = vec![
            GatewayError::MissingCredential,
            GatewayError::MissingPath,
            HttpError::Timeout("30s".to_string()).into(),
            GatewayError::InvalidUpstreamJson("expected value".to_string()),
        ];
        let categories: Vec<ErrorCategory> = gateway.iter().map(|e| e.category()).collect();
        assert_eq!(
            categories,
            vec![
                ErrorCategory::Configuration,
                ErrorCategory::Client,
                ErrorCategory::Network,
                ErrorCategory::Server,
            ]
        );

        assert_eq!(StreamError::Cancelled.category(), ErrorCategory::Client);
    }
}
