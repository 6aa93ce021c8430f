//! Upstream credential trait abstraction.
//!
//! The gateway asks an [`UpstreamAuthenticator`] for a bearer token on every
//! request, so the credential source (static secret, environment, rotating
//! token) can change without touching the forwarding logic.

use async_trait::async_trait;

use super::http::HttpError;

/// Supplies the bearer credential the gateway presents to the upstream API.
///
/// # Example
///
/// ```ignore
/// use edge_relay::traits::UpstreamAuthenticator;
///
/// async fn authorization<A: UpstreamAuthenticator>(auth: &A) -> Option<String> {
///     auth.bearer_token().await.ok().flatten().map(|t| format!("Bearer {t}"))
/// }
/// ```
#[async_trait]
pub trait UpstreamAuthenticator: Send + Sync {
    /// Returns the token to send as `Authorization: Bearer <token>`.
    ///
    /// - `Ok(Some(token))` when a credential is available
    /// - `Ok(None)` when no credential is configured
    /// - `Err(error)` when the credential source itself failed
    async fn bearer_token(&self) -> Result<Option<String>, HttpError>;
}
