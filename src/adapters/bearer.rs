//! Bearer credential adapters.
//!
//! - [`StaticBearer`] - a credential fixed at startup
//! - [`EnvBearer`] - re-reads an environment variable on every request

use async_trait::async_trait;

use crate::traits::{HttpError, UpstreamAuthenticator};

/// Credential fixed when the gateway starts.
#[derive(Clone, Default)]
pub struct StaticBearer {
    token: Option<String>,
}

impl StaticBearer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A source with no credential; every relay answers 500.
    pub fn unconfigured() -> Self {
        Self { token: None }
    }

    pub fn from_option(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl std::fmt::Debug for StaticBearer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticBearer")
            .field("configured", &self.token.is_some())
            .finish()
    }
}

#[async_trait]
impl UpstreamAuthenticator for StaticBearer {
    async fn bearer_token(&self) -> Result<Option<String>, HttpError> {
        Ok(self.token.clone())
    }
}

/// Credential read from an environment variable at request time.
#[derive(Debug, Clone)]
pub struct EnvBearer {
    var: String,
}

impl EnvBearer {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl UpstreamAuthenticator for EnvBearer {
    async fn bearer_token(&self) -> Result<Option<String>, HttpError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(HttpError::Other(format!(
                "{} is not valid unicode",
                self.var
            ))),
        }
    }
}
