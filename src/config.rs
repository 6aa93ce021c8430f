//! Gateway configuration.
//!
//! Values come from the environment (see [`GatewayConfig::from_env`]) and can
//! be overridden with the builder methods.
//!
//! # Example
//!
//! ```ignore
//! use edge_relay::config::GatewayConfig;
//!
//! let config = GatewayConfig::default()
//!     .with_upstream_url("https://api.example.com/v1")
//!     .with_api_key("secret");
//! ```

use std::fmt;
use std::net::SocketAddr;

/// Environment variable holding the upstream bearer credential.
pub const API_KEY_ENV: &str = "RELAY_API_KEY";
/// When true, [`API_KEY_ENV`] is re-read on every request instead of once at startup.
pub const API_KEY_ROTATE_ENV: &str = "RELAY_API_KEY_ROTATE";
pub const UPSTREAM_URL_ENV: &str = "RELAY_UPSTREAM_URL";
pub const BIND_ADDR_ENV: &str = "RELAY_BIND_ADDR";
pub const MAX_BODY_BYTES_ENV: &str = "RELAY_MAX_BODY_BYTES";
/// Comma-separated virtual paths relayed in streaming mode on POST.
pub const STREAM_PATHS_ENV: &str = "RELAY_STREAM_PATHS";

pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
/// Large enough for a brief with a handful of attached documents.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} is not a valid byte count: {value}")]
    InvalidBodyLimit { var: &'static str, value: String },

    #[error("{var} is not a valid URL: {value}")]
    InvalidUpstreamUrl { var: &'static str, value: String },

    #[error("{var} is not a valid boolean: {value}")]
    InvalidFlag { var: &'static str, value: String },
}

/// Runtime configuration for the relay gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Bearer credential presented to the upstream API
    pub api_key: Option<String>,
    /// Read the credential from the environment per request
    pub rotate_api_key: bool,
    /// Base URL every virtual path is resolved against
    pub upstream_url: String,
    /// Address the gateway listens on
    pub bind_addr: SocketAddr,
    /// Maximum accepted request body size
    pub max_body_bytes: usize,
    /// Streaming paths in addition to the built-in ones
    pub stream_paths: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rotate_api_key: false,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            stream_paths: Vec::new(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rotate_api_key", &self.rotate_api_key)
            .field("upstream_url", &self.upstream_url)
            .field("bind_addr", &self.bind_addr)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("stream_paths", &self.stream_paths)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_key_rotation(mut self, rotate: bool) -> Self {
        self.rotate_api_key = rotate;
        self
    }

    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_paths.push(path.into());
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get(API_KEY_ENV);

        if let Some(flag) = get(API_KEY_ROTATE_ENV) {
            config.rotate_api_key = parse_flag(&flag).ok_or(ConfigError::InvalidFlag {
                var: API_KEY_ROTATE_ENV,
                value: flag.clone(),
            })?;
        }

        if let Some(url) = get(UPSTREAM_URL_ENV) {
            if reqwest::Url::parse(&url).is_err() {
                return Err(ConfigError::InvalidUpstreamUrl {
                    var: UPSTREAM_URL_ENV,
                    value: url,
                });
            }
            config.upstream_url = url;
        }

        if let Some(addr) = get(BIND_ADDR_ENV) {
            config.bind_addr = addr.parse().map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_ENV,
                value: addr.clone(),
            })?;
        }

        if let Some(limit) = get(MAX_BODY_BYTES_ENV) {
            config.max_body_bytes = limit.parse().map_err(|_| ConfigError::InvalidBodyLimit {
                var: MAX_BODY_BYTES_ENV,
                value: limit.clone(),
            })?;
        }

        if let Some(paths) = get(STREAM_PATHS_ENV) {
            config.stream_paths = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.stream_paths.is_empty());
        assert!(!config.rotate_api_key);
    }

    #[test]
    fn test_api_key_rotation_flag() {
        for value in ["1", "true", "YES", "on"] {
            let config =
                GatewayConfig::from_lookup(lookup(&[(API_KEY_ROTATE_ENV, value)])).unwrap();
            assert!(config.rotate_api_key, "{value}");
        }
        let config = GatewayConfig::from_lookup(lookup(&[(API_KEY_ROTATE_ENV, "false")])).unwrap();
        assert!(!config.rotate_api_key);

        let err = GatewayConfig::from_lookup(lookup(&[(API_KEY_ROTATE_ENV, "sometimes")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "secret"),
            (UPSTREAM_URL_ENV, "https://api.example.com/v1"),
            (BIND_ADDR_ENV, "0.0.0.0:9000"),
            (MAX_BODY_BYTES_ENV, "1024"),
            (STREAM_PATHS_ENV, "/ai/chat, /ai/campaign ,"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.upstream_url, "https://api.example.com/v1");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.stream_paths, vec!["/ai/chat", "/ai/campaign"]);
    }

    #[test]
    fn test_empty_api_key_is_unset() {
        let config = GatewayConfig::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[(BIND_ADDR_ENV, "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));

        let err = GatewayConfig::from_lookup(lookup(&[(MAX_BODY_BYTES_ENV, "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBodyLimit { .. }));

        let err = GatewayConfig::from_lookup(lookup(&[(UPSTREAM_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUpstreamUrl { .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = GatewayConfig::default().with_api_key("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env() {
        std::env::set_var(API_KEY_ENV, "env-secret");
        std::env::set_var(UPSTREAM_URL_ENV, "https://upstream.test/api");
        let config = GatewayConfig::from_env().unwrap();
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(UPSTREAM_URL_ENV);

        assert_eq!(config.api_key.as_deref(), Some("env-secret"));
        assert_eq!(config.upstream_url, "https://upstream.test/api");
    }
}
