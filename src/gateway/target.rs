//! Upstream URL resolution.
//!
//! A virtual path is appended to the fixed upstream base, and every query
//! parameter except `path` is copied onto the result in its original order.

use reqwest::Url;

use crate::error::GatewayError;

/// Query parameter naming the virtual upstream path.
pub const PATH_PARAM: &str = "path";

/// Normalize a raw `path` parameter.
///
/// Adds a missing leading `/`. Rejects empty paths and any `..` segment.
pub fn normalize_virtual_path(raw: &str) -> Result<String, GatewayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::MissingPath);
    }

    let path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    let route = path.split(['?', '#']).next().unwrap_or(&path);
    if route.split('/').any(|segment| segment == "..") {
        return Err(GatewayError::InvalidPath(raw.to_string()));
    }
    Ok(path)
}

/// The upstream base URL every virtual path is resolved against.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    /// Base URL without a trailing slash
    base: String,
    /// Path component of the base, used to confirm a resolved URL stays below it
    base_path: String,
}

impl UpstreamTarget {
    pub fn new(base: &str) -> Result<Self, GatewayError> {
        let base = base.trim().trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base).map_err(|e| GatewayError::InvalidTarget(format!("{base}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidTarget(base));
        }
        let base_path = parsed.path().trim_end_matches('/').to_string();
        Ok(Self { base, base_path })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Build the upstream URL for a normalized virtual path.
    ///
    /// `query` is the caller's full query string as decoded pairs; the `path`
    /// pair is skipped and the rest are appended in order. Every failure here
    /// is blamed on the caller's path: the base was validated in [`Self::new`].
    pub fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url, GatewayError> {
        let mut url = self.join(path)?;

        // The URL parser resolves dot segments, including percent-encoded ones.
        if !self.contains(url.path()) {
            return Err(GatewayError::InvalidPath(path.to_string()));
        }

        let mut forwarded = query.iter().filter(|(key, _)| key != PATH_PARAM).peekable();
        if forwarded.peek().is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in forwarded {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url, GatewayError> {
        let joined = format!("{}/{}", self.base, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| {
            tracing::debug!(path, error = %e, "Virtual path does not form a URL");
            GatewayError::InvalidPath(path.to_string())
        })
    }

    fn contains(&self, resolved_path: &str) -> bool {
        match resolved_path.strip_prefix(self.base_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_adds_leading_slash() {
        assert_eq!(normalize_virtual_path("projects").unwrap(), "/projects");
        assert_eq!(normalize_virtual_path("/projects").unwrap(), "/projects");
    }

    #[test]
    fn test_normalize_rejects_empty_and_parent_segments() {
        assert!(matches!(
            normalize_virtual_path("  "),
            Err(GatewayError::MissingPath)
        ));
        assert!(matches!(
            normalize_virtual_path("/../admin"),
            Err(GatewayError::InvalidPath(_))
        ));
        assert!(matches!(
            normalize_virtual_path("/projects/../../secrets"),
            Err(GatewayError::InvalidPath(_))
        ));
        // ".." inside a segment name is fine
        assert!(normalize_virtual_path("/files/a..b").is_ok());
    }

    #[test]
    fn test_resolve_joins_base_and_path() {
        let target = UpstreamTarget::new("https://api.example.com/api/v1/").unwrap();
        let url = target.resolve("/projects", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/projects");
    }

    #[test]
    fn test_resolve_preserves_non_path_query_in_order() {
        let target = UpstreamTarget::new("http://upstream:8000/api/v1").unwrap();
        let query = pairs(&[
            ("path", "/projects"),
            ("user_id", "u1"),
            ("limit", "10"),
            ("tag", "a"),
            ("tag", "b"),
        ]);
        let url = target.resolve("/projects", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://upstream:8000/api/v1/projects?user_id=u1&limit=10&tag=a&tag=b"
        );
    }

    #[test]
    fn test_resolve_encodes_query_values() {
        let target = UpstreamTarget::new("http://upstream/api").unwrap();
        let query = pairs(&[("path", "/search"), ("q", "a&b=c")]);
        let url = target.resolve("/search", &query).unwrap();
        let decoded: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(decoded, pairs(&[("q", "a&b=c")]));
    }

    #[test]
    fn test_resolve_rejects_encoded_parent_segments() {
        let target = UpstreamTarget::new("http://upstream/api/v1").unwrap();
        assert!(matches!(
            target.resolve("/%2e%2e/%2e%2e/admin", &[]),
            Err(GatewayError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_hostile_paths_are_client_errors() {
        let target = UpstreamTarget::new("http://upstream/api/v1").unwrap();
        for path in ["/..\\..\\admin", "/%2e%2e/admin", "/.%2E/.%2e/admin", "/x/%2e%2e/%2e%2e/%2e%2e"] {
            let err = target.resolve(path, &[]).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidPath(_)), "{path}: {err:?}");
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST, "{path}");
        }
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(matches!(
            UpstreamTarget::new("not a url"),
            Err(GatewayError::InvalidTarget(_))
        ));
    }
}
