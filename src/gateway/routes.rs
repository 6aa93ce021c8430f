//! Virtual path routing table.
//!
//! Decides per virtual path how the upstream response is relayed. Paths not
//! in the table are relayed in buffered JSON mode.

use std::collections::HashMap;

use axum::http::Method;

/// Virtual path of the brief analysis endpoint.
pub const BRIEF_ANALYSIS_PATH: &str = "/ai/brief-analysis";

/// How the upstream response body is relayed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMode {
    /// Read the whole body, parse it as JSON and re-emit it.
    Buffered,
    /// Pipe body chunks to the caller as they arrive.
    Streaming,
}

impl ForwardMode {
    /// Response content type for this mode.
    pub fn content_type(&self) -> &'static str {
        match self {
            ForwardMode::Buffered => "application/json",
            ForwardMode::Streaming => "text/event-stream",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForwardMode::Buffered => "buffered",
            ForwardMode::Streaming => "streaming",
        }
    }
}

impl std::fmt::Display for ForwardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A routing entry: `mode` applies only to requests using `method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub mode: ForwardMode,
    pub method: Method,
}

impl Route {
    pub fn streaming(method: Method) -> Self {
        Self {
            mode: ForwardMode::Streaming,
            method,
        }
    }
}

/// Map from normalized virtual path to its [`Route`].
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl Default for RouteTable {
    /// The brief analysis endpoint streams on `POST`.
    fn default() -> Self {
        Self::empty().with_route(BRIEF_ANALYSIS_PATH, Route::streaming(Method::POST))
    }
}

impl RouteTable {
    /// A table that relays everything in buffered mode.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn with_route(mut self, path: &str, route: Route) -> Self {
        self.routes.insert(normalize(path), route);
        self
    }

    /// Add a path that streams on `POST`.
    pub fn with_streaming_path(self, path: &str) -> Self {
        self.with_route(path, Route::streaming(Method::POST))
    }

    pub fn get(&self, path: &str) -> Option<&Route> {
        self.routes.get(&normalize(path))
    }

    /// Forwarding mode for a request.
    ///
    /// A routed path whose method does not match falls back to buffered mode.
    pub fn mode_for(&self, path: &str, method: &Method) -> ForwardMode {
        match self.get(path) {
            Some(route) if route.method == *method => route.mode,
            _ => ForwardMode::Buffered,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Leading slash added, trailing slashes removed.
fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_streams_brief_analysis_on_post() {
        let table = RouteTable::default();
        assert_eq!(
            table.mode_for("/ai/brief-analysis", &Method::POST),
            ForwardMode::Streaming
        );
        assert_eq!(
            table.mode_for("ai/brief-analysis/", &Method::POST),
            ForwardMode::Streaming
        );
    }

    #[test]
    fn test_method_mismatch_falls_back_to_buffered() {
        let table = RouteTable::default();
        assert_eq!(
            table.mode_for("/ai/brief-analysis", &Method::GET),
            ForwardMode::Buffered
        );
    }

    #[test]
    fn test_unknown_path_is_buffered() {
        let table = RouteTable::default();
        assert_eq!(table.mode_for("/projects", &Method::POST), ForwardMode::Buffered);
        assert!(table.get("/projects").is_none());
    }

    #[test]
    fn test_extra_streaming_paths() {
        let table = RouteTable::default().with_streaming_path("/chat/stream");
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.mode_for("/chat/stream", &Method::POST),
            ForwardMode::Streaming
        );
    }

    #[test]
    fn test_empty_table() {
        let table = RouteTable::empty();
        assert!(table.is_empty());
        assert_eq!(
            table.mode_for("/ai/brief-analysis", &Method::POST),
            ForwardMode::Buffered
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ForwardMode::Buffered.content_type(), "application/json");
        assert_eq!(ForwardMode::Streaming.content_type(), "text/event-stream");
    }
}
