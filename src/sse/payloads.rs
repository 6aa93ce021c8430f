//! Stream payload deserialization structs.
//!
//! Backends fill different fields depending on the endpoint, so every field
//! except `status` is optional here and the parser decides what each kind needs.

use serde::Deserialize;
use serde_json::Value;

/// Raw JSON object carried after the `data:` prefix.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessagePayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Content under its other key; `content` wins when both are present
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub will_modify: Option<bool>,
    #[serde(default)]
    pub event: Option<String>,
    /// Event tag sent by some endpoints instead of `event`
    #[serde(default)]
    pub name: Option<String>,
}
