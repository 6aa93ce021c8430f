//! Per-endpoint message schemas.
//!
//! Each streaming endpoint declares which `status` values it may send. A line
//! carrying any other status is treated like malformed input.

use super::events::MessageKind;

/// Declared set of message kinds for one streaming endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSchema {
    name: &'static str,
    kinds: &'static [MessageKind],
}

impl StreamSchema {
    pub const fn new(name: &'static str, kinds: &'static [MessageKind]) -> Self {
        Self { name, kinds }
    }

    /// `/ai/brief-analysis`: progress notes, then the created project.
    pub const fn brief_analysis() -> Self {
        Self::new(
            "brief-analysis",
            &[
                MessageKind::Progress,
                MessageKind::Complete,
                MessageKind::Error,
            ],
        )
    }

    /// Chat replies: streamed content, updates and named events.
    pub const fn chat() -> Self {
        Self::new(
            "chat",
            &[
                MessageKind::Content,
                MessageKind::Update,
                MessageKind::Event,
                MessageKind::Complete,
                MessageKind::Error,
            ],
        )
    }

    pub const fn any() -> Self {
        Self::new("any", &MessageKind::ALL)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kinds(&self) -> &'static [MessageKind] {
        self.kinds
    }

    pub fn allows(&self, kind: MessageKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl Default for StreamSchema {
    fn default() -> Self {
        Self::any()
    }
}
