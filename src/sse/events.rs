//! Stream message types and definitions.
//!
//! A [`StreamMessage`] is built from one `data:` line and lives only until its
//! observer callback returns.

use serde_json::Value;

/// The closed vocabulary of `status` values carried by stream messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Progress,
    Content,
    Update,
    Event,
    Complete,
    Error,
}

impl MessageKind {
    pub const ALL: [MessageKind; 6] = [
        MessageKind::Progress,
        MessageKind::Content,
        MessageKind::Update,
        MessageKind::Event,
        MessageKind::Complete,
        MessageKind::Error,
    ];

    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "progress" => Some(MessageKind::Progress),
            "content" => Some(MessageKind::Content),
            "update" => Some(MessageKind::Update),
            "event" => Some(MessageKind::Event),
            "complete" => Some(MessageKind::Complete),
            "error" => Some(MessageKind::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Progress => "progress",
            MessageKind::Content => "content",
            MessageKind::Update => "update",
            MessageKind::Event => "event",
            MessageKind::Complete => "complete",
            MessageKind::Error => "error",
        }
    }

    /// `complete` and `error` end a stream's logical lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageKind::Complete | MessageKind::Error)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed message parsed from one event-stream line.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Human-readable progress note
    Progress {
        message: String,
        will_modify: bool,
    },
    /// Partial payload text
    Content { content: String },
    /// Status update, optionally flagging a long-running mutation
    Update {
        message: String,
        will_modify: bool,
    },
    /// Named side-channel event
    Event {
        name: String,
        message: Option<String>,
        data: Option<Value>,
    },
    /// Terminal success
    Complete {
        data: Option<Value>,
        message: Option<String>,
    },
    /// Terminal failure reported by the backend
    Error { message: String },
}

impl StreamMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            StreamMessage::Progress { .. } => MessageKind::Progress,
            StreamMessage::Content { .. } => MessageKind::Content,
            StreamMessage::Update { .. } => MessageKind::Update,
            StreamMessage::Event { .. } => MessageKind::Event,
            StreamMessage::Complete { .. } => MessageKind::Complete,
            StreamMessage::Error { .. } => MessageKind::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }
}

/// Represents a parsed event-stream line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: progress")
    Event(String),
    /// Data payload (e.g., "data: {\"status\": \"progress\"}")
    Data(String),
    /// Empty line - separates events
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
}

/// Why one `data:` line could not become a [`StreamMessage`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SseParseError {
    #[error("Invalid JSON in stream event: {0}")]
    InvalidJson(String),

    #[error("Stream event has no status")]
    MissingStatus,

    #[error("Unknown stream status: {0}")]
    UnknownStatus(String),

    /// The status is known but not declared by this endpoint's schema.
    #[error("Status '{status}' is not declared for {schema} streams")]
    UndeclaredStatus { status: String, schema: &'static str },
}
