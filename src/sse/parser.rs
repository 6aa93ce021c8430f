//! Event-stream line parsing.
//!
//! Turns one complete line into an [`SseLine`], and the payload of a `data:`
//! line into a schema-checked [`StreamMessage`].

use super::events::{MessageKind, SseLine, SseParseError, StreamMessage};
use super::payloads::MessagePayload;
use super::schema::StreamSchema;

/// Fallback text for an `error` message that carries none.
pub const UNSPECIFIED_ERROR: &str = "The server reported an error";

/// Parse a single event-stream line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    // Unknown line format - treat as comment
    SseLine::Comment(line.to_string())
}

/// Parse the JSON payload of a `data:` line against an endpoint schema.
pub fn parse_stream_message(
    data: &str,
    schema: &StreamSchema,
) -> Result<StreamMessage, SseParseError> {
    let payload: MessagePayload =
        serde_json::from_str(data).map_err(|e| SseParseError::InvalidJson(e.to_string()))?;

    let status = payload.status.ok_or(SseParseError::MissingStatus)?;
    let kind =
        MessageKind::parse(&status).ok_or_else(|| SseParseError::UnknownStatus(status.clone()))?;
    if !schema.allows(kind) {
        return Err(SseParseError::UndeclaredStatus {
            status,
            schema: schema.name(),
        });
    }

    let will_modify = payload.will_modify.unwrap_or(false);
    let message = match kind {
        MessageKind::Progress => StreamMessage::Progress {
            message: payload.message.unwrap_or_default(),
            will_modify,
        },
        MessageKind::Content => StreamMessage::Content {
            content: payload
                .content
                .or(payload.text)
                .or(payload.message)
                .unwrap_or_default(),
        },
        MessageKind::Update => StreamMessage::Update {
            message: payload
                .message
                .or(payload.content)
                .or(payload.text)
                .unwrap_or_default(),
            will_modify,
        },
        MessageKind::Event => StreamMessage::Event {
            name: payload.event.or(payload.name).unwrap_or_default(),
            message: payload.message,
            data: payload.data,
        },
        MessageKind::Complete => StreamMessage::Complete {
            data: payload.data,
            message: payload.message,
        },
        MessageKind::Error => StreamMessage::Error {
            message: payload
                .message
                .or(payload.content)
                .or(payload.text)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNSPECIFIED_ERROR.to_string()),
        },
    };
    Ok(message)
}
