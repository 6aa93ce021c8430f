//! Relayed event-stream consumer
//!
//! Reads the newline-delimited `data: <json>` records produced by streaming
//! endpoints and dispatches them as typed messages.
//! Record format:
//! - `data: <json>` - message payload, a JSON object with a `status` field
//! - `event: <type>` - accepted and ignored
//! - Empty line - record separator
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Message types (StreamMessage, MessageKind, SseLine, SseParseError)
//! - `schema` - Per-endpoint declared message kinds
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Line and payload parsing
//! - `buffer` - UTF-8 reassembly and line splitting across chunks
//! - `observer` - Observer trait and callback dispatch table
//! - `consumer` - The read loop tying the above together

mod buffer;
mod consumer;
mod events;
mod observer;
mod parser;
mod payloads;
mod schema;

pub use buffer::LineBuffer;
pub use consumer::StreamConsumer;
pub use events::{MessageKind, SseLine, SseParseError, StreamMessage};
pub use observer::{StreamCallbacks, StreamObserver};
pub use parser::{parse_sse_line, parse_stream_message, UNSPECIFIED_ERROR};
pub use schema::StreamSchema;
