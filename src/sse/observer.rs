//! Observer interface for consumed streams.
//!
//! [`StreamObserver`] has a single message entry point. [`StreamCallbacks`] is
//! a dispatch table built on top of it for callers that only care about a few
//! kinds.

use serde_json::Value;

use super::events::StreamMessage;
use crate::error::StreamError;

/// Receives the messages of one stream, in arrival order.
///
/// At most one terminal message (`Complete` or `Error`) is ever delivered.
/// When a stream fails without one, [`on_abandoned`](Self::on_abandoned) is
/// called instead, exactly once.
pub trait StreamObserver: Send {
    fn on_message(&mut self, message: &StreamMessage);

    /// The stream ended, broke or was cancelled before a terminal message.
    fn on_abandoned(&mut self, error: &StreamError) {
        let _ = error;
    }
}

type TextCallback<'a> = Box<dyn FnMut(&str) + Send + 'a>;
type UpdateCallback<'a> = Box<dyn FnMut(&str, bool) + Send + 'a>;
type EventCallback<'a> = Box<dyn FnMut(&str, Option<&str>) + Send + 'a>;
type CompleteCallback<'a> = Box<dyn FnMut(Option<&Value>) + Send + 'a>;

/// Per-kind callback table.
///
/// Abandonment is routed to `on_error` with a user-facing message, so callers
/// reset their state on one path no matter how the stream failed.
///
/// # Example
///
/// ```ignore
/// let mut callbacks = StreamCallbacks::new()
///     .on_progress(|msg| spinner.set_text(msg))
///     .on_complete(|data| open_project(data))
///     .on_error(|msg| toast.error(msg));
/// consumer.consume(body, &mut callbacks).await;
/// ```
#[derive(Default)]
pub struct StreamCallbacks<'a> {
    progress: Option<TextCallback<'a>>,
    content: Option<TextCallback<'a>>,
    update: Option<UpdateCallback<'a>>,
    event: Option<EventCallback<'a>>,
    complete: Option<CompleteCallback<'a>>,
    error: Option<TextCallback<'a>>,
}

impl<'a> StreamCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn on_content(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.content = Some(Box::new(f));
        self
    }

    /// Receives the update text and the `will_modify` flag.
    pub fn on_update(mut self, f: impl FnMut(&str, bool) + Send + 'a) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Receives the event name and its optional message.
    pub fn on_event(mut self, f: impl FnMut(&str, Option<&str>) + Send + 'a) -> Self {
        self.event = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(Option<&Value>) + Send + 'a) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl StreamObserver for StreamCallbacks<'_> {
    fn on_message(&mut self, message: &StreamMessage) {
        match message {
            StreamMessage::Progress { message, .. } => {
                if let Some(f) = self.progress.as_mut() {
                    f(message);
                }
            }
            StreamMessage::Content { content } => {
                if let Some(f) = self.content.as_mut() {
                    f(content);
                }
            }
            StreamMessage::Update {
                message,
                will_modify,
            } => {
                if let Some(f) = self.update.as_mut() {
                    f(message, *will_modify);
                }
            }
            StreamMessage::Event { name, message, .. } => {
                if let Some(f) = self.event.as_mut() {
                    f(name, message.as_deref());
                }
            }
            StreamMessage::Complete { data, .. } => {
                if let Some(f) = self.complete.as_mut() {
                    f(data.as_ref());
                }
            }
            StreamMessage::Error { message } => {
                if let Some(f) = self.error.as_mut() {
                    f(message);
                }
            }
        }
    }

    fn on_abandoned(&mut self, error: &StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(&error.user_message());
        }
    }
}
