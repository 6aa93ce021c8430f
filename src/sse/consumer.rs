//! Incremental consumer for relayed event streams.
//!
//! Reads a chunked byte stream, reassembles lines across chunk boundaries,
//! parses each `data:` payload and hands typed messages to a
//! [`StreamObserver`] in arrival order.

use std::fmt::Display;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::buffer::LineBuffer;
use super::events::{SseLine, StreamMessage};
use super::observer::StreamObserver;
use super::parser::{parse_sse_line, parse_stream_message};
use super::schema::StreamSchema;
use crate::error::StreamError;

/// Consumer for one kind of stream.
///
/// The consumer itself holds no per-stream state, so one instance can be
/// reused for any number of sequential or concurrent [`consume`](Self::consume)
/// calls.
#[derive(Debug, Clone, Default)]
pub struct StreamConsumer {
    schema: StreamSchema,
    cancel: Option<CancellationToken>,
}

impl StreamConsumer {
    pub fn new(schema: StreamSchema) -> Self {
        Self {
            schema,
            cancel: None,
        }
    }

    /// Stop reading as soon as `token` is cancelled.
    ///
    /// A cancelled stream drops its reader. Before a terminal message it
    /// also reports [`StreamError::Cancelled`] through `on_abandoned`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn schema(&self) -> &StreamSchema {
        &self.schema
    }

    /// Consume `stream` to end of input.
    ///
    /// Returns the `data` of the first `complete` message. A first `error`
    /// message returns [`StreamError::BackendError`] after it has been
    /// delivered to the observer. Without a terminal message, end of input,
    /// a read error or cancellation calls [`StreamObserver::on_abandoned`]
    /// once and returns the matching error.
    ///
    /// After the first terminal message, non-terminal messages are still
    /// dispatched and later terminal messages are only logged, so chunk
    /// boundaries never change what the observer sees. A read error or
    /// cancellation at that point drops the stream and returns the recorded
    /// outcome.
    pub async fn consume<S, E, O>(
        &self,
        stream: S,
        observer: &mut O,
    ) -> Result<Option<Value>, StreamError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
        O: StreamObserver + ?Sized,
    {
        let mut stream = std::pin::pin!(stream);
        let mut buffer = LineBuffer::new();
        let mut outcome: Option<Result<Option<Value>, StreamError>> = None;

        loop {
            let next = match &self.cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            if let Some(result) = outcome {
                                tracing::debug!("Cancelled after terminal message");
                                return result;
                            }
                            return Err(abandon(observer, StreamError::Cancelled));
                        }
                        item = stream.next() => item,
                    }
                }
                None => stream.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    for line in buffer.push(&chunk) {
                        self.handle_line(&line, observer, &mut outcome);
                    }
                }
                Some(Err(e)) => {
                    if let Some(result) = outcome {
                        tracing::warn!(error = %e, "Stream read failed after terminal message");
                        return result;
                    }
                    let err = StreamError::ConnectionLost {
                        message: e.to_string(),
                    };
                    return Err(abandon(observer, err));
                }
                None => break,
            }
        }

        if let Some(residual) = buffer.into_residual() {
            tracing::debug!(
                bytes = residual.len(),
                "Discarding unterminated line at end of stream"
            );
        }
        match outcome {
            Some(result) => result,
            None => Err(abandon(observer, StreamError::EndedWithoutTerminal)),
        }
    }

    fn handle_line<O>(
        &self,
        line: &str,
        observer: &mut O,
        outcome: &mut Option<Result<Option<Value>, StreamError>>,
    ) where
        O: StreamObserver + ?Sized,
    {
        let data = match parse_sse_line(line) {
            SseLine::Data(data) if !data.is_empty() => data,
            _ => return,
        };

        let message = match parse_stream_message(&data, &self.schema) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(schema = self.schema.name(), error = %e, "Skipping stream line");
                return;
            }
        };

        if !message.is_terminal() {
            observer.on_message(&message);
            return;
        }

        if outcome.is_some() {
            tracing::warn!(
                kind = %message.kind(),
                "Ignoring second terminal message in one stream"
            );
            return;
        }

        observer.on_message(&message);
        *outcome = Some(match message {
            StreamMessage::Complete { data, .. } => Ok(data),
            StreamMessage::Error { message } => Err(StreamError::BackendError { message }),
            _ => Ok(None),
        });
    }
}

fn abandon<O>(observer: &mut O, err: StreamError) -> StreamError
where
    O: StreamObserver + ?Sized,
{
    tracing::warn!(error = %err, "Stream abandoned");
    observer.on_abandoned(&err);
    err
}
