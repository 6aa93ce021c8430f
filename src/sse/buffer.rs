//! Incremental UTF-8 decoding and line splitting.
//!
//! Chunks may split both lines and multi-byte characters. [`LineBuffer`] keeps
//! the undecoded tail bytes and the text after the last newline between pushes,
//! and hands back only complete lines.

/// Partial-line buffer owned by one stream.
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Leading bytes of a UTF-8 sequence cut off by the chunk boundary
    pending: Vec<u8>,
    /// Decoded text after the last newline
    partial: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, without terminators.
    ///
    /// `\r\n` and `\n` both end a line. Invalid UTF-8 decodes to U+FFFD.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let Some(last_newline) = self.partial.rfind('\n') else {
            return Vec::new();
        };
        let tail = self.partial.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.partial, tail);

        complete[..last_newline]
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.partial.is_empty()
    }

    /// Consume the buffer, returning whatever never became a complete line.
    pub fn into_residual(self) -> Option<String> {
        let mut residual = self.partial;
        if !self.pending.is_empty() {
            residual.push_str(&String::from_utf8_lossy(&self.pending));
        }
        (!residual.is_empty()).then_some(residual)
    }

    fn decode(&mut self, chunk: &[u8]) {
        let mut joined = std::mem::take(&mut self.pending);
        let input: &[u8] = if joined.is_empty() {
            chunk
        } else {
            joined.extend_from_slice(chunk);
            &joined
        };

        let mut rest = input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.partial.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.partial
                        .push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            self.partial.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + invalid..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for the next chunk.
                            self.pending = rest[valid..].to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}
