//! Minimal SSE framing for the Gemini event stream.

/// Upper bound on buffered bytes between event boundaries. A well-formed
/// stream stays far below this; hitting it means the stream is broken.
const MAX_BUFFER_BYTES: usize = 4 * 1024 * 1024;

/// The buffer grew past [`MAX_BUFFER_BYTES`] without an event boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferOverflow;

/// Accumulates raw bytes and yields complete SSE events.
///
/// Events are delimited by a blank line (`\n\n` or `\r\n\r\n`); bytes after
/// the last boundary stay buffered until more arrive.
#[derive(Default)]
pub(crate) struct EventBuffer {
    buffer: Vec<u8>,
}

impl EventBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a chunk from the wire.
    pub(crate) fn extend(&mut self, chunk: &[u8]) -> Result<(), BufferOverflow> {
        if self.buffer.len().saturating_add(chunk.len()) > MAX_BUFFER_BYTES {
            return Err(BufferOverflow);
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    /// Drain the next complete event, if one is buffered.
    pub(crate) fn next_event(&mut self) -> Option<Vec<u8>> {
        let (pos, delim_len) = self.boundary()?;
        let event = self.buffer[..pos].to_vec();
        self.buffer.drain(..pos + delim_len);
        Some(event)
    }

    fn boundary(&self) -> Option<(usize, usize)> {
        let lf = self.buffer.windows(2).position(|w| w == b"\n\n");
        let crlf = self.buffer.windows(4).position(|w| w == b"\r\n\r\n");
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(if a <= b { (a, 2) } else { (b, 4) }),
            (Some(a), None) => Some((a, 2)),
            (None, Some(b)) => Some((b, 4)),
            (None, None) => None,
        }
    }
}

/// Extract the joined `data:` payload of one event, if any.
pub(crate) fn event_data(event: &[u8]) -> Option<String> {
    let event = String::from_utf8_lossy(event);
    let mut data = String::new();
    let mut found = false;

    for line in event.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(rest) = line.strip_prefix("data:") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            if found {
                data.push('\n');
            }
            data.push_str(rest);
            found = true;
        }
    }

    found.then_some(data)
}
