//! SSE frame parsing logic
//!
//! Contains the stateful `SseParser` that turns raw body chunks into
//! complete frames and decodes each frame's payload.

mod utf8;

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::sse::events::{SseParseError, StreamEvent, DATA_PREFIX, FRAME_DELIMITER};
use crate::sse::payloads::parse_event_payload;

use utf8::Utf8Decoder;

/// Return the payload of the first line in `frame` starting with `data: `.
///
/// Frames without such a line carry no event.
pub fn extract_data_payload(frame: &str) -> Option<&str> {
    frame
        .split('\n')
        .find_map(|line| line.strip_prefix(DATA_PREFIX))
}

/// Stateful SSE parser.
///
/// Bytes go in through [`SseParser::feed`] in chunks of any size; complete
/// frames are queued in arrival order and decoded on demand by
/// [`SseParser::next_event`]. Text after the last delimiter stays buffered
/// until more bytes arrive.
#[derive(Debug, Default)]
pub struct SseParser {
    decoder: Utf8Decoder,
    /// Decoded text not yet terminated by a frame delimiter
    buffer: String,
    /// Complete frames waiting to be decoded
    frames: VecDeque<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the response body.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.decoder.decode_into(chunk, &mut self.buffer);

        while let Some(pos) = self.buffer.find(FRAME_DELIMITER) {
            let rest = self.buffer.split_off(pos + FRAME_DELIMITER.len());
            let mut frame = std::mem::replace(&mut self.buffer, rest);
            frame.truncate(pos);
            trace!(len = frame.len(), "SSE frame complete");
            self.frames.push_back(frame);
        }
    }

    /// Decode the next complete frame that carries a payload.
    ///
    /// Returns:
    /// - `None` - no complete frame is pending
    /// - `Some(Ok(event))` - the next event in arrival order
    /// - `Some(Err(error))` - the frame's payload could not be decoded
    pub fn next_event(&mut self) -> Option<Result<StreamEvent, SseParseError>> {
        while let Some(frame) = self.frames.pop_front() {
            match extract_data_payload(&frame) {
                Some(payload) => return Some(parse_event_payload(payload)),
                None => debug!("Skipping SSE frame without data line"),
            }
        }
        None
    }

    /// Whether a complete frame is queued
    pub fn has_pending_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Bytes and characters held back from an unterminated frame
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.decoder.pending_len()
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.buffer.clear();
        self.frames.clear();
    }
}
