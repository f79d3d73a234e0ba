//! SSE (Server-Sent Events) parser trait abstraction.
//!
//! Provides a trait-based abstraction for SSE parsing, enabling
//! dependency injection and mocking in tests.

use crate::sse::{SseParseError, SseParser, StreamEvent};

/// Trait for SSE (Server-Sent Events) parsing.
///
/// The parser is stateful: it accumulates body chunks until complete
/// frames can be emitted. Frames must be yielded in the order their
/// delimiter appeared in the byte stream.
///
/// # Example
///
/// ```ignore
/// use celine_chat::traits::SseParserTrait;
///
/// fn process_chunk<P: SseParserTrait>(parser: &mut P, chunk: &[u8]) {
///     parser.feed(chunk);
///     while let Some(result) = parser.next_event() {
///         match result {
///             Ok(event) => handle_event(event),
///             Err(e) => eprintln!("Parse error: {}", e),
///         }
///     }
/// }
/// ```
pub trait SseParserTrait: Send {
    /// Feed one chunk of the response body.
    fn feed(&mut self, chunk: &[u8]);

    /// Take the next decoded event, if a complete frame is pending.
    fn next_event(&mut self) -> Option<Result<StreamEvent, SseParseError>>;

    /// Size of the unterminated remainder, discarded if the stream ends now.
    fn buffered_len(&self) -> usize;

    /// Reset the parser state.
    fn reset(&mut self);
}

impl SseParserTrait for SseParser {
    fn feed(&mut self, chunk: &[u8]) {
        SseParser::feed(self, chunk)
    }

    fn next_event(&mut self) -> Option<Result<StreamEvent, SseParseError>> {
        SseParser::next_event(self)
    }

    fn buffered_len(&self) -> usize {
        SseParser::buffered_len(self)
    }

    fn reset(&mut self) {
        SseParser::reset(self)
    }
}
