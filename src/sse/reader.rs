//! Streaming event reader
//!
//! Adapts a chunked response body into a lazy, ordered stream of
//! [`StreamEvent`]s. The body is owned by the returned stream: dropping the
//! stream, whether exhausted or abandoned half way, releases it.

use std::pin::Pin;

use futures::Stream;
use futures_util::stream;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::traits::{ByteStream, SseParserTrait};

use super::events::StreamEvent;
use super::parser::SseParser;

/// Ordered stream of decoded events. Ends after the first error.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, StreamError>> + Send>>;

/// Read events from `body` with the default [`SseParser`].
pub fn read_events(body: ByteStream) -> EventStream {
    read_events_with(body, SseParser::new())
}

/// Read events from `body` using an injected parser.
///
/// A chunk is pulled from `body` only when the parser has no complete
/// frame pending. Once the body ends, an unterminated trailing frame is
/// discarded. A decode failure or a body read failure is yielded once and
/// the stream ends.
pub fn read_events_with<P>(body: ByteStream, parser: P) -> EventStream
where
    P: SseParserTrait + 'static,
{
    let events = stream::try_unfold((body, parser), |(mut body, mut parser)| async move {
        loop {
            if let Some(result) = parser.next_event() {
                return match result {
                    Ok(event) => {
                        debug!(event_type = event.event_type_name(), "SSE event");
                        Ok(Some((event, (body, parser))))
                    }
                    Err(e) => {
                        warn!("Malformed SSE event: {}", e);
                        Err(StreamError::MalformedEvent(e))
                    }
                };
            }

            match body.next().await {
                Some(Ok(chunk)) => parser.feed(&chunk),
                Some(Err(e)) => {
                    warn!("SSE body read failed: {}", e);
                    return Err(StreamError::from(e));
                }
                None => {
                    let leftover = parser.buffered_len();
                    if leftover > 0 {
                        debug!(leftover, "Discarding unterminated SSE frame at end of stream");
                    }
                    return Ok(None);
                }
            }
        }
    });

    Box::pin(events)
}
