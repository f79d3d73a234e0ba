//! SSE (Server-Sent Events) stream reader
//!
//! Parses the `text/event-stream` body of `POST /chat`. The backend
//! writes one JSON document per frame:
//! - `data: {"type": "...", "data": ...}` - payload line
//! - Blank line (`\n\n`) - ends the frame
//!
//! Frames without a `data: ` line are ignored.
//!
//! # Module structure
//! - `events` - Event type definitions (StreamEvent, ChatMeta, SseParseError)
//! - `payloads` - Payload decoding into typed events
//! - `parser` - Frame assembly (SseParser, extract_data_payload)
//! - `reader` - Body stream to event stream adapter (read_events)

mod events;
mod parser;
mod payloads;
mod reader;

// Re-export public types
pub use events::{ChatMeta, SseParseError, StreamEvent, DATA_PREFIX, FRAME_DELIMITER};
pub use parser::{extract_data_payload, SseParser};
pub use payloads::parse_event_payload;
pub use reader::{read_events, read_events_with, EventStream};
