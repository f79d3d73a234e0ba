//! SSE event types
//!
//! `StreamEvent` is decoded once at the parse boundary; consumers match on
//! the variant instead of probing loosely-typed JSON.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::models::SourceChunk;

use super::payloads::RawEvent;

/// Frame separator on the wire
pub const FRAME_DELIMITER: &str = "\n\n";

/// Prefix of the line that carries the JSON payload
pub const DATA_PREFIX: &str = "data: ";

/// Metadata sent at the start of every reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Typed events from the `/chat` stream.
///
/// Wire shape is `{"type": "<kind>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Conversation metadata
    Meta(ChatMeta),
    /// Text fragment of the assistant reply
    Token(String),
    /// Retrieved sources cited by the reply, in ranking order
    Sources(Vec<SourceChunk>),
    /// Error reported by the backend mid-stream
    Error(String),
    /// Reply complete
    Done,
    /// Event type this client does not know about, passed through as-is
    Unknown {
        event_type: String,
        data: serde_json::Value,
    },
}

impl StreamEvent {
    /// Get the wire name of this event's type
    pub fn event_type_name(&self) -> &str {
        match self {
            StreamEvent::Meta(_) => "meta",
            StreamEvent::Token(_) => "token",
            StreamEvent::Sources(_) => "sources",
            StreamEvent::Error(_) => "error",
            StreamEvent::Done => "done",
            StreamEvent::Unknown { event_type, .. } => event_type,
        }
    }

    /// Encode as one complete SSE frame: `data: <json>\n\n`
    pub fn to_frame(&self) -> String {
        // Serializing a tree of strings, vectors and JSON values cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{DATA_PREFIX}{json}{FRAME_DELIMITER}")
    }
}

impl Serialize for StreamEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StreamEvent", 2)?;
        state.serialize_field("type", self.event_type_name())?;
        match self {
            StreamEvent::Meta(meta) => state.serialize_field("data", meta)?,
            StreamEvent::Token(text) | StreamEvent::Error(text) => {
                state.serialize_field("data", text)?
            }
            StreamEvent::Sources(sources) => state.serialize_field("data", sources)?,
            StreamEvent::Done => state.serialize_field("data", &serde_json::Value::Null)?,
            StreamEvent::Unknown { data, .. } => state.serialize_field("data", data)?,
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for StreamEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEvent::deserialize(deserializer)?;
        raw.into_event().map_err(serde::de::Error::custom)
    }
}

/// Errors decoding a frame's payload into a `StreamEvent`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseParseError {
    /// Payload is not valid JSON, or not a JSON object
    #[error("Invalid JSON in event payload: {reason}")]
    InvalidJson { reason: String },

    /// Payload object has no string `type` field
    #[error("Event payload has no type")]
    MissingType,

    /// `data` does not have the shape required by a known event type
    #[error("Invalid data for event '{event_type}': {reason}")]
    InvalidPayload { event_type: String, reason: String },
}
