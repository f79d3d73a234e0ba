//! SSE payload deserialization structs
//!
//! The wire payload is decoded in two steps: first into `RawEvent` to read
//! the `type` tag, then `data` into the shape that tag requires.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::events::{ChatMeta, SseParseError, StreamEvent};

/// Envelope of every event: `{"type": ..., "data": ...}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl RawEvent {
    pub(crate) fn into_event(self) -> Result<StreamEvent, SseParseError> {
        let RawEvent { event_type, data } = self;
        match event_type.as_str() {
            "meta" => decode_data::<ChatMeta>(&event_type, data).map(StreamEvent::Meta),
            "token" => decode_data(&event_type, data).map(StreamEvent::Token),
            "sources" => decode_data(&event_type, data).map(StreamEvent::Sources),
            "error" => decode_data(&event_type, data).map(StreamEvent::Error),
            "done" => Ok(StreamEvent::Done),
            _ => Ok(StreamEvent::Unknown { event_type, data }),
        }
    }
}

fn decode_data<T: DeserializeOwned>(event_type: &str, data: Value) -> Result<T, SseParseError> {
    serde_json::from_value(data).map_err(|e| SseParseError::InvalidPayload {
        event_type: event_type.to_string(),
        reason: e.to_string(),
    })
}

/// Decode one frame's JSON payload into a typed event
pub fn parse_event_payload(payload: &str) -> Result<StreamEvent, SseParseError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| SseParseError::InvalidJson {
        reason: e.to_string(),
    })?;

    let Value::Object(mut object) = value else {
        return Err(SseParseError::InvalidJson {
            reason: "payload is not a JSON object".to_string(),
        });
    };

    let event_type = match object.remove("type") {
        Some(Value::String(t)) => t,
        _ => return Err(SseParseError::MissingType),
    };
    let data = object.remove("data").unwrap_or(Value::Null);

    RawEvent { event_type, data }.into_event()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_meta() {
        let event = parse_event_payload(r#"{"type":"meta","data":{"conversation_id":"c1"}}"#)
            .unwrap();
        assert_eq!(
            event,
            StreamEvent::Meta(ChatMeta {
                conversation_id: Some("c1".to_string())
            })
        );
    }

    #[test]
    fn test_parse_meta_without_conversation_id() {
        let event = parse_event_payload(r#"{"type":"meta","data":{}}"#).unwrap();
        assert_eq!(event, StreamEvent::Meta(ChatMeta::default()));
    }

    #[test]
    fn test_parse_sources() {
        let event = parse_event_payload(
            r#"{"type":"sources","data":[{"source":"a","text":"x","score":0.5},{"source":"b","title":"B","text":"y"}]}"#,
        )
        .unwrap();
        match event {
            StreamEvent::Sources(sources) => {
                assert_eq!(sources.len(), 2);
                assert_eq!(sources[0].score, Some(0.5));
                assert_eq!(sources[1].title.as_deref(), Some("B"));
            }
            other => panic!("Expected Sources event, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_done_with_null_data() {
        assert_eq!(
            parse_event_payload(r#"{"type":"done","data":null}"#).unwrap(),
            StreamEvent::Done
        );
        assert_eq!(
            parse_event_payload(r#"{"type":"done"}"#).unwrap(),
            StreamEvent::Done
        );
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let event = parse_event_payload(r#"{"type":"usage","data":{"tokens":12}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Unknown {
                event_type: "usage".to_string(),
                data: json!({"tokens": 12}),
            }
        );
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_event_payload("{not json}");
        assert!(matches!(result, Err(SseParseError::InvalidJson { .. })));
    }

    #[test]
    fn test_non_object_payload() {
        let result = parse_event_payload("[1,2]");
        assert!(matches!(result, Err(SseParseError::InvalidJson { .. })));
    }

    #[test]
    fn test_missing_type() {
        assert_eq!(
            parse_event_payload(r#"{"data":"x"}"#),
            Err(SseParseError::MissingType)
        );
        assert_eq!(
            parse_event_payload(r#"{"type":7,"data":"x"}"#),
            Err(SseParseError::MissingType)
        );
    }

    #[test]
    fn test_wrong_shape_for_known_type() {
        let result = parse_event_payload(r#"{"type":"token","data":{"token":"x"}}"#);
        match result {
            Err(SseParseError::InvalidPayload { event_type, .. }) => {
                assert_eq!(event_type, "token")
            }
            other => panic!("Expected InvalidPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_carriage_return_is_whitespace() {
        let event = parse_event_payload("{\"type\":\"token\",\"data\":\"a\"}\r").unwrap();
        assert_eq!(event, StreamEvent::Token("a".to_string()));
    }
}
