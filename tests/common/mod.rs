//! Common test utilities for integration tests.
//!
//! Frame builders for the `/chat` event stream and helpers that turn a
//! byte payload into a body stream split at arbitrary positions.

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use celine_chat::models::SourceChunk;
use celine_chat::sse::{ChatMeta, StreamEvent};

/// `data: ` frame for an arbitrary JSON payload.
pub fn frame(json: &str) -> String {
    format!("data: {}\n\n", json)
}

pub fn meta_event(conversation_id: &str) -> StreamEvent {
    StreamEvent::Meta(ChatMeta {
        conversation_id: Some(conversation_id.to_string()),
    })
}

pub fn token_event(text: &str) -> StreamEvent {
    StreamEvent::Token(text.to_string())
}

pub fn test_source() -> SourceChunk {
    SourceChunk {
        source: "s3://docs/regulation.pdf".to_string(),
        title: Some("Building regulation".to_string()),
        text: "Minimum ceiling height is 2.5 m.".to_string(),
        score: Some(0.87),
    }
}

/// A complete reply: meta, tokens, sources, done.
pub fn reply_events(conversation_id: &str, tokens: &[&str]) -> Vec<StreamEvent> {
    let mut events = vec![meta_event(conversation_id)];
    events.extend(tokens.iter().map(|t| token_event(t)));
    events.push(StreamEvent::Sources(vec![test_source()]));
    events.push(StreamEvent::Done);
    events
}

/// Wire form of `events`, one frame each.
pub fn encode(events: &[StreamEvent]) -> String {
    events.iter().map(StreamEvent::to_frame).collect()
}
