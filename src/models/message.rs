use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SourceChunk;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message as held in client-side conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    /// Raw text; for assistant replies this is the markdown accumulated so far
    pub content: String,
    /// Sources cited for an assistant reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceChunk>>,
    /// Attachment ids sent along with a user message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    /// Sanitized markup produced by the renderer from `content`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
    /// Whether tokens are still being appended to this message
    #[serde(default)]
    pub is_streaming: bool,
}

impl ChatMessage {
    /// A user message, with attachments only when some were sent.
    pub fn user(content: impl Into<String>, attachment_ids: Vec<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            sources: None,
            attachments: if attachment_ids.is_empty() {
                None
            } else {
                Some(attachment_ids)
            },
            rendered: None,
            is_streaming: false,
        }
    }

    /// An empty assistant message that tokens will be appended to.
    pub fn assistant_placeholder() -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            sources: None,
            attachments: None,
            rendered: None,
            is_streaming: true,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

impl From<HistoryMessage> for ChatMessage {
    fn from(msg: HistoryMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content,
            sources: None,
            attachments: None,
            rendered: None,
            is_streaming: false,
        }
    }
}

/// A stored message as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
    /// Unix timestamp in seconds
    pub created_at: i64,
}

impl HistoryMessage {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}
