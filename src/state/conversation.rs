//! Conversation state and event folding
//!
//! [`ConversationState`] is the caller-owned view of one conversation.
//! Stream events are folded into the last streaming assistant message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, ConversationMessages, MessageRole};
use crate::sse::StreamEvent;
use crate::traits::Renderer;

/// What to do with a partially streamed reply when the backend reports an
/// error part way through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialReplyPolicy {
    /// Keep the partial reply if it has any non-blank content
    #[default]
    Retain,
    /// Always remove the partial reply
    Discard,
}

impl FromStr for PartialReplyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" | "keep" => Ok(PartialReplyPolicy::Retain),
            "discard" | "drop" => Ok(PartialReplyPolicy::Discard),
            other => Err(format!("unknown partial reply policy '{}'", other)),
        }
    }
}

impl fmt::Display for PartialReplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialReplyPolicy::Retain => write!(f, "retain"),
            PartialReplyPolicy::Discard => write!(f, "discard"),
        }
    }
}

/// Result of folding one event into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The reply is still streaming
    Continue,
    /// The backend marked the reply complete
    Finished,
    /// The backend reported an application error
    Failed,
    /// The event carried nothing this state tracks
    Ignored,
}

/// Client-side state of one conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    /// Backend id; None until the first `meta` event of a new conversation
    pub conversation_id: Option<String>,
    /// Messages in display order
    pub messages: Vec<ChatMessage>,
    /// Error banner text
    pub error: Option<String>,
    /// Whether an exchange is in flight
    pub is_streaming: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state that continues an existing conversation.
    pub fn with_conversation(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            ..Self::default()
        }
    }

    /// State rebuilt from stored history.
    pub fn from_history(history: ConversationMessages) -> Self {
        Self {
            conversation_id: Some(history.conversation_id),
            messages: history.messages.into_iter().map(ChatMessage::from).collect(),
            error: None,
            is_streaming: false,
        }
    }

    /// Optimistic update for a new exchange: the user's message plus an
    /// empty assistant reply that tokens will be appended to.
    pub fn begin_exchange(&mut self, text: impl Into<String>, attachment_ids: Vec<String>) {
        self.error = None;
        self.messages.push(ChatMessage::user(text, attachment_ids));
        self.messages.push(ChatMessage::assistant_placeholder());
        self.is_streaming = true;
    }

    /// The assistant message currently receiving tokens.
    pub fn streaming_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_streaming && m.is_assistant())
    }

    pub fn streaming_message_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.is_streaming && m.is_assistant())
    }

    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Fold one event into the state.
    pub fn apply_event(&mut self, event: &StreamEvent) -> EventOutcome {
        match event {
            StreamEvent::Meta(meta) => {
                if let Some(id) = &meta.conversation_id {
                    self.conversation_id = Some(id.clone());
                }
                EventOutcome::Continue
            }
            StreamEvent::Token(token) => match self.streaming_message_mut() {
                Some(msg) => {
                    msg.content.push_str(token);
                    EventOutcome::Continue
                }
                None => EventOutcome::Ignored,
            },
            StreamEvent::Sources(sources) => match self.streaming_message_mut() {
                Some(msg) => {
                    msg.sources = Some(sources.clone());
                    EventOutcome::Continue
                }
                None => EventOutcome::Ignored,
            },
            StreamEvent::Error(message) => {
                self.error = Some(message.clone());
                EventOutcome::Failed
            }
            StreamEvent::Done => {
                self.finish_streaming();
                EventOutcome::Finished
            }
            StreamEvent::Unknown { .. } => EventOutcome::Ignored,
        }
    }

    /// Re-render the markup of the streaming reply from its content.
    pub fn render_streaming(&mut self, renderer: &dyn Renderer) {
        if let Some(msg) = self.streaming_message_mut() {
            msg.rendered = Some(renderer.render(&msg.content));
        }
    }

    /// Render every assistant message that has no markup yet.
    pub fn render_missing(&mut self, renderer: &dyn Renderer) {
        for msg in self
            .messages
            .iter_mut()
            .filter(|m| m.role == MessageRole::Assistant && m.rendered.is_none())
        {
            msg.rendered = Some(renderer.render(&msg.content));
        }
    }

    /// Mark the exchange complete and stop streaming.
    pub fn finish_streaming(&mut self) {
        for msg in self.messages.iter_mut().filter(|m| m.is_streaming) {
            msg.is_streaming = false;
        }
        self.is_streaming = false;
    }

    /// Remove the half-built assistant reply. Returns it if there was one.
    pub fn discard_streaming_message(&mut self) -> Option<ChatMessage> {
        let index = self
            .messages
            .iter()
            .rposition(|m| m.is_streaming && m.is_assistant())?;
        Some(self.messages.remove(index))
    }

    /// Roll back after a failed exchange and show `message` as the banner.
    pub fn roll_back(&mut self, message: impl Into<String>) {
        self.discard_streaming_message();
        self.finish_streaming();
        self.error = Some(message.into());
    }

    /// Settle the partial reply after an application error.
    ///
    /// Returns whether partial content was kept.
    pub fn settle_partial(&mut self, policy: PartialReplyPolicy) -> bool {
        let keep = match (policy, self.streaming_message()) {
            (PartialReplyPolicy::Retain, Some(msg)) => !msg.content.trim().is_empty(),
            _ => false,
        };
        if !keep {
            self.discard_streaming_message();
        }
        self.finish_streaming();
        keep
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
