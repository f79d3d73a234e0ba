use serde::{Deserialize, Serialize};

/// Default number of retrieved chunks the backend uses as context.
pub const DEFAULT_TOP_K: u32 = 5;

/// Request body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Number of chunks to retrieve
    pub top_k: u32,
    /// Whether the backend should send a `sources` event
    pub include_citations: bool,
    /// Conversation to continue - None starts a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Previously uploaded attachments to reference
    #[serde(default)]
    pub attachment_ids: Vec<String>,
}

impl ChatRequest {
    /// Create a request that starts a new conversation
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            top_k: DEFAULT_TOP_K,
            include_citations: true,
            conversation_id: None,
            attachment_ids: Vec::new(),
        }
    }

    /// Create a request continuing an existing conversation
    pub fn with_conversation(message: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            ..Self::new(message)
        }
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn include_citations(mut self, include: bool) -> Self {
        self.include_citations = include;
        self
    }

    pub fn attachments(mut self, ids: Vec<String>) -> Self {
        self.attachment_ids = ids;
        self
    }
}
