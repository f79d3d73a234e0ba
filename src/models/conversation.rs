use serde::{Deserialize, Serialize};

use super::HistoryMessage;

/// Response of `GET /conversations/{id}/messages`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessages {
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}
