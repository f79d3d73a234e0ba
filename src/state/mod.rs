//! Conversation state
//!
//! - `conversation` - [`ConversationState`] and how stream events fold into it
//! - `store` - [`ConversationStore`], an observable container for the state
//! - `session` - [`ChatSession`], which sends messages and applies replies

mod conversation;
mod session;
mod store;

pub use conversation::{ConversationState, EventOutcome, PartialReplyPolicy};
pub use session::{ChatSession, SendOutcome};
pub use store::ConversationStore;
