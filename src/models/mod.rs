mod attachment;
mod conversation;
mod message;
mod request;
mod source;
mod user;

pub use attachment::{
    Attachment, AttachmentList, AttachmentScope, DeleteAttachmentResponse, UploadFile,
    UploadResponse,
};
pub use conversation::ConversationMessages;
pub use message::{ChatMessage, HistoryMessage, MessageRole};
pub use request::{ChatRequest, DEFAULT_TOP_K};
pub use source::SourceChunk;
pub use user::{HealthResponse, UserInfo};
