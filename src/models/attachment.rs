use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Visibility of an uploaded document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentScope {
    /// Private to the uploading user
    User,
    /// Shared knowledge base, uploaded by an admin
    System,
}

/// A file to upload. The bytes are sent as the multipart part named `file`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Response of `POST /upload` and `POST /admin/uploads`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub status: String,
    /// Identifier to pass in `ChatRequest::attachment_ids`
    pub attachment_id: String,
    pub uri: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub size: u64,
    pub scope: AttachmentScope,
}

/// A stored attachment as listed by `GET /attachments`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub scope: AttachmentScope,
    #[serde(default)]
    pub owner_user_id: Option<String>,
    pub uri: String,
    pub path: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub size_bytes: u64,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    pub created_at: i64,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachmentList {
    pub items: Vec<Attachment>,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteAttachmentResponse {
    pub status: String,
    pub attachment_id: String,
}
