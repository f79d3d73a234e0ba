//! Assistant API client for backend communication.
//!
//! This module provides the client for the chat backend, including the
//! streamed `/chat` reply delivered as Server-Sent Events.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::ReqwestHttpClient;
use crate::error::StreamError;
use crate::models::{
    AttachmentList, ChatRequest, ConversationMessages, DeleteAttachmentResponse, HealthResponse,
    UploadFile, UploadResponse, UserInfo,
};
use crate::sse::{read_events, EventStream};
use crate::traits::{Headers, HttpClient, HttpError, Response};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Page size the backend uses when `/attachments` gets no `limit`.
pub const DEFAULT_ATTACHMENT_LIMIT: u32 = 200;

/// Error type for assistant client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    /// Opening or reading the chat stream failed
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Text for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Stream(e) => e.user_message(),
            ClientError::Server { status, message } => {
                format!("{} ({})", crate::error::status_message(*status), message)
            }
            other => other.to_string(),
        }
    }
}

/// Client for the assistant backend API.
///
/// Generic over the transport so tests can inject a mock.
#[derive(Debug, Clone)]
pub struct AssistantClient<H: HttpClient = ReqwestHttpClient> {
    /// Base URL for the assistant API, without a trailing slash
    base_url: String,
    http: H,
}

impl AssistantClient<ReqwestHttpClient> {
    /// Create a client for the default base URL.
    pub fn new() -> Self {
        Self::with_http(DEFAULT_BASE_URL, ReqwestHttpClient::new())
    }

    /// Create a client for a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, ReqwestHttpClient::new())
    }
}

impl Default for AssistantClient<ReqwestHttpClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HttpClient> AssistantClient<H> {
    /// Create a client over an injected transport.
    pub fn with_http(base_url: impl Into<String>, http: H) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a reference to the transport.
    pub fn http(&self) -> &H {
        &self.http
    }

    /// Open a chat exchange and return its events.
    ///
    /// Sends a POST to `/chat`. A non-2xx status fails here with
    /// [`StreamError::Transport`] carrying the response body, before any
    /// reader exists. Otherwise events are decoded lazily as the body
    /// arrives.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<EventStream, ClientError> {
        let url = self.url("/chat");
        let body = serde_json::to_string(request)?;

        let mut headers = self.headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        info!(
            conversation_id = request.conversation_id.as_deref().unwrap_or("-"),
            attachments = request.attachment_ids.len(),
            "Opening chat stream"
        );

        let body_stream = self
            .http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|e| {
                warn!("Chat stream failed to open: {}", e);
                ClientError::Stream(StreamError::from(e))
            })?;

        Ok(read_events(body_stream))
    }

    /// Upload a file owned by the current user (POST `/upload`).
    ///
    /// The returned `attachment_id` can be passed in
    /// [`ChatRequest::attachment_ids`].
    pub async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, ClientError> {
        self.upload_to("/upload", file).await
    }

    /// Upload a file into the shared knowledge base (POST `/admin/uploads`).
    pub async fn upload_system(&self, file: &UploadFile) -> Result<UploadResponse, ClientError> {
        self.upload_to("/admin/uploads", file).await
    }

    async fn upload_to(&self, path: &str, file: &UploadFile) -> Result<UploadResponse, ClientError> {
        info!(filename = %file.filename, size = file.bytes.len(), "Uploading file");
        let response = self
            .http
            .post_multipart(&self.url(path), file, &self.headers())
            .await?;
        Self::decode(response)
    }

    /// List the current user's attachments, newest first.
    pub async fn list_attachments(&self, limit: u32) -> Result<AttachmentList, ClientError> {
        let url = format!("{}?limit={}", self.url("/attachments"), limit);
        let response = self.http.get(&url, &self.headers()).await?;
        Self::decode(response)
    }

    pub async fn delete_attachment(
        &self,
        attachment_id: &str,
    ) -> Result<DeleteAttachmentResponse, ClientError> {
        let url = self.url(&format!("/attachments/{}", urlencoding::encode(attachment_id)));
        let response = self.http.delete(&url, &self.headers()).await?;
        Self::decode(response)
    }

    /// URL serving the raw bytes of an attachment.
    pub fn attachment_raw_url(&self, attachment_id: &str) -> String {
        self.url(&format!(
            "/attachments/{}/raw",
            urlencoding::encode(attachment_id)
        ))
    }

    /// Fetch the stored messages of a conversation, oldest first.
    pub async fn conversation_messages(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationMessages, ClientError> {
        let url = self.url(&format!(
            "/conversations/{}/messages",
            urlencoding::encode(conversation_id)
        ));
        let response = self.http.get(&url, &self.headers()).await?;
        Self::decode(response)
    }

    pub async fn current_user(&self) -> Result<UserInfo, ClientError> {
        let response = self.http.get(&self.url("/user"), &self.headers()).await?;
        Self::decode(response)
    }

    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(&self.url("/health"), &self.headers()).await?;
        Self::decode(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers sent with every request.
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("x-request-id".to_string(), Uuid::new_v4().to_string());
        headers
    }

    /// Decode a JSON body, turning a non-2xx status into [`ClientError::Server`].
    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        if !response.is_success() {
            let message = error_detail(&response);
            warn!(status = response.status, "Request failed: {}", message);
            return Err(ClientError::Server {
                status: response.status,
                message,
            });
        }
        Ok(response.json()?)
    }
}

/// Error text of a failed response.
///
/// The backend reports failures as `{"detail": "..."}`; anything else is
/// returned as raw body text.
fn error_detail(response: &Response) -> String {
    response
        .json::<serde_json::Value>()
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| response.text_lossy())
}
