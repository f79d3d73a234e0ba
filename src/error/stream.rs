//! Streaming-related error types.
//!
//! This module defines errors that occur while reading the `/chat` event
//! stream. None of them are retried; the caller decides how to surface
//! them and whether to roll back optimistic state.

use thiserror::Error;

use crate::sse::SseParseError;
use crate::traits::HttpError;

use super::network::status_message;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Non-2xx status or network failure before or while streaming.
    ///
    /// `message` is the response body text for status failures.
    #[error("Transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// A delivered frame could not be decoded. The stream stops here.
    #[error("Malformed event: {0}")]
    MalformedEvent(#[from] SseParseError),

    /// The backend reported an error through an `error` event.
    #[error("Assistant error: {message}")]
    Application { message: String },
}

impl StreamError {
    /// Whether the exchange is over with no usable reply.
    ///
    /// Application errors are displayable and leave the decision about
    /// partial content to the caller.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamError::Application { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Transport {
                status: Some(status),
                message,
            } => {
                if message.trim().is_empty() {
                    status_message(*status).to_string()
                } else {
                    format!("{} ({})", status_message(*status), message.trim())
                }
            }
            StreamError::Transport {
                status: None,
                message,
            } => format!("Connection to the assistant failed: {}", message),
            StreamError::MalformedEvent(_) => {
                "Received invalid data from the assistant. Please try again.".to_string()
            }
            StreamError::Application { message } => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "E_STREAM_TRANSPORT",
            StreamError::MalformedEvent(_) => "E_STREAM_MALFORMED",
            StreamError::Application { .. } => "E_STREAM_APP",
        }
    }
}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => StreamError::Transport {
                status: Some(status),
                message,
            },
            other => StreamError::Transport {
                status: None,
                message: other.to_string(),
            },
        }
    }
}
