//! Network-related error helpers.
//!
//! Maps reqwest failures onto [`HttpError`] and HTTP statuses onto
//! messages a user can act on.

use crate::traits::HttpError;

/// Classify a reqwest error into an [`HttpError`].
pub fn classify_reqwest_error(err: &reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::ConnectionFailed(err.to_string())
    } else if err.is_builder() {
        HttpError::InvalidUrl(err.to_string())
    } else if err.is_body() || err.is_decode() {
        HttpError::Io(err.to_string())
    } else if let Some(status) = err.status() {
        HttpError::ServerError {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else {
        HttpError::Other(err.to_string())
    }
}

/// Short description of what an HTTP status means for this backend.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid.",
        401 => "Authentication required. Please sign in again.",
        403 => "Access denied.",
        404 => "Not found.",
        413 => "The upload is too large.",
        429 => "Too many requests. Please wait a moment and try again.",
        500..=599 => "The assistant is experiencing issues. Please try again later.",
        _ => "The assistant returned an error.",
    }
}
