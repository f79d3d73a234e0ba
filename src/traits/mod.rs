//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, DELETE, multipart, streaming)
//! - [`SseParserTrait`] - Server-Sent Events frame parsing
//! - [`Renderer`] - Markdown to sanitized markup

pub mod http;
pub mod renderer;
pub mod sse;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use renderer::{PlainTextRenderer, Renderer};
pub use sse::SseParserTrait;
