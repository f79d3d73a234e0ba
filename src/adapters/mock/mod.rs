//! Mock implementations for testing.
//!
//! Enables unit testing without network access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses and
//!   chunked streaming bodies

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
