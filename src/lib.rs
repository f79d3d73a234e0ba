//! Celine Chat - a streaming chat client for the Celine assistant backend
//!
//! The library covers the wire side (HTTP client, SSE reader, typed stream
//! events), conversation state and markdown rendering. The binary in
//! `main.rs` is a line-oriented front end on top of it.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod sse;
pub mod state;
pub mod traits;
