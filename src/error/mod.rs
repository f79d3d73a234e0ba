//! Error types.
//!
//! | Kind | Where it comes from | Terminal |
//! |------|---------------------|----------|
//! | Transport | non-2xx status, network failure | Yes |
//! | MalformedEvent | a frame whose payload cannot be decoded | Yes |
//! | Application | an `error` event sent by the backend | No |
//!
//! Transport-level failures of the HTTP seam are [`HttpError`]; calls on
//! [`crate::client::AssistantClient`] return [`crate::client::ClientError`].
//!
//! [`HttpError`]: crate::traits::HttpError

mod network;
mod stream;

pub use network::{classify_reqwest_error, status_message};
pub use stream::StreamError;
