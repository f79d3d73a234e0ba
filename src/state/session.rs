//! Chat session: one conversation driven against the backend.
//!
//! A session owns the [`ConversationStore`] it writes to. Each exchange is
//! applied optimistically and rolled back if the stream fails.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::adapters::ReqwestHttpClient;
use crate::client::{AssistantClient, ClientError};
use crate::config::ClientConfig;
use crate::markdown::{CachedRenderer, MarkdownRenderer};
use crate::models::{ChatRequest, UploadFile, UploadResponse, DEFAULT_TOP_K};
use crate::sse::StreamEvent;
use crate::traits::{HttpClient, Renderer};

use super::conversation::{ConversationState, EventOutcome, PartialReplyPolicy};
use super::store::ConversationStore;

/// How an exchange that produced a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply streamed to the end
    Completed,
    /// The backend sent an `error` event part way through
    Rejected {
        message: String,
        /// Whether the partial reply was kept in the conversation
        partial_kept: bool,
    },
}

/// Ties an [`AssistantClient`], a [`ConversationStore`] and a [`Renderer`]
/// together.
pub struct ChatSession<H: HttpClient = ReqwestHttpClient> {
    client: AssistantClient<H>,
    store: ConversationStore,
    renderer: Arc<dyn Renderer>,
    policy: PartialReplyPolicy,
    top_k: u32,
    include_citations: bool,
}

impl<H: HttpClient> ChatSession<H> {
    pub fn new(client: AssistantClient<H>) -> Self {
        Self {
            client,
            store: ConversationStore::new(),
            renderer: Arc::new(CachedRenderer::new(MarkdownRenderer)),
            policy: PartialReplyPolicy::default(),
            top_k: DEFAULT_TOP_K,
            include_citations: true,
        }
    }

    /// Session with request options and policy taken from `config`.
    pub fn from_config(client: AssistantClient<H>, config: &ClientConfig) -> Self {
        Self::new(client)
            .with_top_k(config.top_k)
            .with_citations(config.include_citations)
            .with_policy(config.partial_reply_policy)
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_policy(mut self, policy: PartialReplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_citations(mut self, include: bool) -> Self {
        self.include_citations = include;
        self
    }

    /// Use `store` instead of the session's own store.
    pub fn with_store(mut self, store: ConversationStore) -> Self {
        self.store = store;
        self
    }

    pub fn client(&self) -> &AssistantClient<H> {
        &self.client
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn policy(&self) -> PartialReplyPolicy {
        self.policy
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.store.read(|state| state.conversation_id.clone())
    }

    /// Continue an existing conversation without loading its history.
    pub fn continue_conversation(&self, conversation_id: impl Into<String>) {
        self.store
            .replace(ConversationState::with_conversation(conversation_id));
    }

    /// Start a new, empty conversation.
    pub fn reset(&self) {
        self.store.replace(ConversationState::new());
    }

    /// Upload a file for use in the next message.
    pub async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, ClientError> {
        self.client.upload(file).await
    }

    /// Replace the state with the stored history of `conversation_id`.
    ///
    /// Returns the number of messages loaded. On failure the banner is set
    /// and the current messages are left alone.
    pub async fn load_history(&self, conversation_id: &str) -> Result<usize, ClientError> {
        let history = match self.client.conversation_messages(conversation_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to load conversation {}: {}", conversation_id, e);
                let message = e.user_message();
                self.store.update(|state| state.error = Some(message));
                return Err(e);
            }
        };

        let mut state = ConversationState::from_history(history);
        state.render_missing(self.renderer.as_ref());
        let count = state.messages.len();
        self.store.replace(state);

        info!(conversation_id, messages = count, "Loaded conversation history");
        Ok(count)
    }

    /// Send a message and fold the reply into the conversation.
    pub async fn send(
        &mut self,
        text: &str,
        attachment_ids: Vec<String>,
    ) -> Result<SendOutcome, ClientError> {
        self.send_with(text, attachment_ids, |_| {}).await
    }

    /// Like [`send`](Self::send), calling `on_event` with each event before
    /// it is applied.
    ///
    /// The user message and an empty assistant reply are added before the
    /// request goes out. A transport failure or malformed event removes
    /// that reply again, sets the banner, and is returned as the error.
    /// An `error` event from the backend ends the exchange with
    /// [`SendOutcome::Rejected`]; the partial reply is kept or dropped per
    /// the session's [`PartialReplyPolicy`].
    pub async fn send_with<F>(
        &mut self,
        text: &str,
        attachment_ids: Vec<String>,
        mut on_event: F,
    ) -> Result<SendOutcome, ClientError>
    where
        F: FnMut(&StreamEvent) + Send,
    {
        let mut conversation_id = None;
        self.store.update(|state| {
            state.begin_exchange(text, attachment_ids.clone());
            conversation_id = state.conversation_id.clone();
        });

        let mut request = ChatRequest::new(text)
            .top_k(self.top_k)
            .include_citations(self.include_citations)
            .attachments(attachment_ids);
        request.conversation_id = conversation_id;

        let mut events = match self.client.chat_stream(&request).await {
            Ok(events) => events,
            Err(e) => return Err(self.roll_back(e)),
        };

        let renderer = Arc::clone(&self.renderer);
        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => return Err(self.roll_back(ClientError::Stream(e))),
            };
            on_event(&event);

            let mut outcome = EventOutcome::Ignored;
            self.store.update(|state| {
                outcome = state.apply_event(&event);
                if matches!(event, StreamEvent::Token(_)) {
                    state.render_streaming(renderer.as_ref());
                }
            });

            match outcome {
                EventOutcome::Continue | EventOutcome::Ignored => {}
                EventOutcome::Finished => break,
                EventOutcome::Failed => {
                    let message = match event {
                        StreamEvent::Error(message) => message,
                        _ => String::new(),
                    };
                    let policy = self.policy;
                    let mut partial_kept = false;
                    self.store
                        .update(|state| partial_kept = state.settle_partial(policy));
                    warn!(partial_kept, "Assistant reported an error: {}", message);
                    return Ok(SendOutcome::Rejected {
                        message,
                        partial_kept,
                    });
                }
            }
        }

        // A stream that ends without `done` still completes the reply
        self.store.update(|state| state.finish_streaming());
        debug!("Exchange completed");
        Ok(SendOutcome::Completed)
    }

    fn roll_back(&self, err: ClientError) -> ClientError {
        warn!("Exchange failed, rolling back: {}", err);
        let message = err.user_message();
        self.store.update(|state| state.roll_back(message));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::error::StreamError;
    use crate::models::MessageRole;
    use crate::traits::{HttpError, PlainTextRenderer, Response};
    use bytes::Bytes;

    const CHAT_URL: &str = "http://assistant.test/chat";

    fn session_with(response: MockResponse) -> ChatSession<MockHttpClient> {
        let http = MockHttpClient::new();
        http.set_response(CHAT_URL, response);
        ChatSession::new(AssistantClient::with_http("http://assistant.test", http))
            .with_renderer(PlainTextRenderer)
    }

    fn frames(frames: &[&str]) -> MockResponse {
        MockResponse::Stream(
            frames
                .iter()
                .map(|f| Bytes::from(format!("data: {}\n\n", f)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_send_completes_reply() {
        let mut session = session_with(frames(&[
            r#"{"type":"meta","data":{"conversation_id":"c1"}}"#,
            r#"{"type":"token","data":"Hi"}"#,
            r#"{"type":"token","data":" <there>"}"#,
            r#"{"type":"sources","data":[{"source":"a.md","text":"x"}]}"#,
            r#"{"type":"done","data":null}"#,
        ]));

        let outcome = session.send("hello", Vec::new()).await.unwrap();
        assert_eq!(outcome, SendOutcome::Completed);

        let state = session.store().snapshot();
        assert_eq!(state.conversation_id.as_deref(), Some("c1"));
        assert!(!state.is_streaming);
        assert_eq!(state.messages.len(), 2);
        let reply = &state.messages[1];
        assert_eq!(reply.content, "Hi <there>");
        assert_eq!(reply.rendered.as_deref(), Some("Hi &lt;there&gt;"));
        assert_eq!(reply.sources.as_ref().unwrap().len(), 1);
        assert!(!reply.is_streaming);
    }

    #[tokio::test]
    async fn test_send_passes_conversation_and_options() {
        let mut session = session_with(frames(&[r#"{"type":"done","data":null}"#]))
            .with_top_k(3)
            .with_citations(false);
        session.continue_conversation("c7");

        session
            .send("again", vec!["att-1".to_string()])
            .await
            .unwrap();

        let request = &session.client().http().get_requests()[0];
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["conversation_id"], "c7");
        assert_eq!(body["top_k"], 3);
        assert_eq!(body["include_citations"], false);
        assert_eq!(body["attachment_ids"], serde_json::json!(["att-1"]));
    }

    #[tokio::test]
    async fn test_transport_failure_rolls_back() {
        let mut session = session_with(MockResponse::Success(Response::new(
            500,
            Bytes::from("Retrieval failed"),
        )));

        let err = session.send("hello", Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Stream(StreamError::Transport {
                status: Some(500),
                ..
            })
        ));

        let state = session.store().snapshot();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, MessageRole::User);
        assert!(state.error.unwrap().contains("Retrieval failed"));
        assert!(!state.is_streaming);
    }

    #[tokio::test]
    async fn test_malformed_event_rolls_back_partial_reply() {
        let mut session = session_with(MockResponse::Stream(vec![
            Bytes::from("data: {\"type\":\"token\",\"data\":\"Hal\"}\n\n"),
            Bytes::from("data: {not json}\n\n"),
        ]));

        let err = session.send("hello", Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Stream(StreamError::MalformedEvent(_))
        ));
        let state = session.store().snapshot();
        assert_eq!(state.messages.len(), 1);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_body_failure_mid_stream_rolls_back() {
        let mut session = session_with(MockResponse::StreamThenError(
            vec![Bytes::from("data: {\"type\":\"token\",\"data\":\"Hal\"}\n\n")],
            HttpError::Io("connection reset".to_string()),
        ));

        let err = session.send("hello", Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Stream(StreamError::Transport { status: None, .. })
        ));
        assert_eq!(session.store().snapshot().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_application_error_retains_partial() {
        let mut session = session_with(frames(&[
            r#"{"type":"token","data":"Partial"}"#,
            r#"{"type":"error","data":"Model unavailable"}"#,
            r#"{"type":"token","data":"never"}"#,
        ]));

        let outcome = session.send("hello", Vec::new()).await.unwrap();
        assert_eq!(
            outcome,
            SendOutcome::Rejected {
                message: "Model unavailable".to_string(),
                partial_kept: true,
            }
        );

        let state = session.store().snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, "Partial");
        assert_eq!(state.error.as_deref(), Some("Model unavailable"));
        assert!(!state.is_streaming);
    }

    #[tokio::test]
    async fn test_application_error_discard_policy() {
        let mut session = session_with(frames(&[
            r#"{"type":"token","data":"Partial"}"#,
            r#"{"type":"error","data":"Model unavailable"}"#,
        ]))
        .with_policy(PartialReplyPolicy::Discard);

        let outcome = session.send("hello", Vec::new()).await.unwrap();
        assert!(matches!(
            outcome,
            SendOutcome::Rejected {
                partial_kept: false,
                ..
            }
        ));
        assert_eq!(session.store().snapshot().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_released_after_done() {
        let mut session = session_with(MockResponse::Stream(vec![
            Bytes::from("data: {\"type\":\"done\",\"data\":null}\n\n"),
            Bytes::from("data: {\"type\":\"token\",\"data\":\"late\"}\n\n"),
        ]));

        session.send("hello", Vec::new()).await.unwrap();
        let http = session.client().http();
        assert_eq!(http.chunks_pulled(), 1);
        assert_eq!(http.streams_released(), 1);
        assert_eq!(session.store().snapshot().messages[1].content, "");
    }

    #[tokio::test]
    async fn test_stream_end_without_done_completes() {
        let mut session = session_with(frames(&[r#"{"type":"token","data":"Hi"}"#]));

        let outcome = session.send("hello", Vec::new()).await.unwrap();
        assert_eq!(outcome, SendOutcome::Completed);
        assert!(!session.store().snapshot().is_streaming);
    }

    #[tokio::test]
    async fn test_send_with_sees_events_in_order() {
        let mut session = session_with(frames(&[
            r#"{"type":"token","data":"a"}"#,
            r#"{"type":"usage","data":{"tokens":1}}"#,
            r#"{"type":"token","data":"b"}"#,
            r#"{"type":"done","data":null}"#,
        ]));

        let mut seen = Vec::new();
        session
            .send_with("hello", Vec::new(), |event| {
                seen.push(event.event_type_name().to_string())
            })
            .await
            .unwrap();

        assert_eq!(seen, vec!["token", "usage", "token", "done"]);
    }

    #[tokio::test]
    async fn test_subscriber_notified_per_event() {
        let mut session = session_with(frames(&[
            r#"{"type":"token","data":"a"}"#,
            r#"{"type":"done","data":null}"#,
        ]));
        let mut rx = session.store().subscribe();
        rx.borrow_and_update();

        session.send("hello", Vec::new()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().messages[1].content, "a");
    }

    #[tokio::test]
    async fn test_load_history_and_reset() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://assistant.test/conversations/c1/messages",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(
                    r#"{"conversation_id":"c1","messages":[{"role":"user","content":"q","created_at":1},{"role":"assistant","content":"a","created_at":2}]}"#,
                ),
            )),
        );
        let session = ChatSession::new(AssistantClient::with_http("http://assistant.test", http))
            .with_renderer(PlainTextRenderer);

        assert_eq!(session.load_history("c1").await.unwrap(), 2);
        assert_eq!(session.conversation_id().as_deref(), Some("c1"));
        assert_eq!(
            session.store().snapshot().messages[1].rendered.as_deref(),
            Some("a")
        );

        session.reset();
        assert_eq!(session.store().snapshot(), ConversationState::new());
    }

    #[tokio::test]
    async fn test_load_history_failure_sets_banner() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::Success(Response::new(
            404,
            Bytes::from(r#"{"detail":"Conversation not found"}"#),
        )));
        let session = ChatSession::new(AssistantClient::with_http("http://assistant.test", http));

        let err = session.load_history("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 404, .. }));
        assert!(session
            .store()
            .snapshot()
            .error
            .unwrap()
            .contains("Conversation not found"));
    }
}
