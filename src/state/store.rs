//! Observable container for conversation state.

use std::sync::Arc;

use tokio::sync::watch;

use super::conversation::ConversationState;

/// Holds a [`ConversationState`] and notifies subscribers on every mutation.
///
/// Cloning the store yields another handle to the same state. Receivers
/// see the latest value; intermediate values may be skipped if a
/// subscriber falls behind.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    tx: Arc<watch::Sender<ConversationState>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::with_state(ConversationState::default())
    }

    pub fn with_state(state: ConversationState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Mutate the state and notify subscribers, whether or not anything
    /// actually changed.
    ///
    /// Values the caller needs back are written into locals the closure
    /// captures.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ConversationState),
    {
        self.tx.send_modify(f);
    }

    /// Replace the whole state.
    pub fn replace(&self, state: ConversationState) {
        self.tx.send_replace(state);
    }

    /// Read the state without cloning it.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&ConversationState) -> R,
    {
        f(&self.tx.borrow())
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ConversationState {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every mutation.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.tx.subscribe()
    }
}
