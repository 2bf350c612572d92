use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use super::conversation_state::ConversationState;

/// Conversation states keyed by session id.
///
/// Each session has its own lock; a caller holds [`SessionStore::lock`] for
/// the whole turn so two messages of one session never interleave, while
/// different sessions proceed independently.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<ConversationState>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, session_id: &str) -> Arc<Mutex<ConversationState>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!("Starting session {}", session_id);
                Arc::new(Mutex::new(ConversationState::new()))
            })
            .clone()
    }

    /// Exclusive access to a session's state, creating it on first use.
    pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<ConversationState> {
        self.entry(session_id).await.lock_owned().await
    }

    /// A copy of the session's current state.
    pub async fn state(&self, session_id: &str) -> ConversationState {
        self.lock(session_id).await.clone()
    }

    pub async fn save(&self, session_id: &str, state: ConversationState) {
        *self.lock(session_id).await = state;
    }

    pub async fn reset(&self, session_id: &str) {
        info!("Resetting session {}", session_id);
        self.save(session_id, ConversationState::new()).await;
    }
}
