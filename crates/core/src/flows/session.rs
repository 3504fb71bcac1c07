use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::UserId;
use crate::flows::states::FlowState;

/// Conversation state for one user: the current flow position. Scratch
/// data travels inside the state variants. Never authoritative once an
/// order exists; the stores are the source of truth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub state: FlowState,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id, state: FlowState::Idle }
    }

    pub fn reset(&mut self) {
        self.state = FlowState::Idle;
    }
}

/// Keyed session map with single-writer-per-key discipline: callers hold
/// the returned per-user mutex for the whole event, so events for the same
/// user are processed strictly one at a time while different users proceed
/// independently.
///
/// Abandoned sessions are kept until process restart; there is no expiry.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: UserId) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(user_id))))
            .clone()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
