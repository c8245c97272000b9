use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use calmate_core::{CalmateResult, MemoryStore, Principal, Session};

/// Shared application state: the document store and one live session per
/// signed-in principal.
#[derive(Clone)]
pub struct AppState {
    pub store: MemoryStore,
    sessions: Arc<Mutex<HashMap<String, Arc<Session>>>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            store: MemoryStore::new(),
            sessions: Arc::default(),
        }
    }

    /// Open a session for the principal, replacing any existing one.
    /// Dropping the old session tears its subscriptions down.
    pub async fn sign_in(&self, principal: Principal) -> CalmateResult<Arc<Session>> {
        let session = Arc::new(Session::open(self.store.clone(), principal.clone()).await?);
        self.sessions
            .lock()
            .await
            .insert(principal.id, session.clone());
        Ok(session)
    }

    pub async fn sign_out(&self, user_id: &str) -> bool {
        self.sessions.lock().await.remove(user_id).is_some()
    }

    pub async fn session(&self, user_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(user_id).cloned()
    }
}
