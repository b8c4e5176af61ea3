//! In-process conversation memory (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::message::Message;

type SessionSlot = Arc<Mutex<Vec<Message>>>;

/// Message history keyed by session id.
///
/// Each session's history sits behind its own lock, so turns within one session are
/// serialized while different sessions proceed independently.
#[derive(Debug, Default)]
pub struct MemoryCheckpointer {
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, session_id: &str) -> SessionSlot {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    async fn is_current(&self, session_id: &str, slot: &SessionSlot) -> bool {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Exclusive access to a session's history for the duration of one turn
    pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<Vec<Message>> {
        loop {
            let slot = self.slot(session_id).await;
            let guard = slot.clone().lock_owned().await;
            // A clear that ran while we waited has retired this slot
            if self.is_current(session_id, &slot).await {
                return guard;
            }
        }
    }

    /// A snapshot of the session's history; unknown sessions read as empty
    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        let slot = self.sessions.lock().await.get(session_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Forget a session; waits for any in-flight turn on it to finish
    pub async fn clear(&self, session_id: &str) {
        let slot = self.sessions.lock().await.get(session_id).cloned();
        let Some(slot) = slot else {
            return;
        };

        // The slot stays locked until it is out of the map, so no turn can start on it
        let mut history = slot.lock().await;
        history.clear();
        let mut sessions = self.sessions.lock().await;
        if sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, &slot))
        {
            sessions.remove(session_id);
        }
    }

    pub async fn sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
