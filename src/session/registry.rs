//! Process-wide session registry.

use super::{Session, SessionInfo};
use crate::rag::Answerer;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Keyed store of sessions.
///
/// Sessions are handed out as `Arc<Session>`: removing one from the registry
/// makes it invisible to later lookups while in-flight holders finish with
/// their own reference.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    next_sequence: AtomicU64,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Register a fully built session and return its ID.
    ///
    /// IDs have the form `session_{sequence}_{video_id}`. The sequence is
    /// monotonic for the registry's lifetime and never reused after deletion.
    pub async fn create(
        &self,
        video_id: &str,
        source_url: &str,
        transcript: String,
        answerer: Answerer,
    ) -> String {
        let mut sessions = self.sessions.write().await;

        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let session_id = format!("session_{}_{}", sequence, video_id);

        let session = Session {
            session_id: session_id.clone(),
            video_id: video_id.to_string(),
            source_url: source_url.to_string(),
            transcript,
            answerer,
            created_at: Utc::now(),
            sequence,
        };
        sessions.insert(session_id.clone(), Arc::new(session));

        info!("Registered {} ({} active)", session_id, sessions.len());
        session_id
    }

    /// Look up a session.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Summaries of all sessions, oldest first.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut ordered: Vec<&Arc<Session>> = sessions.values().collect();
        ordered.sort_by_key(|s| s.sequence);
        ordered.into_iter().map(|s| s.info()).collect()
    }

    /// Remove a session. Returns false if it did not exist.
    pub async fn delete(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(_) => {
                debug!("Removed {}", session_id);
                true
            }
            None => false,
        }
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
