//! Per-video sessions and the registry that owns them.

mod registry;

pub use registry::SessionRegistry;

use crate::rag::Answerer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One processed video: its transcript and the answerer built from it.
///
/// Immutable once registered. The answerer is built from exactly the
/// transcript stored alongside it.
pub struct Session {
    session_id: String,
    video_id: String,
    source_url: String,
    transcript: String,
    answerer: Answerer,
    created_at: DateTime<Utc>,
    sequence: u64,
}

impl Session {
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// The URL as originally submitted.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn answerer(&self) -> &Answerer {
        &self.answerer
    }

    /// Summary for enumeration.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            video_id: self.video_id.clone(),
            url: self.source_url.clone(),
            chunk_count: self.answerer.index().len(),
            created_at: self.created_at,
        }
    }
}

/// Summary information about a registered session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub video_id: String,
    /// The URL as originally submitted.
    pub url: String,
    /// Number of indexed transcript chunks.
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}
