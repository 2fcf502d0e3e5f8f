//! In-memory session lookup for tests and database-less development.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SessionLookup;
use super::models::{SessionFixture, SessionRecord};
use crate::domain::SessionId;
use crate::error::RelayError;

/// Session lookup backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemorySessionLookup {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessionLookup {
    /// Creates an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads sessions from a JSON fixtures file of the form
    /// `[{"sessionId": "...", "therapistId": "...", "clientId": "..."}]`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if the file cannot be read or
    /// is not a valid fixtures array.
    pub fn from_fixtures_file(path: &Path) -> Result<Self, RelayError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RelayError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let fixtures: Vec<SessionFixture> = serde_json::from_str(&raw).map_err(|e| {
            RelayError::InvalidConfig(format!("invalid fixtures in {}: {e}", path.display()))
        })?;

        let sessions = fixtures
            .into_iter()
            .map(|f| {
                (
                    SessionId::new(f.session_id),
                    SessionRecord::new(f.therapist_id, f.client_id),
                )
            })
            .collect();
        Ok(Self {
            sessions: RwLock::new(sessions),
        })
    }

    /// Inserts or replaces a session record.
    pub async fn insert(&self, session_id: SessionId, record: SessionRecord) {
        self.sessions.write().await.insert(session_id, record);
    }

    /// Returns the number of known sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no sessions are known.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionLookup for InMemorySessionLookup {
    async fn get_session_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionRecord>, RelayError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }
}
