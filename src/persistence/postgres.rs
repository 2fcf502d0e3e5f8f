//! PostgreSQL implementation of the session lookup.

use async_trait::async_trait;
use sqlx::PgPool;

use super::SessionLookup;
use super::models::SessionRecord;
use crate::domain::SessionId;
use crate::error::RelayError;

/// Session lookup backed by the practice's `sessions` table via
/// `sqlx::PgPool`.
///
/// Ids are compared and returned as text so the relay stays agnostic of
/// the store's key types.
#[derive(Debug, Clone)]
pub struct PostgresSessionLookup {
    pool: PgPool,
}

impl PostgresSessionLookup {
    /// Creates a lookup over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionLookup for PostgresSessionLookup {
    async fn get_session_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionRecord>, RelayError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT therapist_id::text, client_id::text FROM sessions WHERE id::text = $1",
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelayError::PersistenceError(e.to_string()))?;

        Ok(row.map(|(therapist_id, client_id)| SessionRecord {
            therapist_id,
            client_id,
        }))
    }
}
