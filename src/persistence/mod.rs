//! Persistence layer: read-only access to the session store.
//!
//! The relay asks exactly one question of persistent storage: who are the
//! authorized therapist and client for a session? [`SessionLookup`] is that
//! seam. [`PostgresSessionLookup`] serves production and
//! [`InMemorySessionLookup`] serves tests and local development.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::SessionId;
use crate::error::RelayError;

pub use memory::InMemorySessionLookup;
pub use models::SessionRecord;
pub use postgres::PostgresSessionLookup;

/// Lookup-by-id access to recorded session participants.
#[async_trait]
pub trait SessionLookup: Send + Sync + std::fmt::Debug {
    /// Returns the recorded participants of a session, or `None` if the
    /// session does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] if the store cannot be queried.
    async fn get_session_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionRecord>, RelayError>;
}
