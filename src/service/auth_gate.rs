//! Connection authorization gate.
//!
//! Every `join` (including reconnects) is checked against the session
//! store before the connection may occupy a slot. Impersonation attempts
//! are logged on the `security` target.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Role, SessionId};
use crate::error::{JoinRejection, RelayError};
use crate::persistence::{SessionLookup, SessionRecord};

/// Validates a claimed `(user_id, role)` against a session's record.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    lookup: Arc<dyn SessionLookup>,
    timeout: Duration,
}

impl AuthorizationGate {
    /// Creates a gate over `lookup`; each lookup call is bounded by
    /// `timeout`.
    #[must_use]
    pub fn new(lookup: Arc<dyn SessionLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Authorizes a join for `role` in `session_id` as `user_id`.
    ///
    /// Returns the session's record on success. No lock is held while the
    /// lookup is pending.
    ///
    /// # Errors
    ///
    /// - [`JoinRejection::SessionNotFound`] if the session does not exist.
    /// - [`JoinRejection::Unauthorized`] if `user_id` is not the recorded
    ///   participant for `role`.
    /// - [`JoinRejection::LookupFailed`] if the lookup errors or times out.
    pub async fn authorize_join(
        &self,
        session_id: &SessionId,
        user_id: &str,
        role: Role,
    ) -> Result<SessionRecord, JoinRejection> {
        let record = match self.lookup_with_timeout(session_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!(%session_id, user_id, %role, "join for unknown session");
                return Err(JoinRejection::SessionNotFound);
            }
            Err(e) => {
                tracing::error!(%session_id, error = %e, "session lookup failed, rejecting join");
                return Err(JoinRejection::LookupFailed);
            }
        };

        if record.expected_user_id(role) != user_id {
            tracing::warn!(
                target: "security",
                %session_id,
                attempted_user_id = user_id,
                attempted_role = %role,
                "join rejected: user is not a participant in this session"
            );
            return Err(JoinRejection::Unauthorized);
        }

        Ok(record)
    }

    async fn lookup_with_timeout(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionRecord>, RelayError> {
        tokio::time::timeout(self.timeout, self.lookup.get_session_by_id(session_id))
            .await
            .map_err(|_| RelayError::LookupTimeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }
}
