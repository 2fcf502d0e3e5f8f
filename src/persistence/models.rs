//! Session store records.

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// The two user ids authorized to take part in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// User id of the session's therapist.
    pub therapist_id: String,
    /// User id of the session's client.
    pub client_id: String,
}

impl SessionRecord {
    /// Creates a record from the two participant ids.
    #[must_use]
    pub fn new(therapist_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            therapist_id: therapist_id.into(),
            client_id: client_id.into(),
        }
    }

    /// Returns the user id expected for `role`.
    #[must_use]
    pub fn expected_user_id(&self, role: Role) -> &str {
        match role {
            Role::Therapist => &self.therapist_id,
            Role::Client => &self.client_id,
        }
    }
}

/// One entry of a session fixtures file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFixture {
    /// Session identifier.
    pub session_id: String,
    /// User id of the session's therapist.
    pub therapist_id: String,
    /// User id of the session's client.
    pub client_id: String,
}
