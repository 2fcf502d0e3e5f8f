//! Participant roles. Each role names exactly one slot in a room.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the session a participant claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The clinician running the session.
    Therapist,
    /// The person receiving therapy.
    Client,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Therapist => "therapist",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_lowercase() {
        let Ok(json) = serde_json::to_string(&Role::Therapist) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"therapist\"");
        assert_eq!(Role::Client.to_string(), "client");
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"supervisor\"").is_err());
    }
}
