//! Outbound events delivered to room occupants.
//!
//! Every relay decision that reaches a peer is expressed as an
//! [`OutboundMessage`]. The connection loop serializes it to a single JSON
//! text frame whose `type` field names the event.

use serde::{Deserialize, Serialize};

use super::Role;

/// Occupancy summary attached to `participant_joined`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    /// Whether the therapist slot is occupied.
    pub therapist: bool,
    /// Whether the client slot is occupied.
    pub client: bool,
}

/// Broadcast envelope sent from the relay to a connection.
///
/// Payload fields (`part`, `protocol`, `message`, `note`, `cursor`) carry
/// the sender's `data` verbatim; the relay never inspects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Sent only to the requesting connection when a join is rejected.
    Error {
        /// Human-readable rejection reason.
        message: String,
    },

    /// A participant occupied a slot.
    ParticipantJoined {
        /// Slot that was occupied.
        role: Role,
        /// Authorized user id bound to the slot.
        #[serde(rename = "userId")]
        user_id: String,
        /// Slot occupancy after the join.
        participants: Participants,
    },

    /// A participant left or disconnected.
    ParticipantLeft {
        /// Slot that was vacated.
        role: Role,
    },

    /// A curriculum part was created or edited.
    PartUpdated {
        /// Part object as sent by the peer.
        part: serde_json::Value,
    },

    /// A curriculum part was deleted.
    PartDeleted {
        /// Identifier of the deleted part.
        #[serde(rename = "partId")]
        part_id: serde_json::Value,
    },

    /// Protocol walkthrough state changed.
    ProtocolUpdated {
        /// Protocol state as sent by the peer.
        protocol: serde_json::Value,
    },

    /// Chat message.
    NewMessage {
        /// Chat message as sent by the peer.
        message: serde_json::Value,
    },

    /// Shared note changed.
    NoteUpdated {
        /// Note object as sent by the peer.
        note: serde_json::Value,
    },

    /// Peer cursor moved.
    CursorMoved {
        /// Cursor position as sent by the peer.
        cursor: serde_json::Value,
    },
}

impl OutboundMessage {
    /// Returns the wire `type` string for this message.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Error { .. } => "error",
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::ParticipantLeft { .. } => "participant_left",
            Self::PartUpdated { .. } => "part_updated",
            Self::PartDeleted { .. } => "part_deleted",
            Self::ProtocolUpdated { .. } => "protocol_updated",
            Self::NewMessage { .. } => "new_message",
            Self::NoteUpdated { .. } => "note_updated",
            Self::CursorMoved { .. } => "cursor_moved",
        }
    }
}
