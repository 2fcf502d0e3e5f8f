//! Inbound WebSocket message types and decoding.
//!
//! Decoding happens in two steps so that the three failure classes stay
//! distinguishable: invalid JSON or a missing `type` (malformed), a `type`
//! outside the known set (ignored for forward compatibility), and a known
//! `type` with missing required fields (malformed).

use serde::Deserialize;

use crate::domain::{Role, SessionId};

/// Every `type` string the relay understands.
pub const KNOWN_TYPES: [&str; 8] = [
    "join",
    "leave",
    "part_update",
    "part_delete",
    "protocol_update",
    "message",
    "note_update",
    "cursor_move",
];

/// A client → relay message.
///
/// Payload `data` is opaque; it defaults to `null` when absent so the
/// router can drop it explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    /// Claim a slot in a session's room.
    Join {
        /// Target session.
        session_id: SessionId,
        /// Claimed user id.
        user_id: String,
        /// Claimed role.
        role: Role,
    },
    /// Give up a slot.
    Leave {
        /// Target session.
        session_id: SessionId,
        /// Slot to release.
        role: Role,
    },
    /// A curriculum part was created or edited.
    PartUpdate {
        /// Target session.
        session_id: SessionId,
        /// Part object.
        #[serde(default)]
        data: serde_json::Value,
    },
    /// A curriculum part was deleted; `data.partId` is required.
    PartDelete {
        /// Target session.
        session_id: SessionId,
        /// Object carrying `partId`.
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Protocol walkthrough state changed.
    ProtocolUpdate {
        /// Target session.
        session_id: SessionId,
        /// Protocol state.
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Chat message.
    Message {
        /// Target session.
        session_id: SessionId,
        /// Chat message.
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Shared note changed.
    NoteUpdate {
        /// Target session.
        session_id: SessionId,
        /// Note object.
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Cursor moved.
    CursorMove {
        /// Target session.
        session_id: SessionId,
        /// Cursor position.
        #[serde(default)]
        data: serde_json::Value,
    },
}

/// Outcome of decoding one text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A recognized, well-formed message.
    Message(InboundMessage),
    /// A message whose `type` is not in [`KNOWN_TYPES`].
    Unknown(String),
}

/// Why a text frame could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame is not a JSON value.
    #[error("malformed JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The frame has no string `type` field.
    #[error("message has no string `type` field")]
    MissingType,

    /// A known `type` is missing required fields or has the wrong shape.
    #[error("invalid `{kind}` message: {source}")]
    Invalid {
        /// The declared message type.
        kind: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes a text frame into an [`InboundMessage`].
///
/// # Errors
///
/// Returns a [`DecodeError`] for malformed frames. Unknown types are not
/// errors; they decode to [`Decoded::Unknown`].
pub fn decode(text: &str) -> Result<Decoded, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(DecodeError::Json)?;
    let Some(kind) = value.get("type").and_then(serde_json::Value::as_str) else {
        return Err(DecodeError::MissingType);
    };
    if !KNOWN_TYPES.contains(&kind) {
        return Ok(Decoded::Unknown(kind.to_string()));
    }

    let kind = kind.to_string();
    serde_json::from_value(value)
        .map(Decoded::Message)
        .map_err(|source| DecodeError::Invalid { kind, source })
}
