//! Per-type dispatch of inbound messages.

use std::sync::Arc;

use crate::domain::{ConnectionHandle, OutboundMessage, SessionId};
use crate::service::RelayService;

use super::messages::{Decoded, InboundMessage, decode};

/// Routes decoded messages from one connection to the relay service.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    relay: Arc<RelayService>,
}

impl MessageRouter {
    /// Creates a router over the shared relay service.
    #[must_use]
    pub fn new(relay: Arc<RelayService>) -> Self {
        Self { relay }
    }

    /// Returns the relay service this router dispatches to.
    #[must_use]
    pub fn relay(&self) -> &Arc<RelayService> {
        &self.relay
    }

    /// Decodes and handles one text frame from `connection`.
    ///
    /// Malformed frames are logged and dropped; unknown types are ignored.
    /// Neither closes the connection.
    pub async fn route_text(&self, connection: &ConnectionHandle, text: &str) {
        match decode(text) {
            Ok(Decoded::Message(message)) => self.dispatch(connection, message).await,
            Ok(Decoded::Unknown(kind)) => {
                tracing::trace!(
                    connection_id = %connection.id(),
                    %kind,
                    "ignoring unknown message type"
                );
            }
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    error = %e,
                    "dropping malformed message"
                );
            }
        }
    }

    /// Handles one decoded message from `connection`.
    pub async fn dispatch(&self, connection: &ConnectionHandle, message: InboundMessage) {
        match message {
            InboundMessage::Join {
                session_id,
                user_id,
                role,
            } => {
                let joined = self.relay.join(connection, &session_id, &user_id, role).await;
                if let Err(rejection) = joined {
                    connection.send(OutboundMessage::Error {
                        message: rejection.to_string(),
                    });
                }
            }
            InboundMessage::Leave { session_id, role } => {
                self.relay.leave(connection.id(), &session_id, role).await;
            }
            payload => {
                let Some((session_id, event)) = relay_event(payload) else {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        "dropping payload without required data"
                    );
                    return;
                };
                self.relay.relay(connection.id(), &session_id, event).await;
            }
        }
    }
}

/// Maps a payload-bearing message to the event the peer receives.
///
/// Returns `None` when `data` is absent, or for `part_delete` when
/// `data.partId` is absent.
fn relay_event(message: InboundMessage) -> Option<(SessionId, OutboundMessage)> {
    let required = |data: serde_json::Value| (!data.is_null()).then_some(data);

    let mapped = match message {
        InboundMessage::Join { .. } | InboundMessage::Leave { .. } => return None,
        InboundMessage::PartUpdate { session_id, data } => {
            (session_id, OutboundMessage::PartUpdated { part: required(data)? })
        }
        InboundMessage::PartDelete { session_id, data } => {
            let part_id = data.get("partId").cloned().and_then(required)?;
            (session_id, OutboundMessage::PartDeleted { part_id })
        }
        InboundMessage::ProtocolUpdate { session_id, data } => (
            session_id,
            OutboundMessage::ProtocolUpdated {
                protocol: required(data)?,
            },
        ),
        InboundMessage::Message { session_id, data } => (
            session_id,
            OutboundMessage::NewMessage {
                message: required(data)?,
            },
        ),
        InboundMessage::NoteUpdate { session_id, data } => {
            (session_id, OutboundMessage::NoteUpdated { note: required(data)? })
        }
        InboundMessage::CursorMove { session_id, data } => (
            session_id,
            OutboundMessage::CursorMoved {
                cursor: required(data)?,
            },
        ),
    };
    Some(mapped)
}
