//! Relay service: join/leave state machine, payload fan-out, and
//! connection cleanup.

use std::sync::Arc;

use crate::domain::{
    ConnectionHandle, ConnectionId, OutboundMessage, Role, RoomParticipants, RoomRegistry,
    SessionId,
};
use crate::error::JoinRejection;

use super::AuthorizationGate;

/// Orchestration layer for every relay operation.
///
/// Owns the [`RoomRegistry`] (the only shared mutable state) and the
/// [`AuthorizationGate`]. Every mutation follows the pattern: authorize
/// (no lock held) → mutate the registry → broadcast the outcome.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<RoomRegistry>,
    gate: AuthorizationGate,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(registry: Arc<RoomRegistry>, gate: AuthorizationGate) -> Self {
        Self { registry, gate }
    }

    /// Returns a reference to the inner [`RoomRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Authorizes `connection` and puts it in the `role` slot of the
    /// session's room, then announces the join to every occupant,
    /// including the joiner.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinRejection`] if authorization fails. The room is
    /// not touched in that case.
    pub async fn join(
        &self,
        connection: &ConnectionHandle,
        session_id: &SessionId,
        user_id: &str,
        role: Role,
    ) -> Result<(), JoinRejection> {
        self.gate.authorize_join(session_id, user_id, role).await?;

        let participants = self
            .registry
            .occupy(session_id, role, connection.clone(), user_id)
            .await?;

        tracing::info!(
            %session_id,
            connection_id = %connection.id(),
            %role,
            user_id,
            "participant joined"
        );

        let announcement = OutboundMessage::ParticipantJoined {
            role,
            user_id: user_id.to_string(),
            participants,
        };
        self.registry.broadcast(session_id, &announcement, None).await;
        Ok(())
    }

    /// Handles an explicit `leave`: clears the `role` slot only if
    /// `connection_id` holds it and tells the remaining occupant.
    ///
    /// Returns `true` if a slot was cleared. A missing room is a no-op.
    pub async fn leave(
        &self,
        connection_id: ConnectionId,
        session_id: &SessionId,
        role: Role,
    ) -> bool {
        if !self.registry.release(session_id, role, connection_id).await {
            tracing::debug!(%session_id, %connection_id, %role, "leave for slot not held");
            return false;
        }
        tracing::info!(%session_id, %connection_id, %role, "participant left");
        self.announce_departure(session_id, role).await;
        true
    }

    /// Forwards a payload event from `sender` to the other occupant.
    ///
    /// Only connections that occupy a slot in the room may relay into it.
    /// Returns the number of connections the event was queued for.
    pub async fn relay(
        &self,
        sender: ConnectionId,
        session_id: &SessionId,
        message: OutboundMessage,
    ) -> usize {
        if !self.registry.is_occupant(session_id, sender).await {
            tracing::debug!(
                %session_id,
                connection_id = %sender,
                event_type = message.event_type_str(),
                "dropping payload from non-occupant"
            );
            return 0;
        }
        self.registry
            .broadcast(session_id, &message, Some(sender))
            .await
    }

    /// Cleans up after a closed connection: clears every slot it held and
    /// sends one `participant_left` per cleared slot to the remaining
    /// occupant.
    ///
    /// Returns the slots that were cleared.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Vec<(SessionId, Role)> {
        let released = self.registry.release_connection(connection_id).await;
        for (session_id, role) in &released {
            tracing::info!(%session_id, %connection_id, %role, "participant disconnected");
            self.announce_departure(session_id, *role).await;
        }
        released
    }

    /// Lists the ids of all active rooms.
    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.registry.session_ids().await
    }

    /// Returns who currently occupies the session's room, if it is active.
    pub async fn room_participants(&self, session_id: &SessionId) -> Option<RoomParticipants> {
        self.registry.get(session_id).await
    }

    async fn announce_departure(&self, session_id: &SessionId, role: Role) {
        let message = OutboundMessage::ParticipantLeft { role };
        self.registry.broadcast(session_id, &message, None).await;
    }
}
