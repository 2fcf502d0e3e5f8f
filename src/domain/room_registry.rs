//! In-memory room table with a connection reverse index.
//!
//! [`RoomRegistry`] is the only mutable shared state in the relay. A single
//! [`tokio::sync::RwLock`] guards both the session→room map and the
//! connection→slot index so that slot assignment, slot clearing, and
//! empty-room removal are observed atomically by every other caller.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::room::{Room, RoomParticipants};
use super::{
    ConnectionHandle, ConnectionId, Delivery, OutboundMessage, Participants, Role, SessionId,
};
use crate::error::JoinRejection;

#[derive(Debug, Default)]
struct RegistryState {
    rooms: HashMap<SessionId, Room>,
    slots_by_connection: HashMap<ConnectionId, HashSet<(SessionId, Role)>>,
}

impl RegistryState {
    fn get_or_create(&mut self, session_id: &SessionId) -> &mut Room {
        self.rooms
            .entry(session_id.clone())
            .or_insert_with(|| {
                tracing::debug!(%session_id, "room created");
                Room::new(session_id.clone())
            })
    }

    fn unindex(&mut self, connection_id: ConnectionId, session_id: &SessionId, role: Role) {
        if let Some(slots) = self.slots_by_connection.get_mut(&connection_id) {
            slots.remove(&(session_id.clone(), role));
            if slots.is_empty() {
                self.slots_by_connection.remove(&connection_id);
            }
        }
    }

    fn remove_if_empty(&mut self, session_id: &SessionId) -> bool {
        if self.rooms.get(session_id).is_some_and(Room::is_empty) {
            self.rooms.remove(session_id);
            tracing::debug!(%session_id, "room removed");
            true
        } else {
            false
        }
    }
}

/// Central store for all active session rooms.
///
/// # Invariants
///
/// - A room is present iff at least one of its slots is occupied. Every
///   operation that clears a slot removes the room in the same critical
///   section when it becomes empty.
/// - Each `(session, role)` slot holds at most one connection; a second
///   occupant replaces the first (last writer wins).
/// - The reverse index lists exactly the slots each connection occupies.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    state: RwLock<RegistryState>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `handle` in the `role` slot of the session's room, creating
    /// the room on first use.
    ///
    /// Returns the slot occupancy after the assignment.
    ///
    /// # Errors
    ///
    /// Returns [`JoinRejection::Unauthorized`] if the room already recorded
    /// a different user id for `role`. The attempt is logged on the
    /// `security` target and the room is left untouched.
    pub async fn occupy(
        &self,
        session_id: &SessionId,
        role: Role,
        handle: ConnectionHandle,
        user_id: &str,
    ) -> Result<Participants, JoinRejection> {
        let mut state = self.state.write().await;

        if let Some(room) = state.rooms.get(session_id)
            && let Some(recorded) = room.recorded_user_id(role)
            && recorded != user_id
        {
            tracing::warn!(
                target: "security",
                %session_id,
                attempted_user_id = user_id,
                attempted_role = %role,
                "join rejected: slot is recorded for another user"
            );
            return Err(JoinRejection::Unauthorized);
        }

        let connection_id = handle.id();
        let room = state.get_or_create(session_id);
        let displaced = room.occupy(role, handle, user_id.to_string());
        let participants = room.participants();

        if let Some(previous) = displaced
            && previous.id() != connection_id
        {
            tracing::info!(
                %session_id,
                %role,
                displaced = %previous.id(),
                replacement = %connection_id,
                "slot taken over by new connection"
            );
            state.unindex(previous.id(), session_id, role);
        }
        state
            .slots_by_connection
            .entry(connection_id)
            .or_default()
            .insert((session_id.clone(), role));

        Ok(participants)
    }

    /// Clears the `role` slot if `connection_id` holds it, removing the
    /// room when it becomes empty.
    ///
    /// Returns `true` if the slot was cleared.
    pub async fn release(
        &self,
        session_id: &SessionId,
        role: Role,
        connection_id: ConnectionId,
    ) -> bool {
        let mut state = self.state.write().await;
        let Some(room) = state.rooms.get_mut(session_id) else {
            return false;
        };
        if !room.vacate(role, connection_id) {
            return false;
        }
        state.unindex(connection_id, session_id, role);
        state.remove_if_empty(session_id);
        true
    }

    /// Clears every slot held by `connection_id`, removing rooms that
    /// become empty.
    ///
    /// Returns the slots that were cleared.
    pub async fn release_connection(&self, connection_id: ConnectionId) -> Vec<(SessionId, Role)> {
        let mut state = self.state.write().await;
        let Some(slots) = state.slots_by_connection.remove(&connection_id) else {
            return Vec::new();
        };

        let mut released = Vec::with_capacity(slots.len());
        for (session_id, role) in slots {
            let vacated = state
                .rooms
                .get_mut(&session_id)
                .is_some_and(|room| room.vacate(role, connection_id));
            if vacated {
                state.remove_if_empty(&session_id);
                released.push((session_id, role));
            }
        }
        released
    }

    /// Removes the session's room if both slots are empty.
    ///
    /// Returns `true` if a room was removed. Absent rooms are a no-op.
    pub async fn remove_if_empty(&self, session_id: &SessionId) -> bool {
        self.state.write().await.remove_if_empty(session_id)
    }

    /// Delivers `message` to every open occupant of the session's room
    /// except `exclude`.
    ///
    /// Returns the number of connections the message was queued for. A
    /// missing room or closed connection is skipped, never an error.
    pub async fn broadcast(
        &self,
        session_id: &SessionId,
        message: &OutboundMessage,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let state = self.state.read().await;
        let Some(room) = state.rooms.get(session_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (role, handle) in room.occupants() {
            if Some(handle.id()) == exclude || !handle.is_open() {
                continue;
            }
            if handle.send(message.clone()) == Delivery::Queued {
                delivered += 1;
            } else {
                tracing::debug!(%session_id, %role, "skipped unready occupant");
            }
        }
        delivered
    }

    /// Returns `true` if `connection_id` occupies a slot in the session's room.
    pub async fn is_occupant(&self, session_id: &SessionId, connection_id: ConnectionId) -> bool {
        self.state
            .read()
            .await
            .rooms
            .get(session_id)
            .is_some_and(|room| room.holds(connection_id))
    }

    /// Returns a snapshot of the session's room, if one is active.
    pub async fn get(&self, session_id: &SessionId) -> Option<RoomParticipants> {
        self.state
            .read()
            .await
            .rooms
            .get(session_id)
            .map(RoomParticipants::from)
    }

    /// Returns the ids of all active rooms, sorted.
    pub async fn session_ids(&self) -> Vec<SessionId> {
        let state = self.state.read().await;
        let mut ids: Vec<SessionId> = state.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of active rooms.
    pub async fn len(&self) -> usize {
        self.state.read().await.rooms.len()
    }

    /// Returns `true` if no room is active.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.rooms.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tokio::sync::mpsc;

    fn sid() -> SessionId {
        SessionId::from("s1")
    }

    fn conn() -> (ConnectionHandle, mpsc::Receiver<OutboundMessage>) {
        ConnectionHandle::channel(8)
    }

    fn part() -> OutboundMessage {
        OutboundMessage::PartUpdated {
            part: serde_json::json!({ "id": "p1" }),
        }
    }

    #[tokio::test]
    async fn occupy_creates_room_and_reports_participants() {
        let registry = RoomRegistry::new();
        let (t, _rx) = conn();

        let Ok(participants) = registry.occupy(&sid(), Role::Therapist, t, "t1").await else {
            panic!("occupy failed");
        };
        assert!(participants.therapist);
        assert!(!participants.client);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.session_ids().await, vec![sid()]);
    }

    #[tokio::test]
    async fn room_removed_when_last_slot_released() {
        let registry = RoomRegistry::new();
        let (t, _rx1) = conn();
        let (c, _rx2) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, t.clone(), "t1").await;
        let _ = registry.occupy(&sid(), Role::Client, c.clone(), "c1").await;

        assert!(registry.release(&sid(), Role::Therapist, t.id()).await);
        assert!(registry.get(&sid()).await.is_some());

        assert!(registry.release(&sid(), Role::Client, c.id()).await);
        assert!(registry.get(&sid()).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn release_by_non_holder_is_noop() {
        let registry = RoomRegistry::new();
        let (t, _rx1) = conn();
        let (stranger, _rx2) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, t, "t1").await;

        assert!(!registry.release(&sid(), Role::Therapist, stranger.id()).await);
        assert!(!registry.release(&SessionId::from("nope"), Role::Client, stranger.id()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn second_join_displaces_first_connection() {
        let registry = RoomRegistry::new();
        let (old, mut old_rx) = conn();
        let (new, mut new_rx) = conn();
        let (c, _rx) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, old.clone(), "t1").await;
        let _ = registry.occupy(&sid(), Role::Therapist, new.clone(), "t1").await;
        let _ = registry.occupy(&sid(), Role::Client, c.clone(), "c1").await;

        assert!(!registry.is_occupant(&sid(), old.id()).await);
        assert_eq!(registry.broadcast(&sid(), &part(), Some(c.id())).await, 1);
        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn displaced_connection_disconnect_leaves_replacement() {
        let registry = RoomRegistry::new();
        let (old, _rx1) = conn();
        let (new, _rx2) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, old.clone(), "t1").await;
        let _ = registry.occupy(&sid(), Role::Therapist, new.clone(), "t1").await;

        assert!(registry.release_connection(old.id()).await.is_empty());
        assert!(registry.is_occupant(&sid(), new.id()).await);
    }

    #[tokio::test]
    async fn recorded_identity_mismatch_is_rejected() {
        let registry = RoomRegistry::new();
        let (t, _rx1) = conn();
        let (imposter, _rx2) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, t.clone(), "t1").await;

        let result = registry
            .occupy(&sid(), Role::Therapist, imposter.clone(), "x9")
            .await;
        assert_eq!(result, Err(JoinRejection::Unauthorized));
        assert!(registry.is_occupant(&sid(), t.id()).await);
        assert!(!registry.is_occupant(&sid(), imposter.id()).await);
    }

    #[tokio::test]
    async fn release_connection_clears_every_room() {
        let registry = RoomRegistry::new();
        let (shared, _rx1) = conn();
        let (c, _rx2) = conn();
        let other = SessionId::from("s2");
        let _ = registry.occupy(&sid(), Role::Therapist, shared.clone(), "t1").await;
        let _ = registry.occupy(&other, Role::Therapist, shared.clone(), "t1").await;
        let _ = registry.occupy(&other, Role::Client, c, "c2").await;

        let mut released = registry.release_connection(shared.id()).await;
        released.sort();
        assert_eq!(
            released,
            vec![(sid(), Role::Therapist), (other.clone(), Role::Therapist)]
        );
        assert!(registry.get(&sid()).await.is_none());
        assert!(registry.get(&other).await.is_some());
        assert!(registry.release_connection(shared.id()).await.is_empty());
    }

    #[tokio::test]
    async fn broadcast_skips_closed_connections() {
        let registry = RoomRegistry::new();
        let (t, t_rx) = conn();
        let (c, mut c_rx) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, t, "t1").await;
        let _ = registry.occupy(&sid(), Role::Client, c, "c1").await;
        drop(t_rx);

        assert_eq!(registry.broadcast(&sid(), &part(), None).await, 1);
        assert_eq!(c_rx.try_recv().ok(), Some(part()));
    }

    #[tokio::test]
    async fn broadcast_to_missing_room_is_noop() {
        let registry = RoomRegistry::new();
        assert_eq!(registry.broadcast(&sid(), &part(), None).await, 0);
    }

    #[tokio::test]
    async fn remove_if_empty_keeps_occupied_room() {
        let registry = RoomRegistry::new();
        let (t, _rx) = conn();
        let _ = registry.occupy(&sid(), Role::Therapist, t, "t1").await;
        assert!(!registry.remove_if_empty(&sid()).await);
        assert!(!registry.remove_if_empty(&SessionId::from("absent")).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_joins_leave_one_occupant_per_slot() {
        let registry = Arc::new(RoomRegistry::new());
        let mut inboxes = Vec::new();
        let mut joins = Vec::new();
        for _ in 0..200 {
            let (handle, rx) = conn();
            inboxes.push(rx);
            let registry = Arc::clone(&registry);
            joins.push(tokio::spawn(async move {
                let id = handle.id();
                let joined = registry.occupy(&sid(), Role::Therapist, handle, "t1").await;
                (id, joined.is_ok())
            }));
        }

        let mut ids = Vec::new();
        for join in joins {
            let Ok((id, joined)) = join.await else {
                panic!("join task panicked");
            };
            assert!(joined);
            ids.push(id);
        }

        let mut occupants = 0;
        for id in &ids {
            if registry.is_occupant(&sid(), *id).await {
                occupants += 1;
            }
        }
        assert_eq!(occupants, 1);
        {
            let state = registry.state.read().await;
            assert_eq!(state.slots_by_connection.len(), 1);
            let Some(room) = state.rooms.get(&sid()) else {
                panic!("room should exist");
            };
            assert!(room.participants().therapist);
            assert!(!room.participants().client);
        }

        let mut releases = Vec::new();
        for id in ids {
            let registry = Arc::clone(&registry);
            releases.push(tokio::spawn(async move {
                registry.release_connection(id).await.len()
            }));
        }
        let mut released = 0;
        for release in releases {
            let Ok(count) = release.await else {
                panic!("release task panicked");
            };
            released += count;
        }
        assert_eq!(released, 1);
        assert!(registry.is_empty().await);
        assert!(registry.state.read().await.slots_by_connection.is_empty());
    }
}
