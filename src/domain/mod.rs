//! Domain layer: identifiers, rooms, and the room registry.
//!
//! This module contains the relay's in-memory model: session and
//! connection identity, the two-slot [`Room`], the outbound event shapes,
//! and the [`RoomRegistry`] that owns every live room.

pub mod connection;
pub mod connection_id;
pub mod outbound;
pub mod role;
pub mod room;
pub mod room_registry;
pub mod session_id;

pub use connection::{ConnectionHandle, Delivery};
pub use connection_id::ConnectionId;
pub use outbound::{OutboundMessage, Participants};
pub use role::Role;
pub use room::{Room, RoomParticipants};
pub use room_registry::RoomRegistry;
pub use session_id::SessionId;
