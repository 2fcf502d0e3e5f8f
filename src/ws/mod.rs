//! WebSocket layer: upgrade, connection loop, message decoding, routing.
//!
//! The relay endpoint (default `/ws`) carries one UTF-8 JSON object per
//! text frame in each direction.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod router;

pub use router::MessageRouter;
