//! Sending half of a relay connection, as stored in a room slot.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::{ConnectionId, OutboundMessage};

/// Result of offering a message to a connection's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message was queued for the socket writer.
    Queued,
    /// The connection is no longer open; nothing was sent.
    Closed,
    /// The outbound queue is full; the message was dropped.
    Full,
}

/// Cloneable handle that lets the relay push messages to one socket.
///
/// The socket's connection loop owns the matching receiver. Once that loop
/// exits the handle reports itself closed and every send is skipped.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<OutboundMessage>,
}

impl ConnectionHandle {
    /// Creates a handle with a fresh id and returns it together with the
    /// receiver the connection loop drains.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ConnectionId::new(),
                sender,
            },
            receiver,
        )
    }

    /// Returns this connection's identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` while the connection loop is still draining messages.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues a message without waiting.
    pub fn send(&self, message: OutboundMessage) -> Delivery {
        match self.sender.try_send(message) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
            Err(TrySendError::Full(msg)) => {
                tracing::warn!(
                    connection_id = %self.id,
                    event_type = msg.event_type_str(),
                    "outbound buffer full, dropping message"
                );
                Delivery::Full
            }
        }
    }
}
