//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single relay connection: inbound
//! text frames go through the [`MessageRouter`], outbound events queued by
//! the room registry are serialized and written back, and on exit the
//! connection's slots are released.

use std::panic::AssertUnwindSafe;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{FutureExt, SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::router::MessageRouter;
use crate::domain::{ConnectionHandle, OutboundMessage};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads frames from the client and routes each one in isolation.
/// - Drains `outbound_rx` (fed by room broadcasts) to the client.
/// - On close, read error, or write failure, releases every slot held by
///   `handle` and notifies the remaining occupants.
pub async fn run_connection(
    socket: WebSocket,
    router: MessageRouter,
    handle: ConnectionHandle,
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
) {
    let connection_id = handle.id();
    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::debug!(%connection_id, "ws connection opened");

    loop {
        tokio::select! {
            // Incoming frame from client
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        route_isolated(&router, &handle, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%connection_id, error = %e, "ws read error");
                        break;
                    }
                    _ => {}
                }
            }
            // Event queued by a room broadcast
            outbound = outbound_rx.recv() => {
                let Some(outbound) = outbound else {
                    break;
                };
                match serde_json::to_string(&outbound) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            %connection_id,
                            error = %e,
                            "failed to serialize outbound message"
                        );
                    }
                }
            }
        }
    }

    // Unready before its slots are released.
    drop(outbound_rx);
    router.relay().disconnect(connection_id).await;

    tracing::debug!(%connection_id, "ws connection closed");
}

/// Routes one frame; a panic inside the handler is logged and contained
/// so the connection stays usable.
async fn route_isolated(router: &MessageRouter, handle: &ConnectionHandle, text: &str) {
    let outcome = AssertUnwindSafe(router.route_text(handle, text))
        .catch_unwind()
        .await;
    if outcome.is_err() {
        tracing::error!(
            connection_id = %handle.id(),
            "message handler panicked, message dropped"
        );
    }
}
