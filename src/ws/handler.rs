//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use super::router::MessageRouter;
use crate::app_state::AppState;
use crate::domain::ConnectionHandle;

/// `GET /ws` — Upgrade HTTP connection to a relay WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let router = MessageRouter::new(Arc::clone(&state.relay));
    let (handle, outbound_rx) = ConnectionHandle::channel(state.outbound_buffer_capacity);

    ws.on_upgrade(move |socket| run_connection(socket, router, handle, outbound_rx))
}
