//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service owning the room registry and authorization gate.
    pub relay: Arc<RelayService>,
    /// Depth of each new connection's outbound queue.
    pub outbound_buffer_capacity: usize,
}
