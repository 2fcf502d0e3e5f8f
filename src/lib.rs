//! # session-relay
//!
//! Realtime collaborative-session relay for a therapy practice.
//!
//! Exactly two participants, one therapist and one client, join a shared
//! room keyed by session id and exchange live updates (shared notes,
//! protocol walkthrough state, cursor position, chat). Every `join` is
//! authorized against the session store; every payload is fanned out to
//! the other occupant only.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)          Operators (HTTP)
//!     │                            │
//!     ├── WS Handler (ws/)         ├── Diagnostics (api/)
//!     ├── MessageRouter (ws/)      │
//!     │                            │
//!     ├── RelayService (service/) ─┘
//!     ├── AuthorizationGate (service/)
//!     │       └── SessionLookup (persistence/) ── PostgreSQL
//!     │
//!     └── RoomRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use app_state::AppState;

/// Builds the full application router: diagnostics, the WebSocket
/// upgrade at `ws_path`, and (with the `swagger-ui` feature) the API docs.
pub fn build_router(state: AppState, ws_path: &str) -> Router {
    let router = Router::new()
        .merge(api::build_router())
        .route(ws_path, get(ws::handler::ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
