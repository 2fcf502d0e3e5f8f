//! session-relay server entry point.
//!
//! Starts the Axum HTTP server with the relay WebSocket and diagnostic
//! endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use session_relay::app_state::AppState;
use session_relay::config::{LogFormat, RelayConfig};
use session_relay::domain::RoomRegistry;
use session_relay::persistence::{InMemorySessionLookup, PostgresSessionLookup, SessionLookup};
use session_relay::service::{AuthorizationGate, RelayService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        ws_path = %config.ws_path,
        "starting session-relay"
    );

    // Build persistence layer
    let lookup = build_session_lookup(&config).await?;

    // Build domain + service layer
    let registry = Arc::new(RoomRegistry::new());
    let gate = AuthorizationGate::new(lookup, config.session_lookup_timeout());
    let relay = Arc::new(RelayService::new(registry, gate));

    // Build application state
    let app_state = AppState {
        relay,
        outbound_buffer_capacity: config.outbound_buffer_capacity,
    };

    // Build router
    let app = session_relay::build_router(app_state, &config.ws_path);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Chooses the session store: PostgreSQL when persistence is enabled,
/// otherwise the in-memory lookup (optionally seeded from fixtures).
async fn build_session_lookup(config: &RelayConfig) -> anyhow::Result<Arc<dyn SessionLookup>> {
    if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("connecting to session database")?;
        tracing::info!("session lookup backed by postgres");
        return Ok(Arc::new(PostgresSessionLookup::new(pool)));
    }

    let lookup = match &config.session_fixtures_path {
        Some(path) => InMemorySessionLookup::from_fixtures_file(path)?,
        None => InMemorySessionLookup::new(),
    };
    let sessions = lookup.len().await;
    if sessions == 0 {
        tracing::warn!(
            "persistence disabled and no session fixtures loaded; every join will be rejected"
        );
    } else {
        tracing::info!(sessions, "session lookup backed by in-memory fixtures");
    }
    Ok(Arc::new(lookup))
}
