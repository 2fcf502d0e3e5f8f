//! Service layer: authorization and relay orchestration.

pub mod auth_gate;
pub mod relay_service;

pub use auth_gate::AuthorizationGate;
pub use relay_service::RelayService;
