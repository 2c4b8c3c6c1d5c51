//! OmniCall HTTP backend
//!
//! Serves the customer directory the softphone resolves callers against,
//! plus the voice webhooks the telephony provider calls to route calls:
//!
//! - `GET /`, `GET /health`
//! - `GET|POST /api/companies`
//! - `GET|POST /api/customers`, `GET /api/customers/by-phone?phone=`
//! - `POST /api/agents`
//! - `GET|POST /twilio/outbound-voice`, `GET|POST /twilio/incoming-call`
//!
//! Authentication is handled upstream; this service does not issue
//! sessions or provider tokens.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod twiml;

use std::sync::Arc;

use axum::Router;
use omnicall_directory_core::DirectoryStore;

pub use self::config::ServerConfig;
pub use self::error::ApiError;
pub use self::state::AppState;

/// Router for `store` configured from `config`
pub fn app(store: Arc<dyn DirectoryStore>, config: &ServerConfig) -> Router {
    api::router(AppState::new(store, config), &config.allowed_origins)
}
