//! Voice webhooks called by the telephony provider
//!
//! The provider may use GET with query parameters or POST with a form
//! body; both carry the same fields.

use axum::extract::{Form, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::state::AppState;
use crate::twiml;

/// Destination used when the provider sends no `To`
const FALLBACK_DESTINATION: &str = "+1234567890";

#[derive(Debug, Default, Deserialize)]
pub struct VoiceParams {
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
}

pub async fn outbound_query(State(state): State<AppState>, Query(params): Query<VoiceParams>) -> Response {
    outbound(&state, params)
}

pub async fn outbound_form(State(state): State<AppState>, Form(params): Form<VoiceParams>) -> Response {
    outbound(&state, params)
}

pub async fn incoming_query(State(state): State<AppState>, Query(params): Query<VoiceParams>) -> Response {
    incoming(&state, params).await
}

pub async fn incoming_form(State(state): State<AppState>, Form(params): Form<VoiceParams>) -> Response {
    incoming(&state, params).await
}

fn outbound(state: &AppState, params: VoiceParams) -> Response {
    let to = match params.to.filter(|t| !t.trim().is_empty()) {
        Some(to) => to,
        None => {
            warn!("Outbound voice webhook without a To number");
            FALLBACK_DESTINATION.to_string()
        }
    };

    info!(
        "Outbound call to {} from {} (call {})",
        to,
        state.caller_id,
        params.call_sid.as_deref().unwrap_or("-")
    );
    xml(twiml::dial_number(&state.caller_id, &to))
}

async fn incoming(state: &AppState, params: VoiceParams) -> Response {
    let agent_id = match state.store.first_agent_id().await {
        Ok(Some(agent_id)) => agent_id,
        Ok(None) => state.fallback_agent_id.clone(),
        Err(e) => {
            warn!("Could not load an agent for routing: {}", e);
            state.fallback_agent_id.clone()
        }
    };

    info!(
        "Incoming call from {} to {} (call {}), routing to {}",
        params.from.as_deref().unwrap_or("-"),
        params.to.as_deref().unwrap_or("-"),
        params.call_sid.as_deref().unwrap_or("-"),
        agent_id
    );
    xml(twiml::ring_agent(&agent_id))
}

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
