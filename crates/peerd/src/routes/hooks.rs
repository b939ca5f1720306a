//! Topology event intake.
//!
//! The runtime posts each relation hook as `POST /hooks/<relation>-relation-<event>`
//! with the remote unit and, for `changed`, a snapshot of what it advertises.

use axum::{
    Json,
    extract::{Path, State},
};
use peers_common::{HookKind, PeersError, Scope, Settings};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HookRequest {
    /// Remote unit name (e.g. "unit-a/0")
    unit: String,
    /// Settings the remote unit currently advertises
    #[serde(default)]
    settings: Option<Settings>,
}

#[derive(Serialize)]
pub struct HookResponse {
    event: HookKind,
    unit: Scope,
    /// Flags now held by the unit's conversation
    states: Vec<String>,
}

pub async fn handle_hook(
    State(state): State<AppState>,
    Path(hook): Path<String>,
    Json(payload): Json<HookRequest>,
) -> Result<Json<HookResponse>, ApiError> {
    if payload.unit.is_empty() {
        return Err(PeersError::InvalidInput("unit must not be empty".into()).into());
    }

    let unit = Scope::new(payload.unit);
    let event = state
        .dispatch_hook(&hook, unit.clone(), payload.settings)
        .await?;

    let states = state
        .coordinator
        .read()
        .await
        .conversation_states(&unit)
        .unwrap_or_default();

    Ok(Json(HookResponse { event, unit, states }))
}
