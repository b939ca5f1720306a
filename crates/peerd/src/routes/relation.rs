//! Relation-wide queries and broadcasts.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use peers_common::{PeersError, Settings};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ConversationSummary {
    scope: String,
    node_id: String,
    states: Vec<String>,
    /// Every required key has a non-empty value in `remote`
    complete: bool,
    remote: Settings,
    updated_at: i64,
}

#[derive(Serialize)]
pub struct RelationSummary {
    relation: String,
    required_keys: Vec<String>,
    states: Vec<String>,
    conversations: Vec<ConversationSummary>,
}

pub async fn summary(State(state): State<AppState>) -> Json<RelationSummary> {
    let coordinator = state.coordinator.read().await;
    let relation = coordinator.relation();

    let conversations = coordinator
        .registry()
        .all()
        .map(|conv| ConversationSummary {
            scope: conv.scope().to_string(),
            node_id: conv.scope().node_id(),
            states: conv.flags().map(|f| f.qualified(relation)).collect(),
            complete: coordinator.data_complete(conv),
            remote: conv.remote().clone(),
            updated_at: conv.updated_at(),
        })
        .collect();

    Json(RelationSummary {
        relation: relation.to_string(),
        required_keys: coordinator.required_keys().to_vec(),
        states: coordinator.active_states(),
        conversations,
    })
}

#[derive(Deserialize)]
pub struct IpMapQuery {
    address_key: Option<String>,
}

#[derive(Serialize)]
pub struct NodeAddress {
    node_id: String,
    address: Option<String>,
}

pub async fn ip_map(
    State(state): State<AppState>,
    Query(query): Query<IpMapQuery>,
) -> Json<Vec<NodeAddress>> {
    let address_key = query
        .address_key
        .unwrap_or_else(|| state.config.relation.address_key.clone());

    let nodes = state
        .coordinator
        .read()
        .await
        .ip_map(&address_key)
        .into_iter()
        .map(|(node_id, address)| NodeAddress { node_id, address })
        .collect();

    Json(nodes)
}

#[derive(Deserialize)]
pub struct SetAddress {
    address_type: String,
    address: String,
}

pub async fn set_address(
    State(state): State<AppState>,
    Json(payload): Json<SetAddress>,
) -> Result<StatusCode, ApiError> {
    if payload.address_type.is_empty() {
        return Err(PeersError::InvalidInput("address_type must not be empty".into()).into());
    }

    state
        .coordinator
        .write()
        .await
        .set_address(&payload.address_type, &payload.address);

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SendAll {
    settings: Settings,
    #[serde(default)]
    store_local: bool,
}

pub async fn send_all(
    State(state): State<AppState>,
    Json(payload): Json<SendAll>,
) -> StatusCode {
    state
        .coordinator
        .write()
        .await
        .send_all(&payload.settings, payload.store_local);

    StatusCode::NO_CONTENT
}

pub async fn retrieve_local(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<Vec<String>> {
    Json(state.coordinator.read().await.retrieve_local(&key))
}

pub async fn retrieve_remote(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<Vec<String>> {
    Json(state.coordinator.read().await.retrieve_remote(&key))
}

/// What this node advertises to one peer, for peers polling the relation
pub async fn advertised(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<Settings>, ApiError> {
    let coordinator = state.coordinator.read().await;
    let conv = coordinator
        .registry()
        .find_by_node_id(&node_id)
        .ok_or(PeersError::UnknownUnit(node_id))?;

    Ok(Json(conv.advertised().clone()))
}
