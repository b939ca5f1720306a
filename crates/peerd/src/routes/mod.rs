//! HTTP route handlers for peerd.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use peers_common::PeersError;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod health;
mod hooks;
mod relation;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // Topology events from the runtime
        .route("/hooks/{hook}", post(hooks::handle_hook))

        // Relation queries and broadcasts
        .nest("/relation", relation_routes())

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn relation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(relation::summary))
        .route("/ip-map", get(relation::ip_map))
        .route("/address", put(relation::set_address))
        .route("/settings", post(relation::send_all))
        .route("/local/{key}", get(relation::retrieve_local))
        .route("/remote/{key}", get(relation::retrieve_remote))
        .route("/units/{node_id}/advertised", get(relation::advertised))
}

/// Error returned by handlers, rendered as `{"error": "..."}`
pub struct ApiError(PeersError);

impl From<PeersError> for ApiError {
    fn from(err: PeersError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        tracing::debug!(status = %status, error = %self.0, "Request rejected");

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(AppConfig::default()))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_follows_availability() {
        let app = app();

        let (status, _) = send(&app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(
            &app,
            "POST",
            "/hooks/cluster-relation-changed",
            Some(json!({ "unit": "unit-a/0", "settings": { "private-address": "10.0.0.1" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event"], "changed");
        assert_eq!(body["states"], json!(["cluster.connected", "cluster.available"]));

        let (status, body) = send(&app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["peers"], 1);
    }

    #[tokio::test]
    async fn test_invalid_hook_is_rejected() {
        let app = app();

        let (status, body) = send(
            &app,
            "POST",
            "/hooks/cluster-relation-created",
            Some(json!({ "unit": "unit-a/0" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("cluster-relation-created"));

        let (status, _) = send(
            &app,
            "POST",
            "/hooks/db-relation-joined",
            Some(json!({ "unit": "mysql/0" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_unit_is_rejected() {
        let app = app();

        let (status, body) = send(
            &app,
            "POST",
            "/hooks/cluster-relation-joined",
            Some(json!({ "unit": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("unit must not be empty"));

        let (_, body) = send(&app, "GET", "/relation", None).await;
        assert_eq!(body["conversations"], json!([]));
    }

    #[tokio::test]
    async fn test_broadcast_and_queries() {
        let app = app();
        for (unit, addr) in [("unit-a/0", "10.0.0.1"), ("unit-a/1", "10.0.0.2")] {
            send(
                &app,
                "POST",
                "/hooks/cluster-relation-changed",
                Some(json!({ "unit": unit, "settings": { "private-address": addr } })),
            )
            .await;
        }

        let (status, body) = send(&app, "GET", "/relation/ip-map", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "node_id": "unit-a-0", "address": "10.0.0.1" },
                { "node_id": "unit-a-1", "address": "10.0.0.2" },
            ])
        );

        let (status, _) = send(
            &app,
            "PUT",
            "/relation/address",
            Some(json!({ "address_type": "internal", "address": "10.0.0.5" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            "POST",
            "/relation/settings",
            Some(json!({ "settings": { "vip": "10.0.0.100" }, "store_local": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", "/relation/local/vip", None).await;
        assert_eq!(body, json!(["10.0.0.100", "10.0.0.100"]));

        let (_, body) = send(&app, "GET", "/relation/remote/private-address", None).await;
        assert_eq!(body, json!(["10.0.0.1", "10.0.0.2"]));

        let (_, body) = send(&app, "GET", "/relation/remote/missing-key", None).await;
        assert_eq!(body, json!([]));

        let (status, body) = send(&app, "GET", "/relation/units/unit-a-1/advertised", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["internal-address"], "10.0.0.5");
        assert_eq!(body["vip"], "10.0.0.100");

        let (status, _) = send(&app, "GET", "/relation/units/unit-b-0/advertised", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_summary_after_depart() {
        let app = app();
        send(
            &app,
            "POST",
            "/hooks/cluster-relation-joined",
            Some(json!({ "unit": "unit-a/0" })),
        )
        .await;
        send(
            &app,
            "POST",
            "/hooks/cluster-relation-departed",
            Some(json!({ "unit": "unit-a/0" })),
        )
        .await;

        let (status, body) = send(&app, "GET", "/relation", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["relation"], "cluster");
        assert_eq!(body["states"], json!([]));
        assert_eq!(body["conversations"][0]["scope"], "unit-a/0");
        assert_eq!(body["conversations"][0]["states"], json!([]));
        assert_eq!(body["conversations"][0]["complete"], false);
    }
}
