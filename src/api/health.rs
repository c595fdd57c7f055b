use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use super::AppState;

/// Liveness: the process is up and serving requests.
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Readiness: storage answers within its deadline. The cache is optional and
/// never gates readiness.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.engine.storage_ready().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "error": e.code()})),
            )
        }
    }
}
