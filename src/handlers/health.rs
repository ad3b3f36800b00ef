use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;
use crate::state::AppState;

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = if state.upstreams.all_healthy() { "healthy" } else { "degraded" };

    Json(serde_json::json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "upstreams": state.upstreams.statuses(),
        "rate_limit_keys": state.rate_limiter.tracked_keys(),
        "checkout_mounts": state.checkout.mounted(),
    }))
}
