use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (running, wallet_count, whale_count) = state.engine.health_counts().await;

    Json(json!({
        "status": "ok",
        "running": running,
        "walletCount": wallet_count,
        "whaleCount": whale_count,
    }))
}
