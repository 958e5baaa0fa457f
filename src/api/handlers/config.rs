use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::config::{AI_PROVIDERS, DATA_SOURCES};
use crate::models::Chain;

/// Static capability listing for client setup screens. Settings changes
/// themselves flow over the WebSocket.
pub async fn capabilities() -> impl IntoResponse {
    let chains: Vec<&str> = Chain::ALL.iter().map(Chain::as_str).collect();

    Json(json!({
        "supportedChains": chains,
        "dataSources": DATA_SOURCES,
        "aiProviders": AI_PROVIDERS,
    }))
}
