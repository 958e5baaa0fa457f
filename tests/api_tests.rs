mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use tower::ServiceExt;

use snipebot::api::router::create_router;
use snipebot::config::SettingsDoc;
use snipebot::AppState;

fn build_test_app() -> axum::Router {
    let bot = common::build_bot(vec![], &[], Decimal::ONE, 0.0, SettingsDoc::default());
    let state = AppState {
        engine: bot.engine.clone(),
        metrics_handle: common::metrics_handle(),
    };
    create_router(state)
}

#[tokio::test]
async fn test_health_check() {
    let app = build_test_app();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["running"], false);
    assert_eq!(json["walletCount"], 0);
    assert_eq!(json["whaleCount"], 0);
}

#[tokio::test]
async fn test_config_lists_capabilities() {
    let app = build_test_app();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let chains = json["supportedChains"].as_array().unwrap();
    assert!(chains.iter().any(|c| c == "base"));
    assert!(chains.iter().any(|c| c == "solana"));

    let sources = json["dataSources"].as_array().unwrap();
    assert!(sources.iter().any(|s| s == "dexscreener"));

    let providers = json["aiProviders"].as_array().unwrap();
    assert!(providers.iter().any(|p| p == "openai"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = build_test_app();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let _text = String::from_utf8(body.to_vec()).unwrap();
    // Endpoint returns valid text; metric names may or may not appear depending
    // on global recorder state in tests (only one recorder per process).
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = build_test_app();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/positions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("/api/positions"));
}
