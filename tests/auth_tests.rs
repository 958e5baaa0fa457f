// Kept in its own binary: API_TOKEN is process-global env state and must
// not race the other API tests.

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

async fn get_with_auth(app: axum::Router, uri: &str, auth: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth {
        builder = builder.header("authorization", value);
    }
    let resp = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    resp.status()
}

#[tokio::test]
async fn test_bearer_token_guards_protected_routes() {
    let app = build_test_app();
    std::env::set_var("API_TOKEN", "test-secret-token");

    // Missing and wrong tokens are rejected
    assert_eq!(
        get_with_auth(app.clone(), "/api/config", None).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        get_with_auth(app.clone(), "/api/config", Some("Bearer wrong")).await,
        StatusCode::UNAUTHORIZED
    );

    // Matching token passes
    assert_eq!(
        get_with_auth(app.clone(), "/api/config", Some("Bearer test-secret-token")).await,
        StatusCode::OK
    );

    // Health stays public
    assert_eq!(
        get_with_auth(app.clone(), "/health", None).await,
        StatusCode::OK
    );

    std::env::remove_var("API_TOKEN");

    // With no token configured, auth is disabled
    assert_eq!(
        get_with_auth(app, "/api/config", None).await,
        StatusCode::OK
    );
}
