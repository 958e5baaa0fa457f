use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::Chain;

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// A market-data or price collaborator call failed. Never fatal: the
/// affected tick is aborted and retried on the next schedule.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("data source timed out")]
    Timeout,
}

/// The external scoring oracle failed. Callers fall back to the unblended
/// base score instead of failing the scoring call.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle returned unusable score: {0}")]
    Malformed(String),
}

/// A trade backend rejected or failed an execution. The trade is not
/// recorded and no position is created; the engine never retries.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("backend rejected order: {0}")]
    Rejected(String),

    #[error("backend transport failure: {0}")]
    Transport(String),

    #[error("no execution backend for chain {0}")]
    UnsupportedChain(Chain),

    #[error("execution timed out")]
    Timeout,
}

/// Custody collaborator failure while enrolling a credential.
#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    #[error("credential rejected: {0}")]
    Rejected(String),
}

/// Per-chain configuration problem. Skips that chain's tick; other chains
/// are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no RPC endpoint configured for chain {0}")]
    MissingRpcEndpoint(Chain),
}

// ---------------------------------------------------------------------------
// HTTP surface error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
