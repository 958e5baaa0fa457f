pub mod api;
pub mod config;
pub mod custody;
pub mod engine;
pub mod errors;
pub mod execution;
pub mod market;
pub mod metrics;
pub mod models;
pub mod oracle;
pub mod pricing;
pub mod services;

use std::sync::Arc;

use crate::engine::BotEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BotEngine>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
