use std::sync::Arc;
use std::time::Duration;

use snipebot::api::router::create_router;
use snipebot::config::{AppConfig, SettingsDoc, SettingsStore};
use snipebot::custody::InMemoryVault;
use snipebot::engine::BotEngine;
use snipebot::execution::{SimulatedAccountBackend, SimulatedEvmBackend, TradeDispatcher};
use snipebot::market::{activity, MarketCollector};
use snipebot::metrics::init_metrics;
use snipebot::pricing::RandomWalkPrices;
use snipebot::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let store = SettingsStore::new(&config.settings_path);
    let doc = match store.load() {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Settings file unreadable, starting from defaults");
            SettingsDoc::default()
        }
    };

    let metrics_handle = init_metrics();

    // --- Collaborators ---
    let collector = MarketCollector::from_config(&config);
    let activity = activity::from_config(&config);
    let prices = Arc::new(RandomWalkPrices::default());
    let dispatcher = TradeDispatcher::new(Duration::from_secs(config.execution_timeout_secs))
        .register(Arc::new(SimulatedEvmBackend::new(config.sim_fill_rate)))
        .register(Arc::new(SimulatedAccountBackend::new(config.sim_fill_rate)));
    let vault = Arc::new(InMemoryVault::new());

    let engine = Arc::new(BotEngine::new(
        config.clone(),
        doc,
        store,
        collector,
        activity,
        prices,
        dispatcher,
        vault,
    ));

    let state = AppState {
        engine: Arc::clone(&engine),
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(engine))
        .await?;

    Ok(())
}

/// Resolve on Ctrl-C, stopping the scheduled loops so in-flight work is
/// discarded before the server drains connections.
async fn shutdown_signal(engine: Arc<BotEngine>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, stopping bot");
    engine.stop().await;
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
