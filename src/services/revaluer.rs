use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::engine::BotEngine;

/// Run the revaluation loop. Reprices every open position each tick and
/// closes the ones that crossed their take-profit or stop-loss bound.
pub async fn run_revaluer(engine: Arc<BotEngine>, epoch: u64) {
    let mut ticker = interval(Duration::from_secs(engine.config().revalue_interval_secs));

    loop {
        ticker.tick().await;

        if !engine.is_current(epoch).await {
            break;
        }

        engine.revalue_tick(Some(epoch)).await;
    }

    tracing::debug!(epoch, "revaluer loop exited");
}

/// Run the chain price ticker. Purely informational: pushes reference
/// prices to connected dashboards.
pub async fn run_price_ticker(engine: Arc<BotEngine>, epoch: u64) {
    let mut ticker = interval(Duration::from_secs(engine.config().price_tick_secs));

    loop {
        ticker.tick().await;

        if !engine.is_current(epoch).await {
            break;
        }

        engine.price_tick().await;
    }

    tracing::debug!(epoch, "price ticker loop exited");
}
