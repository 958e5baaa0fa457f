use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::engine::BotEngine;

/// Run the whale watch loop. Polls tracked wallet addresses for fresh
/// buys and turns hits into whale-follow signals.
pub async fn run_whale_watch(engine: Arc<BotEngine>, epoch: u64) {
    let mut ticker = interval(Duration::from_secs(
        engine.config().whale_poll_interval_secs,
    ));

    loop {
        ticker.tick().await;

        if !engine.is_current(epoch).await {
            break;
        }

        engine.whale_tick(Some(epoch)).await;
    }

    tracing::debug!(epoch, "whale watch loop exited");
}
