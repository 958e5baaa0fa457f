use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::engine::BotEngine;

/// Run the periodic report loop. Broadcasts an interval digest of bot
/// health and the strongest live signal.
pub async fn run_reporter(engine: Arc<BotEngine>, epoch: u64) {
    let mut ticker = interval(Duration::from_secs(engine.config().report_interval_secs));

    loop {
        ticker.tick().await;

        if !engine.is_current(epoch).await {
            break;
        }

        engine.report_tick().await;
    }

    tracing::debug!(epoch, "reporter loop exited");
}
