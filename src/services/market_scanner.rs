use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::engine::BotEngine;

/// Run the market scanner loop. Scans every configured chain on a fixed
/// cadence, scoring fresh tokens into signals and firing auto-buys. Exits
/// once the run it was spawned under is stopped or superseded.
pub async fn run_market_scanner(engine: Arc<BotEngine>, epoch: u64) {
    let mut ticker = interval(Duration::from_secs(engine.config().scan_interval_secs));

    loop {
        ticker.tick().await;

        if !engine.is_current(epoch).await {
            break;
        }

        for chain in engine.config().scan_chains.clone() {
            engine.scan_chain(chain, Some(epoch)).await;
        }
    }

    tracing::debug!(epoch, "market scanner loop exited");
}
