use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Signal, Stats};

/// Interval digest pushed to dashboards as the `aiReport` event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicSummary {
    pub generated_at: DateTime<Utc>,
    pub running: bool,
    pub open_positions: usize,
    pub tracked_whales: usize,
    pub stats: Stats,
    pub top_signal: Option<Signal>,
    pub text: String,
}

impl PeriodicSummary {
    pub fn build(
        running: bool,
        stats: Stats,
        open_positions: usize,
        tracked_whales: usize,
        top_signal: Option<Signal>,
    ) -> Self {
        let text = format_summary(running, &stats, open_positions, &top_signal);
        Self {
            generated_at: Utc::now(),
            running,
            open_positions,
            tracked_whales,
            stats,
            top_signal,
            text,
        }
    }
}

fn format_summary(
    running: bool,
    stats: &Stats,
    open_positions: usize,
    top_signal: &Option<Signal>,
) -> String {
    let state = if running { "running" } else { "stopped" };
    let mut text = format!(
        "Bot {}: {} signals today, {} open positions, win rate {}%, total PnL {}.",
        state,
        stats.signals_today,
        open_positions,
        stats.win_rate,
        stats.total_pnl.round_dp(2),
    );
    if let Some(signal) = top_signal {
        text.push_str(&format!(
            " Top signal: {} on {} at {}% confidence ({}).",
            signal.token, signal.chain, signal.confidence, signal.recommendation,
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::models::{Chain, Recommendation, SignalSource};

    fn sample_signal() -> Signal {
        Signal {
            id: Uuid::new_v4(),
            token: "PEPE".into(),
            address: "0xabc".into(),
            chain: Chain::Base,
            price: Decimal::new(12, 7),
            change_24h: Decimal::from(42),
            volume_24h: Decimal::from(150_000),
            liquidity: Decimal::from(120_000),
            confidence: 85,
            recommendation: Recommendation::Buy,
            source: SignalSource::Scanner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_mentions_top_signal() {
        let summary = PeriodicSummary::build(true, Stats::default(), 2, 1, Some(sample_signal()));
        assert!(summary.text.contains("Bot running"));
        assert!(summary.text.contains("PEPE"));
        assert!(summary.text.contains("85% confidence"));
        assert_eq!(summary.open_positions, 2);
    }

    #[test]
    fn test_summary_without_signal_omits_top_line() {
        let summary = PeriodicSummary::build(false, Stats::default(), 0, 0, None);
        assert!(summary.text.contains("Bot stopped"));
        assert!(!summary.text.contains("Top signal"));
    }
}
