use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running counters derived from registry accepts and position closes.
/// `win_rate` is an integer percentage over closed trades only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub signals_today: u32,
    pub winning_trades: u32,
    pub total_pnl: Decimal,
    pub win_rate: u32,
}
