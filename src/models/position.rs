use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Chain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// An open or closed holding, tracked for profit/loss. `entry_price` and
/// `size` are fixed at creation; `pnl`/`pnl_percent` describe the drift of
/// the latest valuation from entry. Shares its id with the trade that
/// opened it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: Uuid,
    pub token: String,
    pub address: String,
    pub chain: Chain,
    pub entry_price: Decimal,
    pub size: Decimal,
    pub status: PositionStatus,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Timestamp of the last revaluation, used to compute elapsed time for
    /// the price collaborator. Not part of the wire payload.
    #[serde(skip_serializing, default = "Utc::now")]
    pub last_valued_at: DateTime<Utc>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Price implied by the latest valuation: entry adjusted by the
    /// current percentage drift.
    pub fn marked_price(&self) -> Decimal {
        self.entry_price * (Decimal::ONE + self.pnl_percent / Decimal::ONE_HUNDRED)
    }
}
