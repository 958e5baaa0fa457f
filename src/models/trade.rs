use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Chain, TradeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// One executed trade. Appended to the bounded trade log at fill time;
/// position closes update its status but only log overflow evicts it.
/// Shares its id with the position it opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TradeKind,
    pub token: String,
    pub address: String,
    pub chain: Chain,
    /// Fill price reported by the execution backend.
    pub price: Decimal,
    pub size: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: TradeStatus,
}
