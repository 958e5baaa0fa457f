use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Chain;

/// An externally supplied address tracked for follow-trading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Whale {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub chain: Chain,
    /// When set, buy-like activity from this address may be executed
    /// automatically (still subject to the execution gate).
    pub auto_buy: bool,
    pub added_at: DateTime<Utc>,
}
