use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Chain, Recommendation};

/// A scored trading opportunity. Immutable after creation; lives in the
/// signal registry until consumed by execution or evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: Uuid,
    pub token: String,
    pub address: String,
    pub chain: Chain,
    pub price: Decimal,
    /// Clamped to the configured floor..=99.
    pub confidence: u8,
    pub recommendation: Recommendation,
    pub volume_24h: Decimal,
    pub liquidity: Decimal,
    pub change_24h: Decimal,
    pub source: SignalSource,
    pub created_at: DateTime<Utc>,
}

/// Where a signal came from. Whale-follow signals carry the whale's name so
/// the dashboard can attribute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SignalSource {
    Scanner,
    Whale { name: String },
    Sniper,
}

impl Signal {
    pub fn is_whale(&self) -> bool {
        matches!(self.source, SignalSource::Whale { .. })
    }
}
