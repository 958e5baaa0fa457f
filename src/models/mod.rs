pub mod position;
pub mod signal;
pub mod stats;
pub mod trade;
pub mod wallet;
pub mod whale;

pub use position::{Position, PositionStatus};
pub use signal::{Signal, SignalSource};
pub use stats::Stats;
pub use trade::{Trade, TradeStatus};
pub use wallet::{CredentialHandle, Wallet, WalletView};
pub use whale::Whale;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Supported chains. Serialized as lowercase names on the wire
/// ("base", "ethereum", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Base,
    Ethereum,
    Bnb,
    Solana,
    Zora,
}

impl Chain {
    pub const ALL: [Chain; 5] = [
        Chain::Base,
        Chain::Ethereum,
        Chain::Bnb,
        Chain::Solana,
        Chain::Zora,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Base => "base",
            Chain::Ethereum => "ethereum",
            Chain::Bnb => "bnb",
            Chain::Solana => "solana",
            Chain::Zora => "zora",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "base" => Some(Chain::Base),
            "ethereum" | "eth" => Some(Chain::Ethereum),
            "bnb" | "bsc" => Some(Chain::Bnb),
            "solana" | "sol" => Some(Chain::Solana),
            "zora" => Some(Chain::Zora),
            _ => None,
        }
    }

    /// Execution-model family the chain belongs to. Decides which
    /// execution backend handles trades for it.
    pub fn family(&self) -> ChainFamily {
        match self {
            Chain::Solana => ChainFamily::AccountModel,
            _ => ChainFamily::Evm,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad execution-model families backends are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    AccountModel,
}

// ---------------------------------------------------------------------------
// TradeKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "buy"),
            TradeKind::Sell => write!(f, "sell"),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Action label attached to a signal, derived from its confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WATCH")]
    Watch,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "STRONG BUY"),
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Watch => write!(f, "WATCH"),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenRecord
// ---------------------------------------------------------------------------

/// One token/pair observation as returned by a market data source.
/// Ephemeral: produced per poll, scored, then dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub address: String,
    pub symbol: String,
    pub chain: Chain,
    pub price: Decimal,
    pub change_24h: Decimal,
    pub volume_24h: Decimal,
    pub liquidity: Decimal,
}
