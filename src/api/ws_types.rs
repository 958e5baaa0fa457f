use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Settings, SettingsDoc};
use crate::engine::report::PeriodicSummary;
use crate::models::{Chain, Position, Signal, Stats, Trade, WalletView, Whale};

// ---------------------------------------------------------------------------
// Client -> engine commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWalletData {
    pub chain: Chain,
    pub private_key: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWhaleData {
    pub name: String,
    pub address: String,
    pub chain: Chain,
    #[serde(default)]
    pub auto_buy: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SniperBuyData {
    pub token: String,
    pub address: String,
    pub chain: Chain,
    pub price: Decimal,
}

/// Either a signal id or a token symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuySignalData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl BuySignalData {
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().or(self.token.as_deref())
    }
}

/// Commands a dashboard client may send over the socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum WsCommand {
    StartBot(Option<Settings>),
    StopBot,
    ScanMarket { chain: Chain },
    AddWallet(AddWalletData),
    AddWhale(AddWhaleData),
    RemoveWhale { address: String },
    SniperBuy(SniperBuyData),
    BuySignal(BuySignalData),
    ClosePosition { id: Uuid },
    SaveSettings(Box<SettingsDoc>),
}

// ---------------------------------------------------------------------------
// Engine -> client events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Dashboard activity-feed line.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub message: String,
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Utc::now(),
        }
    }
}

/// Full state pushed to every client on connect. Wallet credentials are
/// already redacted in `WalletView`; provider secrets never appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub running: bool,
    pub wallets: Vec<WalletView>,
    pub whales: Vec<Whale>,
    pub positions: Vec<Position>,
    pub signals: Vec<Signal>,
    pub stats: Stats,
    pub settings: Settings,
}

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum WsEvent {
    Init(Box<Snapshot>),
    Status { running: bool },
    Signal(Box<Signal>),
    WhaleSignal(Box<Signal>),
    Trade(Box<Trade>),
    Positions(Vec<Position>),
    Wallets(Vec<WalletView>),
    Whales(Vec<Whale>),
    Prices(BTreeMap<Chain, Decimal>),
    Stats(Stats),
    Log(LogEvent),
    AiReport(PeriodicSummary),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
