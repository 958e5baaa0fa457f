//! User-adjustable trading settings, persisted as a JSON document.
//!
//! The document is read once at startup and rewritten whenever a client
//! saves settings. Trading knobs live alongside integration fields (RPC
//! endpoints, oracle and messaging credentials) in one flat file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Chain;

// --- Trading parameters -----------------------------------------------------

/// Knobs read by the scorer, the execution gate, and the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Signals below this confidence are rejected by the gate.
    pub min_confidence: u8,
    /// Quote size for each auto-opened position.
    pub position_size: Decimal,
    /// Close a position once unrealized gain reaches this percentage.
    pub take_profit: Decimal,
    /// Close a position once unrealized loss reaches this percentage.
    pub stop_loss: Decimal,
    pub slippage_tolerance: Decimal,
    /// Cap on buy admissions inside one rolling rate-limit window.
    pub max_trades_per_period: u32,
    pub auto_buy_enabled: bool,
    /// Auto-buy fires only at or above this confidence.
    pub auto_buy_threshold: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_confidence: 80,
            position_size: Decimal::from(100),
            take_profit: Decimal::from(50),
            stop_loss: Decimal::from(10),
            slippage_tolerance: Decimal::from(5),
            max_trades_per_period: 20,
            auto_buy_enabled: false,
            auto_buy_threshold: 85,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_confidence > 99 {
            return Err(format!("minConfidence must be <= 99, got {}", self.min_confidence));
        }
        if self.auto_buy_threshold > 99 {
            return Err(format!(
                "autoBuyThreshold must be <= 99, got {}",
                self.auto_buy_threshold
            ));
        }
        if self.position_size <= Decimal::ZERO {
            return Err("positionSize must be positive".into());
        }
        if self.take_profit <= Decimal::ZERO {
            return Err("takeProfit must be a positive percentage".into());
        }
        if self.stop_loss <= Decimal::ZERO {
            return Err("stopLoss must be a positive percentage".into());
        }
        if self.slippage_tolerance < Decimal::ZERO || self.slippage_tolerance > Decimal::from(100) {
            return Err("slippageTolerance must be within 0..=100".into());
        }
        if self.max_trades_per_period == 0 {
            return Err("maxTradesPerPeriod must be at least 1".into());
        }
        Ok(())
    }
}

// --- Persisted document -----------------------------------------------------

/// The full on-disk settings document. Trading knobs are flattened to the
/// top level so the file matches the shape clients send over the socket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDoc {
    #[serde(flatten)]
    pub trading: Settings,

    /// Per-chain RPC endpoints, consulted by execution backends.
    pub rpc: BTreeMap<Chain, String>,

    pub ai_provider: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: Option<String>,
    pub ai_max_tokens: Option<u32>,

    pub telegram_bot_token: Option<String>,
    pub telegram_channel_id: Option<String>,
    pub telegram_group_id: Option<String>,
}

impl SettingsDoc {
    pub fn rpc_endpoint(&self, chain: Chain) -> Option<&str> {
        self.rpc.get(&chain).map(String::as_str).filter(|s| !s.is_empty())
    }
}

// --- File store -------------------------------------------------------------

/// Loads and saves the settings document at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, falling back to defaults when the file does not
    /// exist yet. A present-but-unreadable file is an error.
    pub fn load(&self) -> anyhow::Result<SettingsDoc> {
        if !self.path.exists() {
            return Ok(SettingsDoc::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("read {}: {e}", self.path.display()))?;
        let doc = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("parse {}: {e}", self.path.display()))?;
        Ok(doc)
    }

    pub fn save(&self, doc: &SettingsDoc) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| anyhow::anyhow!("create {}: {e}", parent.display()))?;
            }
        }
        let content = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, content)
            .map_err(|e| anyhow::anyhow!("write {}: {e}", self.path.display()))?;
        Ok(())
    }
}
