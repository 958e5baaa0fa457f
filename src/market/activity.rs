//! Chain activity feeds for whale tracking.
//!
//! A `ChainActivitySource` answers one question per poll: did this
//! address make a buy-like move since we last looked? The explorer
//! variant talks to any HTTP endpoint that lists recent transactions for
//! an address; the simulated variant fires randomly.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use super::simulated::DEMO_TOKENS;
use crate::config::AppConfig;
use crate::errors::DataSourceError;
use crate::models::Chain;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A buy-like event observed for a tracked address.
#[derive(Debug, Clone)]
pub struct BuyActivity {
    pub token_symbol: String,
    pub token_address: String,
    pub price: Decimal,
}

#[async_trait]
pub trait ChainActivitySource: Send + Sync {
    /// Most recent buy-like event for the address, if any.
    async fn recent_buy(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Option<BuyActivity>, DataSourceError>;

    fn name(&self) -> &'static str;
}

/// Pick the activity source named in the config.
pub fn from_config(config: &AppConfig) -> std::sync::Arc<dyn ChainActivitySource> {
    match (config.activity_source.as_str(), &config.activity_api_url) {
        ("explorer", Some(url)) => std::sync::Arc::new(ExplorerActivity::new(url.clone())),
        ("explorer", None) => {
            tracing::warn!("ACTIVITY_API_URL not set, falling back to simulated whale activity");
            std::sync::Arc::new(SimulatedActivity::default())
        }
        _ => std::sync::Arc::new(SimulatedActivity::default()),
    }
}

// ---------------------------------------------------------------------------
// Explorer-backed source
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerTx {
    #[serde(default, alias = "type")]
    side: Option<String>,
    #[serde(default)]
    token_symbol: Option<String>,
    #[serde(default)]
    token_address: Option<String>,
    #[serde(default)]
    price_usd: Option<Decimal>,
}

impl ExplorerTx {
    fn into_buy(self) -> Option<BuyActivity> {
        if !matches!(self.side.as_deref(), Some("buy") | Some("swap_in")) {
            return None;
        }
        Some(BuyActivity {
            token_symbol: self.token_symbol?,
            token_address: self.token_address?,
            price: self.price_usd.unwrap_or_default(),
        })
    }
}

/// Queries a transaction-list endpoint. The URL template takes `{chain}`
/// and `{address}` placeholders, e.g.
/// `https://explorer.example/api/v1/{chain}/txs?address={address}`.
#[derive(Debug, Clone)]
pub struct ExplorerActivity {
    http: Client,
    url_template: String,
}

impl ExplorerActivity {
    pub fn new(url_template: String) -> Self {
        Self {
            http: Client::new(),
            url_template,
        }
    }

    fn url_for(&self, chain: Chain, address: &str) -> String {
        self.url_template
            .replace("{chain}", chain.as_str())
            .replace("{address}", address)
    }
}

#[async_trait]
impl ChainActivitySource for ExplorerActivity {
    async fn recent_buy(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Option<BuyActivity>, DataSourceError> {
        let resp = self
            .http
            .get(self.url_for(chain, address))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let txs: Vec<ExplorerTx> = resp
            .json()
            .await
            .map_err(|e| DataSourceError::Malformed(e.to_string()))?;

        Ok(txs.into_iter().find_map(ExplorerTx::into_buy))
    }

    fn name(&self) -> &'static str {
        "explorer"
    }
}

// ---------------------------------------------------------------------------
// Simulated source
// ---------------------------------------------------------------------------

/// Fires a synthetic buy on a fraction of polls.
#[derive(Debug, Clone)]
pub struct SimulatedActivity {
    hit_rate: f64,
}

impl Default for SimulatedActivity {
    fn default() -> Self {
        Self { hit_rate: 0.15 }
    }
}

impl SimulatedActivity {
    pub fn with_hit_rate(hit_rate: f64) -> Self {
        Self { hit_rate }
    }
}

#[async_trait]
impl ChainActivitySource for SimulatedActivity {
    async fn recent_buy(
        &self,
        chain: Chain,
        _address: &str,
    ) -> Result<Option<BuyActivity>, DataSourceError> {
        let mut rng = rand::thread_rng();
        if !rng.gen_bool(self.hit_rate) {
            return Ok(None);
        }

        let candidates: Vec<&str> = DEMO_TOKENS
            .iter()
            .filter(|(_, c)| *c == chain)
            .map(|(symbol, _)| *symbol)
            .collect();
        let Some(symbol) = candidates.choose(&mut rng) else {
            return Ok(None);
        };

        Ok(Some(BuyActivity {
            token_symbol: symbol.to_string(),
            token_address: format!("0x{:016x}{:016x}{:08x}", rng.gen::<u64>(), rng.gen::<u64>(), rng.gen::<u32>()),
            price: Decimal::new(rng.gen_range(1..10_000), 6),
        }))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
