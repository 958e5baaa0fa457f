//! DEX Screener market data source.
//!
//! API: `https://api.dexscreener.com/latest/dex/search`
//! Auth: none. Pairs come back for every chain; we keep the first ten
//! matching the requested chain's DEX Screener id.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use super::MarketDataSource;
use crate::errors::DataSourceError;
use crate::models::{Chain, TokenRecord};

const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_PAIRS_PER_SCAN: usize = 10;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Vec<PairDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairDto {
    #[serde(default)]
    chain_id: String,
    pair_address: String,
    base_token: BaseTokenDto,
    /// Stringified decimal, e.g. "0.0004156".
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    price_change: PriceChangeDto,
    #[serde(default)]
    volume: VolumeDto,
    #[serde(default)]
    liquidity: Option<LiquidityDto>,
}

#[derive(Debug, Deserialize)]
struct BaseTokenDto {
    symbol: String,
}

#[derive(Debug, Default, Deserialize)]
struct PriceChangeDto {
    #[serde(default)]
    h24: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeDto {
    #[serde(default)]
    h24: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct LiquidityDto {
    #[serde(default)]
    usd: Option<Decimal>,
}

impl PairDto {
    fn into_record(self, chain: Chain) -> Option<TokenRecord> {
        let price = self.price_usd.as_deref()?.parse::<Decimal>().ok()?;
        Some(TokenRecord {
            address: self.pair_address,
            symbol: self.base_token.symbol,
            chain,
            price,
            change_24h: self.price_change.h24.unwrap_or_default(),
            volume_24h: self.volume.h24.unwrap_or_default(),
            liquidity: self.liquidity.and_then(|l| l.usd).unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DexScreenerSource {
    http: Client,
    base_url: String,
}

impl Default for DexScreenerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DexScreenerSource {
    pub fn new() -> Self {
        Self::with_base_url(DEXSCREENER_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// DEX Screener uses "bsc" where we say "bnb".
    fn dex_chain_id(chain: Chain) -> &'static str {
        match chain {
            Chain::Bnb => "bsc",
            other => other.as_str(),
        }
    }
}

#[async_trait]
impl MarketDataSource for DexScreenerSource {
    async fn poll(&self, chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError> {
        let chain_id = Self::dex_chain_id(chain);
        let url = format!("{}/latest/dex/search", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("q", chain_id)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| DataSourceError::Malformed(e.to_string()))?;

        let tokens = body
            .pairs
            .into_iter()
            .filter(|p| p.chain_id == chain_id)
            .take(MAX_PAIRS_PER_SCAN)
            .filter_map(|p| p.into_record(chain))
            .collect();

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "dexscreener"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_parsing() {
        let json = r#"{
            "chainId": "base",
            "pairAddress": "0xabc123",
            "baseToken": {"symbol": "PEPE", "name": "Pepe"},
            "priceUsd": "0.0000012",
            "priceChange": {"h24": 42.5},
            "volume": {"h24": 150000.0},
            "liquidity": {"usd": 120000.0}
        }"#;
        let pair: PairDto = serde_json::from_str(json).unwrap();
        let record = pair.into_record(Chain::Base).unwrap();

        assert_eq!(record.symbol, "PEPE");
        assert_eq!(record.address, "0xabc123");
        assert_eq!(record.volume_24h, Decimal::from(150_000));
        assert_eq!(record.change_24h, Decimal::new(425, 1));
    }

    #[test]
    fn test_pair_without_price_is_dropped() {
        let json = r#"{
            "chainId": "base",
            "pairAddress": "0xabc123",
            "baseToken": {"symbol": "X"}
        }"#;
        let pair: PairDto = serde_json::from_str(json).unwrap();
        assert!(pair.into_record(Chain::Base).is_none());
    }

    #[test]
    fn test_bnb_maps_to_bsc() {
        assert_eq!(DexScreenerSource::dex_chain_id(Chain::Bnb), "bsc");
        assert_eq!(DexScreenerSource::dex_chain_id(Chain::Base), "base");
    }
}
