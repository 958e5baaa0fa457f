//! Token discovery.
//!
//! A `MarketDataSource` lists candidate tokens for a chain; the
//! `MarketCollector` wraps the configured source and applies the
//! liquidity/volume floors before anything reaches the scorer.

pub mod activity;
pub mod dexscreener;
pub mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::errors::DataSourceError;
use crate::models::{Chain, TokenRecord};

/// Abstraction over market-data providers.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Recent candidate tokens for one chain. Implementations enforce
    /// their own request timeout; failures abort only this call.
    async fn poll(&self, chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError>;

    fn name(&self) -> &'static str;
}

/// The market data collector: one configured source plus floor filters.
#[derive(Clone)]
pub struct MarketCollector {
    source: Arc<dyn MarketDataSource>,
    min_liquidity: Decimal,
    min_volume: Decimal,
}

impl MarketCollector {
    pub fn new(source: Arc<dyn MarketDataSource>, min_liquidity: Decimal, min_volume: Decimal) -> Self {
        Self {
            source,
            min_liquidity,
            min_volume,
        }
    }

    /// Instantiate the source named in the config. Unknown names fall
    /// back to the simulated source so a typo cannot brick startup.
    pub fn from_config(config: &AppConfig) -> Self {
        let source: Arc<dyn MarketDataSource> = match config.data_source.as_str() {
            "dexscreener" => Arc::new(dexscreener::DexScreenerSource::new()),
            "simulated" => Arc::new(simulated::SimulatedSource::new()),
            other => {
                tracing::warn!(source = %other, "unknown data source, using simulated");
                Arc::new(simulated::SimulatedSource::new())
            }
        };
        Self::new(source, config.min_liquidity, config.min_volume)
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn poll(&self, chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError> {
        let tokens = self.source.poll(chain).await?;
        Ok(tokens
            .into_iter()
            .filter(|t| t.liquidity >= self.min_liquidity && t.volume_24h >= self.min_volume)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Vec<TokenRecord>);

    #[async_trait]
    impl MarketDataSource for FixedSource {
        async fn poll(&self, _chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn token(symbol: &str, liquidity: i64, volume: i64) -> TokenRecord {
        TokenRecord {
            address: format!("0x{symbol}"),
            symbol: symbol.into(),
            chain: Chain::Base,
            price: Decimal::ONE,
            change_24h: Decimal::ZERO,
            volume_24h: Decimal::from(volume),
            liquidity: Decimal::from(liquidity),
        }
    }

    #[tokio::test]
    async fn test_floor_filter_drops_thin_tokens() {
        let collector = MarketCollector::new(
            Arc::new(FixedSource(vec![
                token("DEEP", 50_000, 20_000),
                token("THIN", 5_000, 20_000),
                token("DEAD", 50_000, 100),
            ])),
            Decimal::from(10_000),
            Decimal::from(1_000),
        );

        let tokens = collector.poll(Chain::Base).await.unwrap();
        let symbols: Vec<_> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["DEEP"]);
    }
}
