//! Position revaluation prices and chain reference prices.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::DataSourceError;
use crate::models::Chain;

/// Produces the next observed price for a holding, given the price it
/// was last valued at and the time elapsed since. The ledger never cares
/// whether that comes from a live oracle or a drift model.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn next_price(
        &self,
        last_price: Decimal,
        elapsed: Duration,
    ) -> Result<Decimal, DataSourceError>;

    /// Reference prices for the chains' native assets, for the dashboard
    /// price ticker.
    async fn chain_prices(&self) -> Result<BTreeMap<Chain, Decimal>, DataSourceError>;
}

// ---------------------------------------------------------------------------
// Random-walk model
// ---------------------------------------------------------------------------

/// Drift model: each observation moves the price by a uniform step in
/// `[-max_down, +max_up]`, independent of elapsed time. Defaults match a
/// volatile small-cap: -5% to +15% per tick.
#[derive(Debug, Clone)]
pub struct RandomWalkPrices {
    max_down: Decimal,
    max_up: Decimal,
}

impl Default for RandomWalkPrices {
    fn default() -> Self {
        Self {
            max_down: Decimal::new(5, 2),  // 0.05
            max_up: Decimal::new(15, 2),   // 0.15
        }
    }
}

impl RandomWalkPrices {
    pub fn new(max_down: Decimal, max_up: Decimal) -> Self {
        Self { max_down, max_up }
    }

    fn step(&self) -> Decimal {
        // Uniform over [-max_down, max_up] with basis-point resolution.
        let down_bps = (self.max_down * Decimal::from(10_000)).to_i64().unwrap_or(500);
        let up_bps = (self.max_up * Decimal::from(10_000)).to_i64().unwrap_or(1_500);
        let bps = rand::thread_rng().gen_range(-down_bps..=up_bps);
        Decimal::new(bps, 4)
    }
}

#[async_trait]
impl PriceSource for RandomWalkPrices {
    async fn next_price(
        &self,
        last_price: Decimal,
        _elapsed: Duration,
    ) -> Result<Decimal, DataSourceError> {
        Ok(last_price * (Decimal::ONE + self.step()))
    }

    async fn chain_prices(&self) -> Result<BTreeMap<Chain, Decimal>, DataSourceError> {
        let mut rng = rand::thread_rng();
        let mut prices = BTreeMap::new();
        // Reference levels per native asset, with a little noise.
        for (chain, base, spread) in [
            (Chain::Base, 3500, 100),
            (Chain::Ethereum, 2500, 150),
            (Chain::Bnb, 550, 30),
            (Chain::Solana, 100, 10),
            (Chain::Zora, 3500, 100),
        ] {
            let noise = Decimal::new(rng.gen_range(0..spread * 100), 2);
            prices.insert(chain, Decimal::from(base) + noise);
        }
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_walk_stays_within_step_bounds() {
        let source = RandomWalkPrices::default();
        let entry = Decimal::from(100);
        for _ in 0..200 {
            let next = source
                .next_price(entry, Duration::from_secs(60))
                .await
                .unwrap();
            assert!(next >= Decimal::from(95), "next {next} fell below -5%");
            assert!(next <= Decimal::from(115), "next {next} rose above +15%");
        }
    }

    #[tokio::test]
    async fn test_chain_prices_cover_all_chains() {
        let prices = RandomWalkPrices::default().chain_prices().await.unwrap();
        assert_eq!(prices.len(), Chain::ALL.len());
        assert!(prices[&Chain::Base] >= Decimal::from(3500));
        assert!(prices[&Chain::Solana] < Decimal::from(111));
    }
}
