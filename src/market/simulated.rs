//! Simulated market data for running without network access.
//!
//! Emits one randomized observation per poll, drawn from a fixed set of
//! demo tokens. Metric ranges are wide enough to exercise every scoring
//! band.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

use super::MarketDataSource;
use crate::errors::DataSourceError;
use crate::models::{Chain, TokenRecord};

pub(crate) const DEMO_TOKENS: &[(&str, Chain)] = &[
    ("PEPE", Chain::Base),
    ("WIF", Chain::Solana),
    ("BONK", Chain::Solana),
    ("FLOKI", Chain::Bnb),
    ("SHIB", Chain::Ethereum),
    ("PEOPLE", Chain::Base),
];

#[derive(Debug, Clone, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn new() -> Self {
        Self
    }

    fn random_address() -> String {
        let mut rng = rand::thread_rng();
        format!(
            "0x{:016x}{:016x}{:08x}",
            rng.gen::<u64>(),
            rng.gen::<u64>(),
            rng.gen::<u32>()
        )
    }

    /// Randomized observation for one demo token.
    fn observe(symbol: &str, chain: Chain) -> TokenRecord {
        let mut rng = rand::thread_rng();
        TokenRecord {
            address: Self::random_address(),
            symbol: symbol.to_string(),
            chain,
            price: Decimal::new(rng.gen_range(1..10_000), 6),
            change_24h: Decimal::from(rng.gen_range(-20..80)),
            volume_24h: Decimal::from(rng.gen_range(10_000..110_000)),
            liquidity: Decimal::from(rng.gen_range(50_000..550_000)),
        }
    }
}

#[async_trait]
impl MarketDataSource for SimulatedSource {
    async fn poll(&self, chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError> {
        let candidates: Vec<&str> = DEMO_TOKENS
            .iter()
            .filter(|(_, c)| *c == chain)
            .map(|(symbol, _)| *symbol)
            .collect();

        let picked = candidates.choose(&mut rand::thread_rng());
        Ok(picked
            .map(|symbol| vec![Self::observe(symbol, chain)])
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_poll_returns_token_for_chain() {
        let source = SimulatedSource::new();
        let tokens = source.poll(Chain::Solana).await.unwrap();
        assert_eq!(tokens.len(), 1);

        let token = &tokens[0];
        assert_eq!(token.chain, Chain::Solana);
        assert!(["WIF", "BONK"].contains(&token.symbol.as_str()));
        assert!(token.price > Decimal::ZERO);
        assert!(token.liquidity >= Decimal::from(50_000));
        assert!(token.address.starts_with("0x") && token.address.len() == 42);
    }

    #[tokio::test]
    async fn test_poll_empty_for_chain_without_demo_tokens() {
        let source = SimulatedSource::new();
        let tokens = source.poll(Chain::Zora).await.unwrap();
        assert!(tokens.is_empty());
    }
}
