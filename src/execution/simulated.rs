//! Simulated chain backends.
//!
//! Both families fill at the requested price with a configurable success
//! probability. They stand in for real swap construction during paper
//! trading; nothing on-chain happens here.

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use super::{ExecutionBackend, OrderRequest, TradeOutcome};
use crate::errors::ExecutionError;
use crate::models::{ChainFamily, CredentialHandle};

/// EVM-family simulator (base, ethereum, bnb, zora).
#[derive(Debug, Clone)]
pub struct SimulatedEvmBackend {
    fill_rate: f64,
}

impl SimulatedEvmBackend {
    pub fn new(fill_rate: f64) -> Self {
        Self { fill_rate }
    }
}

#[async_trait]
impl ExecutionBackend for SimulatedEvmBackend {
    async fn execute(
        &self,
        order: &OrderRequest,
        credential: CredentialHandle,
    ) -> Result<TradeOutcome, ExecutionError> {
        let success = rand::thread_rng().gen_bool(self.fill_rate);
        info!(
            chain = %order.chain,
            token = %order.token,
            kind = %order.kind,
            size = %order.size,
            credential = %credential,
            success,
            "simulated EVM swap"
        );
        Ok(TradeOutcome {
            success,
            filled_price: Some(order.price),
        })
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }
}

/// Account-model simulator (solana).
#[derive(Debug, Clone)]
pub struct SimulatedAccountBackend {
    fill_rate: f64,
}

impl SimulatedAccountBackend {
    pub fn new(fill_rate: f64) -> Self {
        Self { fill_rate }
    }
}

#[async_trait]
impl ExecutionBackend for SimulatedAccountBackend {
    async fn execute(
        &self,
        order: &OrderRequest,
        credential: CredentialHandle,
    ) -> Result<TradeOutcome, ExecutionError> {
        let success = rand::thread_rng().gen_bool(self.fill_rate);
        info!(
            chain = %order.chain,
            token = %order.token,
            kind = %order.kind,
            size = %order.size,
            credential = %credential,
            success,
            "simulated account-model swap"
        );
        Ok(TradeOutcome {
            success,
            filled_price: Some(order.price),
        })
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::AccountModel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chain, TradeKind};
    use rust_decimal::Decimal;

    fn order(chain: Chain) -> OrderRequest {
        OrderRequest {
            kind: TradeKind::Buy,
            chain,
            token: "WIF".into(),
            token_address: "0xwif".into(),
            price: Decimal::TWO,
            size: Decimal::from(100),
            slippage_tolerance: Decimal::from(5),
            rpc_endpoint: None,
        }
    }

    #[tokio::test]
    async fn test_full_fill_rate_always_succeeds() {
        let backend = SimulatedEvmBackend::new(1.0);
        let outcome = backend
            .execute(&order(Chain::Base), CredentialHandle::new())
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.filled_price, Some(Decimal::TWO));
    }

    #[tokio::test]
    async fn test_zero_fill_rate_never_fills() {
        let backend = SimulatedAccountBackend::new(0.0);
        let outcome = backend
            .execute(&order(Chain::Solana), CredentialHandle::new())
            .await
            .unwrap();
        assert!(!outcome.success);
    }

    #[test]
    fn test_families() {
        assert_eq!(SimulatedEvmBackend::new(0.9).family(), ChainFamily::Evm);
        assert_eq!(
            SimulatedAccountBackend::new(0.9).family(),
            ChainFamily::AccountModel
        );
    }
}
