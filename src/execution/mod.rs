//! Trade execution.
//!
//! Orders go to a chain-family backend (EVM-style or account-model) via
//! the dispatcher, which owns the per-call timeout and normalizes every
//! failure shape into `ExecutionError`. Nothing here retries; the engine
//! decides what a failure means.

pub mod simulated;

pub use simulated::{SimulatedAccountBackend, SimulatedEvmBackend};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::ExecutionError;
use crate::models::{Chain, ChainFamily, CredentialHandle, TradeKind};

/// An order handed to a chain backend.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub kind: TradeKind,
    pub chain: Chain,
    pub token: String,
    pub token_address: String,
    pub price: Decimal,
    pub size: Decimal,
    pub slippage_tolerance: Decimal,
    pub rpc_endpoint: Option<String>,
}

/// Raw backend verdict.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub success: bool,
    pub filled_price: Option<Decimal>,
}

/// A confirmed fill. Price falls back to the requested price when the
/// backend does not report one.
#[derive(Debug, Clone, Copy)]
pub struct Fill {
    pub price: Decimal,
}

#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(
        &self,
        order: &OrderRequest,
        credential: CredentialHandle,
    ) -> Result<TradeOutcome, ExecutionError>;

    fn family(&self) -> ChainFamily;

    /// True for backends that cannot operate without a configured RPC
    /// endpoint for the order's chain.
    fn needs_endpoint(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes orders by chain family, bounding each call with a timeout.
pub struct TradeDispatcher {
    backends: HashMap<ChainFamily, Arc<dyn ExecutionBackend>>,
    timeout: Duration,
}

impl TradeDispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            backends: HashMap::new(),
            timeout,
        }
    }

    pub fn register(mut self, backend: Arc<dyn ExecutionBackend>) -> Self {
        self.backends.insert(backend.family(), backend);
        self
    }

    pub fn backend_for(&self, chain: Chain) -> Option<&Arc<dyn ExecutionBackend>> {
        self.backends.get(&chain.family())
    }

    /// Dispatch one order. An unfilled outcome, a transport error and a
    /// timeout all come back as `Err`; `Ok` always carries a fill price.
    pub async fn execute(
        &self,
        order: &OrderRequest,
        credential: CredentialHandle,
    ) -> Result<Fill, ExecutionError> {
        let backend = self
            .backends
            .get(&order.chain.family())
            .ok_or(ExecutionError::UnsupportedChain(order.chain))?;

        let outcome = tokio::time::timeout(self.timeout, backend.execute(order, credential))
            .await
            .map_err(|_| ExecutionError::Timeout)??;

        if !outcome.success {
            return Err(ExecutionError::Rejected(format!(
                "{} {} on {} not filled",
                order.kind, order.token, order.chain
            )));
        }

        Ok(Fill {
            price: outcome.filled_price.unwrap_or(order.price),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
