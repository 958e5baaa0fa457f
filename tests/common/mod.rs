use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use tempfile::TempDir;

use snipebot::config::{AppConfig, DayRollover, ScoringConfig, SettingsDoc, SettingsStore};
use snipebot::custody::InMemoryVault;
use snipebot::engine::BotEngine;
use snipebot::errors::{DataSourceError, ExecutionError};
use snipebot::execution::{ExecutionBackend, OrderRequest, TradeDispatcher, TradeOutcome};
use snipebot::market::activity::SimulatedActivity;
use snipebot::market::{MarketCollector, MarketDataSource};
use snipebot::models::{Chain, ChainFamily, CredentialHandle, TokenRecord};
use snipebot::pricing::PriceSource;

static METRICS: OnceLock<PrometheusHandle> = OnceLock::new();

/// One Prometheus recorder per test process; later installs would fail.
#[allow(dead_code)]
pub fn metrics_handle() -> PrometheusHandle {
    METRICS.get_or_init(snipebot::metrics::init_metrics).clone()
}

/// Deterministic market source: returns its fixed token list, filtered
/// by chain.
pub struct FixedMarket(pub Vec<TokenRecord>);

#[async_trait]
impl MarketDataSource for FixedMarket {
    async fn poll(&self, chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError> {
        Ok(self.0.iter().filter(|t| t.chain == chain).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Backend that pops one scripted outcome per order, filling once the
/// script runs out.
pub struct ScriptedBackend {
    family: ChainFamily,
    outcomes: Mutex<VecDeque<bool>>,
}

impl ScriptedBackend {
    pub fn evm(outcomes: &[bool]) -> Self {
        Self {
            family: ChainFamily::Evm,
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
        }
    }

    #[allow(dead_code)]
    pub fn account(outcomes: &[bool]) -> Self {
        Self {
            family: ChainFamily::AccountModel,
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
        }
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn execute(
        &self,
        order: &OrderRequest,
        _credential: CredentialHandle,
    ) -> Result<TradeOutcome, ExecutionError> {
        let success = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);
        Ok(TradeOutcome {
            success,
            filled_price: Some(order.price),
        })
    }

    fn family(&self) -> ChainFamily {
        self.family
    }
}

/// Multiplies the marked price by a fixed factor on every revaluation.
pub struct FactorPrices(pub Decimal);

#[async_trait]
impl PriceSource for FactorPrices {
    async fn next_price(
        &self,
        last_price: Decimal,
        _elapsed: Duration,
    ) -> Result<Decimal, DataSourceError> {
        Ok(last_price * self.0)
    }

    async fn chain_prices(&self) -> Result<BTreeMap<Chain, Decimal>, DataSourceError> {
        Ok(BTreeMap::from([(Chain::Base, Decimal::from(3500))]))
    }
}

#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        scan_chains: vec![Chain::Base],
        data_source: "simulated".into(),
        activity_source: "simulated".into(),
        activity_api_url: None,
        scan_interval_secs: 30,
        whale_poll_interval_secs: 45,
        price_tick_secs: 10,
        revalue_interval_secs: 60,
        report_interval_secs: 900,
        execution_timeout_secs: 5,
        min_liquidity: Decimal::ZERO,
        min_volume: Decimal::ZERO,
        scoring: ScoringConfig::default(),
        whale_confidence: 90,
        alert_confidence: 90,
        registry_cap: 50,
        registry_ttl_secs: 3600,
        trade_log_cap: 200,
        trade_period_secs: 86_400,
        stats_day_rollover: DayRollover::Utc,
        sim_fill_rate: 1.0,
        settings_path: "settings.json".into(),
    }
}

#[allow(dead_code)]
pub fn token(symbol: &str, chain: Chain, volume: i64, liquidity: i64, change: i64) -> TokenRecord {
    TokenRecord {
        address: format!("0x{}", symbol.to_lowercase()),
        symbol: symbol.into(),
        chain,
        price: Decimal::new(12, 4),
        change_24h: Decimal::from(change),
        volume_24h: Decimal::from(volume),
        liquidity: Decimal::from(liquidity),
    }
}

pub struct TestBot {
    pub engine: Arc<BotEngine>,
    #[allow(dead_code)]
    pub settings_path: PathBuf,
    _dir: TempDir,
}

/// Assemble an engine with fully deterministic collaborators. The same
/// outcome script feeds both chain-family backends.
#[allow(dead_code)]
pub fn build_bot(
    tokens: Vec<TokenRecord>,
    outcomes: &[bool],
    price_factor: Decimal,
    whale_hit_rate: f64,
    doc: SettingsDoc,
) -> TestBot {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings_path = dir.path().join("settings.json");
    let store = SettingsStore::new(&settings_path);

    let collector = MarketCollector::new(
        Arc::new(FixedMarket(tokens)),
        Decimal::ZERO,
        Decimal::ZERO,
    );
    let dispatcher = TradeDispatcher::new(Duration::from_secs(5))
        .register(Arc::new(ScriptedBackend::evm(outcomes)))
        .register(Arc::new(ScriptedBackend::account(outcomes)));

    let engine = BotEngine::new(
        test_config(),
        doc,
        store,
        collector,
        Arc::new(SimulatedActivity::with_hit_rate(whale_hit_rate)),
        Arc::new(FactorPrices(price_factor)),
        dispatcher,
        Arc::new(InMemoryVault::new()),
    );

    TestBot {
        engine: Arc::new(engine),
        settings_path,
        _dir: dir,
    }
}
