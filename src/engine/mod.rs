//! The bot engine: one state-owning component coordinating discovery,
//! scoring, execution and position upkeep.
//!
//! All mutable state sits behind a single `RwLock`; every mutation goes
//! through an engine method that takes the write lock, and the lock is
//! never held across collaborator I/O. Scheduled work carries the run
//! epoch it was spawned under and re-checks it at commit time, so ticks
//! from a stopped or superseded run land without effect.

pub mod gate;
pub mod ledger;
pub mod registry;
pub mod report;
pub mod scorer;
pub mod stats;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use rust_decimal::Decimal;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::api::ws_types::{LogEvent, LogLevel, Snapshot, WsEvent};
use crate::config::{AppConfig, Settings, SettingsDoc, SettingsStore};
use crate::custody::CredentialVault;
use crate::errors::ConfigError;
use crate::execution::{OrderRequest, TradeDispatcher};
use crate::market::activity::{BuyActivity, ChainActivitySource};
use crate::market::MarketCollector;
use crate::models::{
    Chain, Position, PositionStatus, Signal, SignalSource, Trade, TradeKind, TradeStatus, Wallet,
    Whale,
};
use crate::oracle::{HttpScoreOracle, ScoreOracle};
use crate::pricing::PriceSource;
use crate::services;
use crate::services::notifier::Notifier;

use self::gate::{BuyWindow, GateRequest, TradeOrigin};
use self::ledger::PositionLedger;
use self::registry::SignalRegistry;
use self::report::PeriodicSummary;
use self::stats::StatsAggregator;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct BotState {
    running: bool,
    /// Bumped on every fresh start. Scheduled work from an older run finds
    /// its epoch stale at commit time and is discarded.
    epoch: u64,
    doc: SettingsDoc,
    wallets: Vec<Wallet>,
    whales: Vec<Whale>,
    /// Last followed buy per whale address. Activity sources report the
    /// most recent buy on every poll; an unchanged result is not
    /// re-followed.
    whale_cutoffs: HashMap<String, (String, Decimal)>,
    registry: SignalRegistry,
    ledger: PositionLedger,
    stats: StatsAggregator,
    window: BuyWindow,
    oracle: Option<Arc<dyn ScoreOracle>>,
    notifier: Option<Arc<Notifier>>,
}

impl BotState {
    fn is_current(&self, epoch: u64) -> bool {
        self.running && self.epoch == epoch
    }

    fn wallet_for(&self, chain: Chain) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.chain == chain)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct BotEngine {
    config: AppConfig,
    state: RwLock<BotState>,
    events: broadcast::Sender<WsEvent>,
    collector: MarketCollector,
    activity: Arc<dyn ChainActivitySource>,
    prices: Arc<dyn PriceSource>,
    dispatcher: TradeDispatcher,
    vault: Arc<dyn CredentialVault>,
    store: SettingsStore,
}

impl BotEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AppConfig,
        doc: SettingsDoc,
        store: SettingsStore,
        collector: MarketCollector,
        activity: Arc<dyn ChainActivitySource>,
        prices: Arc<dyn PriceSource>,
        dispatcher: TradeDispatcher,
        vault: Arc<dyn CredentialVault>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        let oracle = HttpScoreOracle::from_doc(&doc)
            .map(|oracle| Arc::new(oracle) as Arc<dyn ScoreOracle>);
        let notifier = Notifier::from_doc(&doc).map(Arc::new);
        let now = Utc::now();

        Self {
            state: RwLock::new(BotState {
                running: false,
                epoch: 0,
                wallets: Vec::new(),
                whales: Vec::new(),
                whale_cutoffs: HashMap::new(),
                registry: SignalRegistry::new(config.registry_cap, config.registry_ttl_secs),
                ledger: PositionLedger::new(config.trade_log_cap),
                stats: StatsAggregator::new(config.stats_day_rollover, now),
                window: BuyWindow::new(config.trade_period_secs),
                doc,
                oracle,
                notifier,
            }),
            events,
            collector,
            activity,
            prices,
            dispatcher,
            vault,
            store,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.events.subscribe()
    }

    /// True while the bot is running under exactly this epoch. Service
    /// loops poll this to know when to exit.
    pub async fn is_current(&self, epoch: u64) -> bool {
        self.state.read().await.is_current(epoch)
    }

    pub async fn running(&self) -> bool {
        self.state.read().await.running
    }

    /// Counts for the health endpoint.
    pub async fn health_counts(&self) -> (bool, usize, usize) {
        let state = self.state.read().await;
        (state.running, state.wallets.len(), state.whales.len())
    }

    fn emit(&self, event: WsEvent) {
        // send only errors when no client is subscribed, which is fine.
        let _ = self.events.send(event);
    }

    /// Push a line onto every connected dashboard's activity feed.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(WsEvent::Log(LogEvent::new(message, level)));
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Apply optional settings overrides and start the scheduled loops.
    /// Starting an already-running bot just applies the overrides.
    pub async fn start(self: &Arc<Self>, overrides: Option<Settings>) -> anyhow::Result<()> {
        let spawn_epoch = {
            let mut state = self.state.write().await;
            if let Some(settings) = overrides {
                if let Err(reason) = settings.validate() {
                    drop(state);
                    self.log(LogLevel::Error, format!("Invalid settings: {reason}"));
                    anyhow::bail!("invalid settings: {reason}");
                }
                state.doc.trading = settings;
            }
            if state.running {
                None
            } else {
                state.running = true;
                state.epoch += 1;
                Some(state.epoch)
            }
        };

        self.emit(WsEvent::Status { running: true });
        match spawn_epoch {
            Some(epoch) => {
                tracing::info!(epoch, chains = ?self.config.scan_chains, "bot started");
                self.log(LogLevel::Success, "Bot started");
                self.spawn_loops(epoch);
            }
            None => self.log(LogLevel::Info, "Bot already running, settings applied"),
        }
        Ok(())
    }

    fn spawn_loops(self: &Arc<Self>, epoch: u64) {
        tokio::spawn(services::market_scanner::run_market_scanner(
            Arc::clone(self),
            epoch,
        ));
        tokio::spawn(services::whale_watch::run_whale_watch(
            Arc::clone(self),
            epoch,
        ));
        tokio::spawn(services::revaluer::run_revaluer(Arc::clone(self), epoch));
        tokio::spawn(services::revaluer::run_price_ticker(
            Arc::clone(self),
            epoch,
        ));
        tokio::spawn(services::reporter::run_reporter(Arc::clone(self), epoch));
    }

    /// Halt scheduling. In-flight collaborator calls finish but their
    /// results are discarded at commit time.
    pub async fn stop(&self) {
        let was_running = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut state.running, false)
        };
        self.emit(WsEvent::Status { running: false });
        if was_running {
            tracing::info!("bot stopped");
            self.log(LogLevel::Warning, "Bot stopped");
        }
    }

    // -----------------------------------------------------------------------
    // Discovery + scoring
    // -----------------------------------------------------------------------

    /// Manual scan requested from the dashboard. Runs even while stopped.
    pub async fn scan_market(&self, chain: Chain) -> usize {
        self.log(LogLevel::Info, format!("Scanning {chain}..."));
        let found = self.scan_chain(chain, None).await;
        self.log(
            LogLevel::Info,
            format!("Scan of {chain} found {found} signal(s)"),
        );
        found
    }

    /// One scan pass for a chain: poll, score, admit, auto-buy. Returns
    /// how many signals entered the registry. Scheduled ticks pass their
    /// epoch and commit nothing once it is stale.
    pub async fn scan_chain(&self, chain: Chain, epoch: Option<u64>) -> usize {
        let started = Instant::now();

        let tokens = match self.collector.poll(chain).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(chain = %chain, error = %e, "market poll failed");
                self.log(LogLevel::Error, format!("Market scan failed for {chain}: {e}"));
                return 0;
            }
        };

        // Score outside the lock; the oracle call is network I/O.
        let (oracle, min_confidence) = {
            let state = self.state.read().await;
            (state.oracle.clone(), state.doc.trading.min_confidence)
        };

        let mut scored = Vec::new();
        for token in &tokens {
            let oracle_score = match &oracle {
                Some(oracle) => match oracle.score(token).await {
                    Ok(score) => Some(score),
                    Err(e) => {
                        tracing::warn!(
                            token = %token.symbol,
                            error = %e,
                            "oracle scoring failed, using base score"
                        );
                        None
                    }
                },
                None => None,
            };
            let (confidence, recommendation) =
                scorer::score_token(token, oracle_score, &self.config.scoring);
            if confidence < min_confidence {
                tracing::debug!(token = %token.symbol, confidence, "below confidence floor");
                continue;
            }
            scored.push(Signal {
                id: Uuid::new_v4(),
                token: token.symbol.clone(),
                address: token.address.clone(),
                chain,
                price: token.price,
                confidence,
                recommendation,
                volume_24h: token.volume_24h,
                liquidity: token.liquidity,
                change_24h: token.change_24h,
                source: SignalSource::Scanner,
                created_at: Utc::now(),
            });
        }

        let now = Utc::now();
        let (accepted, auto_candidates, stats) = {
            let mut state = self.state.write().await;
            if let Some(epoch) = epoch {
                if !state.is_current(epoch) {
                    return 0;
                }
            }
            state.registry.prune_expired(now);
            let auto_enabled = state.doc.trading.auto_buy_enabled;
            let auto_floor = state.doc.trading.auto_buy_threshold;

            let mut accepted = Vec::new();
            let mut auto_candidates = Vec::new();
            for signal in scored {
                if state.registry.insert(signal.clone()) {
                    state.stats.signal_accepted(now);
                    if auto_enabled && signal.confidence >= auto_floor {
                        auto_candidates.push(signal.clone());
                    }
                    accepted.push(signal);
                }
            }
            let stats = state.stats.snapshot(now);
            (accepted, auto_candidates, stats)
        };

        for signal in &accepted {
            counter!("signals_emitted_total").increment(1);
            tracing::info!(
                token = %signal.token,
                chain = %chain,
                confidence = signal.confidence,
                recommendation = %signal.recommendation,
                "signal admitted"
            );
            self.log(
                LogLevel::Info,
                format!(
                    "New signal: {} on {} at {}% confidence ({})",
                    signal.token, chain, signal.confidence, signal.recommendation
                ),
            );
            self.emit(WsEvent::Signal(Box::new(signal.clone())));
        }
        if !accepted.is_empty() {
            self.emit(WsEvent::Stats(stats));
        }

        for signal in &auto_candidates {
            self.submit_buy(signal, TradeOrigin::Auto, epoch).await;
        }

        histogram!("scan_duration_seconds").record(started.elapsed().as_secs_f64());
        accepted.len()
    }

    // -----------------------------------------------------------------------
    // Whale tracking
    // -----------------------------------------------------------------------

    /// Poll every tracked whale address concurrently and turn fresh buys
    /// into whale-follow signals.
    pub async fn whale_tick(&self, epoch: Option<u64>) {
        let whales: Vec<Whale> = { self.state.read().await.whales.clone() };
        if whales.is_empty() {
            return;
        }

        let polls = whales
            .iter()
            .map(|w| self.activity.recent_buy(w.chain, &w.address));
        let results = futures_util::future::join_all(polls).await;

        for (whale, result) in whales.iter().zip(results) {
            match result {
                Ok(Some(activity)) => self.follow_whale_buy(whale, activity, epoch).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    whale = %whale.name,
                    chain = %whale.chain,
                    error = %e,
                    "whale activity poll failed"
                ),
            }
        }
    }

    async fn follow_whale_buy(&self, whale: &Whale, activity: BuyActivity, epoch: Option<u64>) {
        let confidence = self.config.whale_confidence.min(99);
        let signal = Signal {
            id: Uuid::new_v4(),
            token: activity.token_symbol,
            address: activity.token_address,
            chain: whale.chain,
            price: activity.price,
            confidence,
            recommendation: scorer::recommend(confidence, &self.config.scoring),
            volume_24h: Decimal::ZERO,
            liquidity: Decimal::ZERO,
            change_24h: Decimal::ZERO,
            source: SignalSource::Whale {
                name: whale.name.clone(),
            },
            created_at: Utc::now(),
        };

        let stats = {
            let mut state = self.state.write().await;
            if let Some(epoch) = epoch {
                if !state.is_current(epoch) {
                    return;
                }
            }
            let fingerprint = (signal.address.clone(), signal.price);
            if state.whale_cutoffs.get(&whale.address) == Some(&fingerprint) {
                return;
            }
            state.whale_cutoffs.insert(whale.address.clone(), fingerprint);
            if !state.registry.insert(signal.clone()) {
                return;
            }
            state.stats.signal_accepted(signal.created_at);
            state.stats.snapshot(signal.created_at)
        };

        counter!("whale_signals_total").increment(1);
        tracing::info!(
            whale = %whale.name,
            token = %signal.token,
            chain = %signal.chain,
            "whale buy detected"
        );
        self.log(
            LogLevel::Info,
            format!("Whale {} bought {} on {}", whale.name, signal.token, signal.chain),
        );
        self.emit(WsEvent::WhaleSignal(Box::new(signal.clone())));
        self.emit(WsEvent::Stats(stats));

        if whale.auto_buy {
            self.submit_buy(&signal, TradeOrigin::Auto, epoch).await;
        }
    }

    // -----------------------------------------------------------------------
    // Buying
    // -----------------------------------------------------------------------

    /// Buy a signal already in the registry, addressed by id or token
    /// symbol.
    pub async fn buy_signal(&self, key: &str) -> bool {
        let signal = {
            let state = self.state.read().await;
            state.registry.find(key).cloned()
        };
        match signal {
            Some(signal) => self.submit_buy(&signal, TradeOrigin::Manual, None).await,
            None => {
                tracing::debug!(key, "buy request for unknown signal");
                self.log(LogLevel::Warning, format!("No signal found for {key}"));
                false
            }
        }
    }

    /// Immediate manual buy of an arbitrary token: synthesize a
    /// full-confidence signal and push it through the normal pipeline.
    pub async fn sniper_buy(
        &self,
        token: String,
        address: String,
        chain: Chain,
        price: Decimal,
    ) -> bool {
        let signal = Signal {
            id: Uuid::new_v4(),
            token,
            address,
            chain,
            price,
            confidence: 99,
            recommendation: scorer::recommend(99, &self.config.scoring),
            volume_24h: Decimal::ZERO,
            liquidity: Decimal::ZERO,
            change_24h: Decimal::ZERO,
            source: SignalSource::Sniper,
            created_at: Utc::now(),
        };

        let stats = {
            let mut state = self.state.write().await;
            state.registry.insert(signal.clone());
            state.stats.signal_accepted(signal.created_at);
            state.stats.snapshot(signal.created_at)
        };
        self.emit(WsEvent::Signal(Box::new(signal.clone())));
        self.emit(WsEvent::Stats(stats));
        self.log(
            LogLevel::Info,
            format!("Sniper buy: {} on {} @ {}", signal.token, signal.chain, signal.price),
        );

        self.submit_buy(&signal, TradeOrigin::Manual, None).await
    }

    /// Gate, reserve a rate-limit slot, dispatch, then commit the fill.
    /// The state lock is never held across the dispatch. Returns true
    /// when a position was opened.
    pub async fn submit_buy(&self, signal: &Signal, origin: TradeOrigin, epoch: Option<u64>) -> bool {
        let trade_id = Uuid::new_v4();

        // 1. Admission + slot reservation under the lock
        let (order, credential) = {
            let mut state = self.state.write().await;
            if let Some(epoch) = epoch {
                if !state.is_current(epoch) {
                    return false;
                }
            }
            let now = Utc::now();
            let wallet = state.wallet_for(signal.chain).cloned();
            let request = GateRequest {
                chain: signal.chain,
                confidence: signal.confidence,
                origin,
            };
            if let Err(rejection) = gate::admit(
                request,
                wallet.is_some(),
                state.window.admitted(now),
                &state.doc.trading,
            ) {
                drop(state);
                counter!("trades_rejected_total").increment(1);
                tracing::info!(
                    token = %signal.token,
                    chain = %signal.chain,
                    reason = %rejection,
                    "buy rejected"
                );
                self.log(
                    LogLevel::Warning,
                    format!("Buy rejected for {}: {rejection}", signal.token),
                );
                return false;
            }
            let Some(wallet) = wallet else {
                return false;
            };

            let rpc_endpoint = state.doc.rpc_endpoint(signal.chain).map(str::to_owned);
            let endpoint_required = self
                .dispatcher
                .backend_for(signal.chain)
                .is_some_and(|b| b.needs_endpoint());
            if endpoint_required && rpc_endpoint.is_none() {
                let err = ConfigError::MissingRpcEndpoint(signal.chain);
                drop(state);
                tracing::warn!(chain = %signal.chain, "{err}");
                self.log(LogLevel::Error, err.to_string());
                return false;
            }

            state.window.reserve(trade_id, now);
            let order = OrderRequest {
                kind: TradeKind::Buy,
                chain: signal.chain,
                token: signal.token.clone(),
                token_address: signal.address.clone(),
                price: signal.price,
                size: state.doc.trading.position_size,
                slippage_tolerance: state.doc.trading.slippage_tolerance,
                rpc_endpoint,
            };
            (order, wallet.credential)
        };

        // 2. Dispatch without holding the lock
        let outcome = self.dispatcher.execute(&order, credential).await;

        // 3. Commit, or roll the reservation back
        match outcome {
            Ok(fill) => {
                let now = Utc::now();
                let trade = Trade {
                    id: trade_id,
                    kind: TradeKind::Buy,
                    token: signal.token.clone(),
                    address: signal.address.clone(),
                    chain: signal.chain,
                    price: fill.price,
                    size: order.size,
                    timestamp: now,
                    status: TradeStatus::Open,
                };
                let position = Position {
                    id: trade_id,
                    token: signal.token.clone(),
                    address: signal.address.clone(),
                    chain: signal.chain,
                    entry_price: fill.price,
                    size: order.size,
                    status: PositionStatus::Open,
                    pnl: Decimal::ZERO,
                    pnl_percent: Decimal::ZERO,
                    opened_at: now,
                    closed_at: None,
                    last_valued_at: now,
                };

                let positions = {
                    let mut state = self.state.write().await;
                    if let Some(epoch) = epoch {
                        if !state.is_current(epoch) {
                            // The run ended while the order was in flight;
                            // the fill is not recorded.
                            state.window.release(trade_id);
                            return false;
                        }
                    }
                    state.ledger.record_fill(trade.clone(), position);
                    gauge!("open_positions").set(state.ledger.open_count() as f64);
                    state.ledger.open_positions().to_vec()
                };

                counter!("trades_executed_total").increment(1);
                tracing::info!(
                    token = %trade.token,
                    chain = %trade.chain,
                    price = %trade.price,
                    size = %trade.size,
                    "buy filled"
                );
                self.log(
                    LogLevel::Success,
                    format!(
                        "Bought {} on {}: {} @ {}",
                        trade.token, trade.chain, trade.size, trade.price
                    ),
                );
                self.emit(WsEvent::Trade(Box::new(trade)));
                self.emit(WsEvent::Positions(positions));
                true
            }
            Err(e) => {
                let notifier = {
                    let mut state = self.state.write().await;
                    state.window.release(trade_id);
                    state.notifier.clone()
                };
                counter!("trades_failed_total").increment(1);
                tracing::error!(
                    token = %signal.token,
                    chain = %signal.chain,
                    error = %e,
                    "buy failed"
                );
                self.log(LogLevel::Error, format!("Trade failed for {}: {e}", signal.token));
                if signal.confidence >= self.config.alert_confidence {
                    if let Some(n) = notifier {
                        n.send(&services::notifier::format_execution_alert(signal, &e))
                            .await;
                    }
                }
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------

    /// Close an open position on request. Idempotent; stats update exactly
    /// once.
    pub async fn close_position(&self, id: Uuid) -> bool {
        let now = Utc::now();
        let result = {
            let mut state = self.state.write().await;
            match state.ledger.close(id, now) {
                Some(position) => {
                    state.stats.trade_closed(position.pnl);
                    gauge!("open_positions").set(state.ledger.open_count() as f64);
                    Some((
                        position,
                        state.stats.snapshot(now),
                        state.ledger.open_positions().to_vec(),
                        state.notifier.clone(),
                    ))
                }
                None => None,
            }
        };

        let Some((position, stats, positions, notifier)) = result else {
            tracing::debug!(position = %id, "close requested for unknown or closed position");
            self.log(LogLevel::Warning, "Position already closed or unknown");
            return false;
        };

        self.emit(WsEvent::Positions(positions));
        self.emit(WsEvent::Stats(stats));
        self.publish_close(position, "manual", notifier).await;
        true
    }

    /// Revalue every open position and close the ones past their exit
    /// bounds. Aborts without effect when any price fetch fails.
    pub async fn revalue_tick(&self, epoch: Option<u64>) {
        let marks: Vec<(Uuid, Decimal, DateTime<Utc>)> = {
            let state = self.state.read().await;
            state
                .ledger
                .open_positions()
                .iter()
                .map(|p| (p.id, p.marked_price(), p.last_valued_at))
                .collect()
        };
        if marks.is_empty() {
            return;
        }

        let now = Utc::now();
        let mut repriced = Vec::with_capacity(marks.len());
        for (id, last_price, valued_at) in marks {
            let elapsed = (now - valued_at).to_std().unwrap_or_default();
            match self.prices.next_price(last_price, elapsed).await {
                Ok(price) => repriced.push((id, price)),
                Err(e) => {
                    tracing::warn!(error = %e, "revaluation price fetch failed, aborting tick");
                    return;
                }
            }
        }

        let mut closed = Vec::new();
        let (positions, stats, notifier) = {
            let mut state = self.state.write().await;
            if let Some(epoch) = epoch {
                if !state.is_current(epoch) {
                    return;
                }
            }
            let settings = state.doc.trading.clone();
            for (id, price) in repriced {
                let exit = state
                    .ledger
                    .mark(id, price, now)
                    .map(|p| ledger::should_close(p, &settings))
                    .unwrap_or(false);
                if exit {
                    if let Some(position) = state.ledger.close(id, now) {
                        state.stats.trade_closed(position.pnl);
                        closed.push(position);
                    }
                }
            }
            if !closed.is_empty() {
                gauge!("open_positions").set(state.ledger.open_count() as f64);
            }
            (
                state.ledger.open_positions().to_vec(),
                state.stats.snapshot(now),
                state.notifier.clone(),
            )
        };

        self.emit(WsEvent::Positions(positions));
        if !closed.is_empty() {
            self.emit(WsEvent::Stats(stats));
        }
        for position in closed {
            let reason = if position.pnl_percent >= Decimal::ZERO {
                "take_profit"
            } else {
                "stop_loss"
            };
            self.publish_close(position, reason, notifier.clone()).await;
        }
    }

    async fn publish_close(
        &self,
        position: Position,
        reason: &str,
        notifier: Option<Arc<Notifier>>,
    ) {
        counter!("positions_closed_total").increment(1);
        let level = if position.pnl > Decimal::ZERO {
            LogLevel::Success
        } else {
            LogLevel::Warning
        };
        tracing::info!(
            token = %position.token,
            reason,
            pnl = %position.pnl,
            pnl_percent = %position.pnl_percent,
            "position closed"
        );
        self.log(
            level,
            format!(
                "Closed {}: PnL {} ({}%)",
                position.token,
                position.pnl.round_dp(2),
                position.pnl_percent.round_dp(1)
            ),
        );
        if let Some(n) = notifier {
            n.send(&services::notifier::format_position_exit(&position, reason))
                .await;
        }
    }

    /// Push fresh chain reference prices to the dashboard.
    pub async fn price_tick(&self) {
        match self.prices.chain_prices().await {
            Ok(prices) => self.emit(WsEvent::Prices(prices)),
            Err(e) => tracing::warn!(error = %e, "chain price fetch failed"),
        }
    }

    // -----------------------------------------------------------------------
    // Wallets + whales
    // -----------------------------------------------------------------------

    /// Enroll a trading wallet. The raw key goes straight to the custody
    /// collaborator; the engine keeps only the opaque handle.
    pub async fn add_wallet(&self, chain: Chain, private_key: &str, label: Option<String>) -> bool {
        match self.vault.import(chain, private_key).await {
            Ok(imported) => {
                let wallet = Wallet {
                    id: Uuid::new_v4(),
                    chain,
                    address: imported.address,
                    credential: imported.handle,
                    label,
                    added_at: Utc::now(),
                };
                let views = {
                    let mut state = self.state.write().await;
                    state.wallets.push(wallet.clone());
                    state.wallets.iter().map(Wallet::view).collect::<Vec<_>>()
                };
                tracing::info!(chain = %chain, address = %wallet.address, "wallet registered");
                self.emit(WsEvent::Wallets(views));
                self.log(LogLevel::Success, format!("Wallet added for {chain}"));
                true
            }
            Err(e) => {
                tracing::warn!(chain = %chain, error = %e, "wallet import rejected");
                self.log(LogLevel::Error, format!("Wallet import failed: {e}"));
                false
            }
        }
    }

    pub async fn add_whale(&self, name: String, address: String, chain: Chain, auto_buy: bool) {
        let whale = Whale {
            id: Uuid::new_v4(),
            name,
            address,
            chain,
            auto_buy,
            added_at: Utc::now(),
        };
        let whales = {
            let mut state = self.state.write().await;
            state.whales.push(whale.clone());
            gauge!("tracked_whales").set(state.whales.len() as f64);
            state.whales.clone()
        };
        tracing::info!(
            whale = %whale.name,
            chain = %whale.chain,
            auto_buy = whale.auto_buy,
            "tracking whale"
        );
        self.emit(WsEvent::Whales(whales));
        self.log(
            LogLevel::Success,
            format!("Now tracking {} ({})", whale.name, whale.chain),
        );
    }

    pub async fn remove_whale(&self, address: &str) -> bool {
        let remaining = {
            let mut state = self.state.write().await;
            let before = state.whales.len();
            state.whales.retain(|w| w.address != address);
            if state.whales.len() == before {
                None
            } else {
                state.whale_cutoffs.remove(address);
                gauge!("tracked_whales").set(state.whales.len() as f64);
                Some(state.whales.clone())
            }
        };
        match remaining {
            Some(whales) => {
                self.emit(WsEvent::Whales(whales));
                self.log(LogLevel::Info, "Whale removed");
                true
            }
            None => {
                self.log(LogLevel::Warning, "No tracked whale with that address");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Validate, persist and apply a full settings document. The oracle
    /// and notifier are rebuilt so credential changes take effect
    /// immediately.
    pub async fn save_settings(&self, doc: SettingsDoc) -> anyhow::Result<()> {
        if let Err(reason) = doc.trading.validate() {
            self.log(LogLevel::Error, format!("Invalid settings: {reason}"));
            anyhow::bail!("invalid settings: {reason}");
        }
        if let Err(e) = self.store.save(&doc) {
            self.log(LogLevel::Error, format!("Failed to persist settings: {e}"));
            return Err(e);
        }
        {
            let mut state = self.state.write().await;
            state.oracle = HttpScoreOracle::from_doc(&doc)
                .map(|oracle| Arc::new(oracle) as Arc<dyn ScoreOracle>);
            state.notifier = Notifier::from_doc(&doc).map(Arc::new);
            state.doc = doc;
        }
        tracing::info!(path = %self.store.path().display(), "settings saved");
        self.log(LogLevel::Success, "Settings saved");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Snapshots + reporting
    // -----------------------------------------------------------------------

    /// Full state for a freshly connected client. Credentials are already
    /// redacted by `Wallet::view`; integration secrets are not included.
    pub async fn snapshot(&self) -> Snapshot {
        let now = Utc::now();
        let mut state = self.state.write().await;
        Snapshot {
            running: state.running,
            wallets: state.wallets.iter().map(Wallet::view).collect(),
            whales: state.whales.clone(),
            positions: state.ledger.open_positions().to_vec(),
            signals: state.registry.snapshot(),
            stats: state.stats.snapshot(now),
            settings: state.doc.trading.clone(),
        }
    }

    /// Build and broadcast the interval digest.
    pub async fn report_tick(&self) -> PeriodicSummary {
        let summary = {
            let mut state = self.state.write().await;
            let now = Utc::now();
            let top_signal = state.registry.iter().max_by_key(|s| s.confidence).cloned();
            PeriodicSummary::build(
                state.running,
                state.stats.snapshot(now),
                state.ledger.open_count(),
                state.whales.len(),
                top_signal,
            )
        };
        self.emit(WsEvent::AiReport(summary.clone()));
        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::config::{DayRollover, ScoringConfig};
    use crate::custody::InMemoryVault;
    use crate::errors::{DataSourceError, ExecutionError};
    use crate::execution::{ExecutionBackend, TradeOutcome};
    use crate::market::activity::SimulatedActivity;
    use crate::market::MarketDataSource;
    use crate::models::{ChainFamily, CredentialHandle, TokenRecord};

    struct FixedMarket(Vec<TokenRecord>);

    #[async_trait]
    impl MarketDataSource for FixedMarket {
        async fn poll(&self, chain: Chain) -> Result<Vec<TokenRecord>, DataSourceError> {
            Ok(self.0.iter().filter(|t| t.chain == chain).cloned().collect())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct AlwaysFill;

    #[async_trait]
    impl ExecutionBackend for AlwaysFill {
        async fn execute(
            &self,
            order: &OrderRequest,
            _credential: CredentialHandle,
        ) -> Result<TradeOutcome, ExecutionError> {
            Ok(TradeOutcome {
                success: true,
                filled_price: Some(order.price),
            })
        }

        fn family(&self) -> ChainFamily {
            ChainFamily::Evm
        }
    }

    /// Reports the same latest buy on every poll, like an explorer whose
    /// tracked address has gone quiet after one purchase.
    struct RepeatBuy;

    #[async_trait]
    impl ChainActivitySource for RepeatBuy {
        async fn recent_buy(
            &self,
            _chain: Chain,
            _address: &str,
        ) -> Result<Option<BuyActivity>, DataSourceError> {
            Ok(Some(BuyActivity {
                token_symbol: "WIF".into(),
                token_address: "0xwif".into(),
                price: Decimal::new(25, 1),
            }))
        }

        fn name(&self) -> &'static str {
            "repeat"
        }
    }

    struct FlatPrices;

    #[async_trait]
    impl PriceSource for FlatPrices {
        async fn next_price(
            &self,
            last_price: Decimal,
            _elapsed: Duration,
        ) -> Result<Decimal, DataSourceError> {
            Ok(last_price)
        }

        async fn chain_prices(&self) -> Result<BTreeMap<Chain, Decimal>, DataSourceError> {
            Ok(BTreeMap::new())
        }
    }

    fn test_config() -> AppConfig {
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

    fn hot_token() -> TokenRecord {
        TokenRecord {
            address: "0xhot".into(),
            symbol: "HOT".into(),
            chain: Chain::Base,
            price: Decimal::new(12, 4),
            change_24h: Decimal::from(10),
            volume_24h: Decimal::from(150_000),
            liquidity: Decimal::from(120_000),
        }
    }

    fn engine_with(tokens: Vec<TokenRecord>, doc: SettingsDoc) -> (Arc<BotEngine>, tempfile::TempDir) {
        engine_with_activity(tokens, doc, Arc::new(SimulatedActivity::with_hit_rate(0.0)))
    }

    fn engine_with_activity(
        tokens: Vec<TokenRecord>,
        doc: SettingsDoc,
        activity: Arc<dyn ChainActivitySource>,
    ) -> (Arc<BotEngine>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let collector = MarketCollector::new(
            Arc::new(FixedMarket(tokens)),
            Decimal::ZERO,
            Decimal::ZERO,
        );
        let dispatcher =
            TradeDispatcher::new(Duration::from_secs(5)).register(Arc::new(AlwaysFill));
        let engine = BotEngine::new(
            test_config(),
            doc,
            store,
            collector,
            activity,
            Arc::new(FlatPrices),
            dispatcher,
            Arc::new(InMemoryVault::new()),
        );
        (Arc::new(engine), dir)
    }

    #[tokio::test]
    async fn test_manual_scan_commits_while_stopped() {
        let (engine, _dir) = engine_with(vec![hot_token()], SettingsDoc::default());

        let admitted = engine.scan_chain(Chain::Base, None).await;
        assert_eq!(admitted, 1);

        let snapshot = engine.snapshot().await;
        assert!(!snapshot.running);
        assert_eq!(snapshot.signals.len(), 1);
        assert_eq!(snapshot.signals[0].confidence, 85);
        assert_eq!(snapshot.stats.signals_today, 1);
        assert!(snapshot.positions.is_empty());
    }

    #[tokio::test]
    async fn test_stale_epoch_scan_discarded() {
        let (engine, _dir) = engine_with(vec![hot_token()], SettingsDoc::default());

        // No run has ever started, so any claimed epoch is stale.
        assert_eq!(engine.scan_chain(Chain::Base, Some(1)).await, 0);
        assert!(engine.snapshot().await.signals.is_empty());
    }

    #[tokio::test]
    async fn test_tick_resolving_after_stop_commits_nothing() {
        let (engine, _dir) = engine_with(vec![hot_token()], SettingsDoc::default());
        engine.stop().await;
        let mut rx = engine.subscribe();

        // A scheduled tick whose poll was in flight when the stop landed
        // still carries the current epoch; its commit must be discarded.
        assert_eq!(engine.scan_chain(Chain::Base, Some(0)).await, 0);

        assert!(engine.snapshot().await.signals.is_empty());
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, WsEvent::Signal(_) | WsEvent::Trade(_)));
        }
    }

    #[tokio::test]
    async fn test_scan_drops_signals_below_min_confidence() {
        let mut doc = SettingsDoc::default();
        doc.trading.min_confidence = 86;
        let (engine, _dir) = engine_with(vec![hot_token()], doc);

        // HOT scores 85, one below the configured floor.
        assert_eq!(engine.scan_chain(Chain::Base, None).await, 0);
        assert!(engine.snapshot().await.signals.is_empty());
    }

    #[tokio::test]
    async fn test_buy_signal_requires_wallet() {
        let (engine, _dir) = engine_with(vec![hot_token()], SettingsDoc::default());
        engine.scan_chain(Chain::Base, None).await;

        assert!(!engine.buy_signal("HOT").await);
        assert!(engine.snapshot().await.positions.is_empty());

        assert!(engine.add_wallet(Chain::Base, "0123456789abcdef0123", None).await);
        assert!(engine.buy_signal("HOT").await);
        assert_eq!(engine.snapshot().await.positions.len(), 1);
    }

    #[tokio::test]
    async fn test_start_stop_toggle_running_and_emit_status() {
        let (engine, _dir) = engine_with(vec![], SettingsDoc::default());
        let mut rx = engine.subscribe();

        engine.start(None).await.unwrap();
        assert!(engine.running().await);

        engine.stop().await;
        assert!(!engine.running().await);

        let mut statuses = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let WsEvent::Status { running } = event {
                statuses.push(running);
            }
        }
        assert_eq!(statuses, vec![true, false]);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_settings() {
        let (engine, _dir) = engine_with(vec![], SettingsDoc::default());
        let bad = Settings {
            position_size: Decimal::ZERO,
            ..Settings::default()
        };

        assert!(engine.start(Some(bad)).await.is_err());
        assert!(!engine.running().await);
    }

    #[tokio::test]
    async fn test_repeated_whale_poll_followed_once() {
        let (engine, _dir) =
            engine_with_activity(vec![], SettingsDoc::default(), Arc::new(RepeatBuy));
        engine
            .add_whale("Mr Big".into(), "0xwhale".into(), Chain::Base, false)
            .await;

        engine.whale_tick(None).await;
        engine.whale_tick(None).await;

        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.signals.len(), 1);
        assert_eq!(snapshot.stats.signals_today, 1);
    }

    #[tokio::test]
    async fn test_whale_cutoff_cleared_on_remove() {
        let (engine, _dir) =
            engine_with_activity(vec![], SettingsDoc::default(), Arc::new(RepeatBuy));
        engine
            .add_whale("Mr Big".into(), "0xwhale".into(), Chain::Base, false)
            .await;
        engine.whale_tick(None).await;

        // Re-tracking the same address starts fresh.
        assert!(engine.remove_whale("0xwhale").await);
        engine
            .add_whale("Mr Big".into(), "0xwhale".into(), Chain::Base, false)
            .await;
        engine.whale_tick(None).await;

        assert_eq!(engine.snapshot().await.signals.len(), 2);
    }
}
