pub mod settings;

pub use settings::{Settings, SettingsDoc, SettingsStore};

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::models::Chain;

/// Discovery metadata served by `GET /api/config`.
pub const DATA_SOURCES: &[&str] = &["dexscreener", "birdeye", "dextv", "pumpfun", "simulated"];
pub const AI_PROVIDERS: &[&str] = &["openai", "anthropic", "minimax", "deepseek", "groq"];

/// When the signals-today counter resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRollover {
    /// Reset when the UTC date changes.
    Utc,
    /// Never reset automatically.
    None,
}

impl DayRollover {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" | "never" => DayRollover::None,
            _ => DayRollover::Utc,
        }
    }
}

/// Deterministic scoring knobs. Band tables are (threshold, bonus) pairs
/// evaluated highest-first; only the first matching band applies.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub baseline: i32,
    /// Lower clamp for confidence; upper clamp is always 99.
    pub floor: u8,
    pub volume_bands: [(Decimal, i32); 3],
    pub liquidity_bands: [(Decimal, i32); 3],
    pub momentum_bands: [(Decimal, i32); 2],
    /// 24h change at or below this threshold costs `momentum_penalty`.
    pub momentum_drop_threshold: Decimal,
    pub momentum_penalty: i32,
    /// Blend weight for the external oracle score (0..=1).
    pub oracle_weight: Decimal,
    /// Confidence >= this maps to STRONG BUY.
    pub strong_buy_cutoff: u8,
    /// Confidence >= this (and below strong) maps to BUY.
    pub buy_cutoff: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: 50,
            floor: 30,
            volume_bands: [
                (Decimal::from(100_000), 20),
                (Decimal::from(50_000), 15),
                (Decimal::from(10_000), 10),
            ],
            liquidity_bands: [
                (Decimal::from(100_000), 15),
                (Decimal::from(50_000), 10),
                (Decimal::from(20_000), 5),
            ],
            momentum_bands: [(Decimal::from(100), 15), (Decimal::from(50), 10)],
            momentum_drop_threshold: Decimal::from(-50),
            momentum_penalty: 10,
            oracle_weight: Decimal::new(3, 1), // 0.3
            strong_buy_cutoff: 90,
            buy_cutoff: 70,
        }
    }
}

impl ScoringConfig {
    /// Cut points must be monotonic and non-overlapping: floor <= buy <
    /// strong <= 99, and the oracle weight must be a valid blend fraction.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.floor > 99 {
            anyhow::bail!("CONFIDENCE_FLOOR must be <= 99, got {}", self.floor);
        }
        if !(self.buy_cutoff > self.floor && self.strong_buy_cutoff > self.buy_cutoff) {
            anyhow::bail!(
                "recommendation cut points must satisfy floor < buy < strong (got {} / {} / {})",
                self.floor,
                self.buy_cutoff,
                self.strong_buy_cutoff
            );
        }
        if self.strong_buy_cutoff > 99 {
            anyhow::bail!("STRONG_BUY_CUTOFF must be <= 99");
        }
        if self.oracle_weight < Decimal::ZERO || self.oracle_weight > Decimal::ONE {
            anyhow::bail!("ORACLE_WEIGHT must be in 0..=1, got {}", self.oracle_weight);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Chains scanned automatically while the bot runs. Any supported chain
    /// can still be scanned manually.
    pub scan_chains: Vec<Chain>,
    pub data_source: String,
    pub activity_source: String,
    /// URL template for the explorer activity source; `{chain}` and
    /// `{address}` are substituted per poll.
    pub activity_api_url: Option<String>,

    // Schedules (seconds)
    pub scan_interval_secs: u64,
    pub whale_poll_interval_secs: u64,
    pub price_tick_secs: u64,
    pub revalue_interval_secs: u64,
    pub report_interval_secs: u64,
    pub execution_timeout_secs: u64,

    // Collector floors
    pub min_liquidity: Decimal,
    pub min_volume: Decimal,

    pub scoring: ScoringConfig,
    /// Confidence assigned to synthesized whale-follow signals.
    pub whale_confidence: u8,
    /// Execution failures at or above this confidence raise an alert.
    pub alert_confidence: u8,

    // Bounded history windows
    pub registry_cap: usize,
    pub registry_ttl_secs: u64,
    pub trade_log_cap: usize,

    /// Rolling rate-limit window for buy admissions.
    pub trade_period_secs: u64,
    pub stats_day_rollover: DayRollover,

    /// Probability a simulated backend fills an order.
    pub sim_fill_rate: f64,

    pub settings_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let scan_chains_raw = env::var("SCAN_CHAINS").unwrap_or_else(|_| "base,bnb".into());
        let scan_chains: Vec<Chain> = scan_chains_raw
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Chain::from_str_opt(s)
                    .ok_or_else(|| anyhow::anyhow!("SCAN_CHAINS: unknown chain {s:?}"))
            })
            .collect::<anyhow::Result<_>>()?;

        let scoring = ScoringConfig {
            baseline: parse_env("SCORE_BASELINE", 50)?,
            floor: parse_env("CONFIDENCE_FLOOR", 30)?,
            oracle_weight: parse_env("ORACLE_WEIGHT", Decimal::new(3, 1))?,
            strong_buy_cutoff: parse_env("STRONG_BUY_CUTOFF", 90)?,
            buy_cutoff: parse_env("BUY_CUTOFF", 70)?,
            ..ScoringConfig::default()
        };
        scoring.validate()?;

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("PORT", 3000)?,

            scan_chains,
            data_source: env::var("DATA_SOURCE").unwrap_or_else(|_| "dexscreener".into()),
            activity_source: env::var("ACTIVITY_SOURCE").unwrap_or_else(|_| "simulated".into()),
            activity_api_url: env::var("ACTIVITY_API_URL").ok(),

            scan_interval_secs: parse_env("SCAN_INTERVAL_SECS", 30)?,
            whale_poll_interval_secs: parse_env("WHALE_POLL_INTERVAL_SECS", 45)?,
            price_tick_secs: parse_env("PRICE_TICK_SECS", 10)?,
            revalue_interval_secs: parse_env("REVALUE_INTERVAL_SECS", 60)?,
            report_interval_secs: parse_env("REPORT_INTERVAL_SECS", 900)?,
            execution_timeout_secs: parse_env("EXECUTION_TIMEOUT_SECS", 20)?,

            min_liquidity: parse_env("MIN_LIQUIDITY", Decimal::from(10_000))?,
            min_volume: parse_env("MIN_VOLUME", Decimal::ZERO)?,

            scoring,
            whale_confidence: parse_env("WHALE_CONFIDENCE", 90)?,
            alert_confidence: parse_env("ALERT_CONFIDENCE", 90)?,

            registry_cap: parse_env("SIGNAL_REGISTRY_CAP", 50)?,
            registry_ttl_secs: parse_env("SIGNAL_TTL_SECS", 3600)?,
            trade_log_cap: parse_env("TRADE_LOG_CAP", 200)?,

            trade_period_secs: parse_env("TRADE_PERIOD_SECS", 86_400)?,
            stats_day_rollover: DayRollover::parse(
                &env::var("STATS_DAY_ROLLOVER").unwrap_or_else(|_| "utc".into()),
            ),

            sim_fill_rate: parse_env("SIM_FILL_RATE", 0.9)?,

            settings_path: env::var("SETTINGS_PATH").unwrap_or_else(|_| "settings.json".into()),
        };

        if config.whale_confidence > 99 {
            anyhow::bail!("WHALE_CONFIDENCE must be <= 99");
        }

        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}
