//! Running trade statistics.
//!
//! `signals_today` counts registry admissions and resets at the
//! configured day boundary; `winning_trades`, `total_pnl` and `win_rate`
//! update exactly once per position close. The win rate is tracked from
//! counters rather than recounted from the bounded trade log, so old
//! trades aging out of the log never skew it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DayRollover;
use crate::models::Stats;

#[derive(Debug)]
pub struct StatsAggregator {
    stats: Stats,
    closed_trades: u32,
    rollover: DayRollover,
    day: NaiveDate,
}

impl StatsAggregator {
    pub fn new(rollover: DayRollover, now: DateTime<Utc>) -> Self {
        Self {
            stats: Stats::default(),
            closed_trades: 0,
            rollover,
            day: now.date_naive(),
        }
    }

    /// Count a signal accepted into the registry.
    pub fn signal_accepted(&mut self, now: DateTime<Utc>) {
        self.roll_day(now);
        self.stats.signals_today += 1;
    }

    /// Fold one closed position into the aggregates.
    pub fn trade_closed(&mut self, pnl: Decimal) {
        self.closed_trades += 1;
        if pnl > Decimal::ZERO {
            self.stats.winning_trades += 1;
        }
        self.stats.total_pnl += pnl;
        self.stats.win_rate = win_rate(self.stats.winning_trades, self.closed_trades);
    }

    pub fn snapshot(&mut self, now: DateTime<Utc>) -> Stats {
        self.roll_day(now);
        self.stats.clone()
    }

    fn roll_day(&mut self, now: DateTime<Utc>) {
        if self.rollover == DayRollover::Utc && now.date_naive() != self.day {
            self.day = now.date_naive();
            self.stats.signals_today = 0;
        }
    }
}

/// Integer win percentage, rounding .5 up: `round(winning / closed * 100)`.
/// Zero when nothing has closed yet.
pub fn win_rate(winning: u32, closed: u32) -> u32 {
    if closed == 0 {
        return 0;
    }
    let pct = Decimal::from(winning) * Decimal::ONE_HUNDRED / Decimal::from(closed);
    pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
