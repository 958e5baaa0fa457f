//! In-memory book of positions and the bounded trade log.
//!
//! Positions move `open -> closed` exactly once, either when a revaluation
//! pushes their drift past the take-profit or stop-loss bound or on an
//! explicit close request. Closing also closes the correlated trade; the
//! pair shares one id. All mutation happens under the engine's lock.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::Settings;
use crate::models::{Position, PositionStatus, Trade, TradeStatus};

#[derive(Debug)]
pub struct PositionLedger {
    /// Open positions only; closed ones are handed back to the caller.
    positions: Vec<Position>,
    /// Trade history, oldest first, capped.
    trades: VecDeque<Trade>,
    trade_log_cap: usize,
}

impl PositionLedger {
    pub fn new(trade_log_cap: usize) -> Self {
        Self {
            positions: Vec::new(),
            trades: VecDeque::new(),
            trade_log_cap,
        }
    }

    /// Record a filled buy: the trade and its position enter the book
    /// together.
    pub fn record_fill(&mut self, trade: Trade, position: Position) {
        debug_assert_eq!(trade.id, position.id);
        self.trades.push_back(trade);
        while self.trades.len() > self.trade_log_cap {
            self.trades.pop_front();
        }
        self.positions.push(position);
    }

    pub fn open_positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, id: Uuid) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.trades.iter().cloned().collect()
    }

    /// Apply a fresh valuation to an open position. `pnl`/`pnl_percent`
    /// are recomputed against the fixed entry price. Returns the updated
    /// position, or None when the id is unknown or already closed.
    pub fn mark(&mut self, id: Uuid, new_price: Decimal, now: DateTime<Utc>) -> Option<&Position> {
        let position = self.positions.iter_mut().find(|p| p.id == id)?;
        if position.entry_price.is_zero() {
            return None;
        }
        let drift = (new_price - position.entry_price) / position.entry_price;
        position.pnl_percent = drift * Decimal::ONE_HUNDRED;
        position.pnl = position.size * drift;
        position.last_valued_at = now;
        Some(position)
    }

    /// Close an open position and its trade. Idempotent: an unknown or
    /// already-closed id is a no-op returning None.
    pub fn close(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<Position> {
        let index = self.positions.iter().position(|p| p.id == id)?;
        let mut position = self.positions.swap_remove(index);
        position.status = PositionStatus::Closed;
        position.closed_at = Some(now);
        if let Some(trade) = self.trades.iter_mut().find(|t| t.id == id) {
            trade.status = TradeStatus::Closed;
        }
        Some(position)
    }
}

/// Exit condition: drift reached take-profit or fell to stop-loss. Both
/// bounds are inclusive.
pub fn should_close(position: &Position, settings: &Settings) -> bool {
    position.pnl_percent >= settings.take_profit || position.pnl_percent <= -settings.stop_loss
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
