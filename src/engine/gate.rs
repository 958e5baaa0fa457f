//! Admission control for buy requests.
//!
//! The gate is pure with respect to its inputs: a wallet lookup result, a
//! count of buys already admitted in the current rate-limit window, and
//! the live settings. It performs no I/O; the engine owns the window
//! bookkeeping and calls in under its own serialization.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Settings;
use crate::models::Chain;

/// How a buy request entered the pipeline. Auto-triggered buys face the
/// additional auto-buy threshold; manual buys only need `minConfidence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOrigin {
    Manual,
    Auto,
}

/// Admission refusal, in check order.
#[derive(Debug, Error)]
pub enum GateRejection {
    #[error("no wallet configured for {chain}")]
    NoWallet { chain: Chain },

    #[error("trade rate limit reached: {admitted}/{max} buys in current period")]
    RateLimited { admitted: usize, max: u32 },

    #[error("confidence {confidence} below required {required}")]
    BelowConfidence { confidence: u8, required: u8 },
}

#[derive(Debug, Clone, Copy)]
pub struct GateRequest {
    pub chain: Chain,
    pub confidence: u8,
    pub origin: TradeOrigin,
}

/// Run the admission checks in order. Returns Ok(()) if the buy may
/// proceed to dispatch.
pub fn admit(
    request: GateRequest,
    has_wallet: bool,
    buys_in_window: usize,
    settings: &Settings,
) -> Result<(), GateRejection> {
    // 1. A wallet must exist for the target chain
    if !has_wallet {
        return Err(GateRejection::NoWallet {
            chain: request.chain,
        });
    }

    // 2. Rolling-window rate limit
    if buys_in_window >= settings.max_trades_per_period as usize {
        return Err(GateRejection::RateLimited {
            admitted: buys_in_window,
            max: settings.max_trades_per_period,
        });
    }

    // 3. Confidence threshold; auto buys must clear both knobs
    let required = match request.origin {
        TradeOrigin::Manual => settings.min_confidence,
        TradeOrigin::Auto => settings.min_confidence.max(settings.auto_buy_threshold),
    };
    if request.confidence < required {
        return Err(GateRejection::BelowConfidence {
            confidence: request.confidence,
            required,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Rate-limit window
// ---------------------------------------------------------------------------

/// Rolling record of admitted buys. A slot is reserved before dispatch and
/// released only when execution fails, so the cap bounds admissions per
/// window even while orders are in flight. Closing a position does not
/// return its slot.
#[derive(Debug)]
pub struct BuyWindow {
    admissions: VecDeque<(Uuid, DateTime<Utc>)>,
    period: Duration,
}

impl BuyWindow {
    pub fn new(period_secs: u64) -> Self {
        Self {
            admissions: VecDeque::new(),
            period: Duration::seconds(period_secs as i64),
        }
    }

    /// Buys admitted within the window ending at `now`.
    pub fn admitted(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.period;
        self.admissions.iter().filter(|(_, at)| *at > cutoff).count()
    }

    /// Record an admission. Also drops entries that have aged out.
    pub fn reserve(&mut self, id: Uuid, now: DateTime<Utc>) {
        let cutoff = now - self.period;
        while let Some((_, at)) = self.admissions.front() {
            if *at > cutoff {
                break;
            }
            self.admissions.pop_front();
        }
        self.admissions.push_back((id, now));
    }

    /// Return a slot after a failed dispatch. Returns `false` when the id
    /// is not present (already released or aged out).
    pub fn release(&mut self, id: Uuid) -> bool {
        let before = self.admissions.len();
        self.admissions.retain(|(admitted_id, _)| *admitted_id != id);
        before != self.admissions.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
