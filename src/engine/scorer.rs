//! Deterministic token scoring.
//!
//! Confidence starts from a configured baseline, adds tiered bonuses for
//! 24h volume and liquidity (highest matching band only, no stacking),
//! applies a momentum term for the 24h price change, optionally blends in
//! an external oracle score, and clamps to `[floor, 99]`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::ScoringConfig;
use crate::models::{Recommendation, TokenRecord};

// ---------------------------------------------------------------------------
// Banded base score
// ---------------------------------------------------------------------------

/// Raw (unclamped) deterministic score for a token observation.
pub fn base_score(token: &TokenRecord, cfg: &ScoringConfig) -> i32 {
    let mut score = cfg.baseline;
    score += band_bonus(token.volume_24h, &cfg.volume_bands);
    score += band_bonus(token.liquidity, &cfg.liquidity_bands);
    score += momentum_term(token.change_24h, cfg);
    score
}

/// First band whose threshold the value strictly exceeds wins. Bands are
/// ordered highest threshold first.
fn band_bonus(value: Decimal, bands: &[(Decimal, i32)]) -> i32 {
    bands
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Rewards strong positive 24h change, penalizes a collapse at or below
/// the drop threshold.
fn momentum_term(change_24h: Decimal, cfg: &ScoringConfig) -> i32 {
    if change_24h <= cfg.momentum_drop_threshold {
        return -cfg.momentum_penalty;
    }
    band_bonus(change_24h, &cfg.momentum_bands)
}

// ---------------------------------------------------------------------------
// Oracle blend + clamp
// ---------------------------------------------------------------------------

/// Blend the base score with an external oracle score:
/// `final = base*(1-w) + oracle*w`. A missing oracle score leaves the
/// base untouched (neutral fallback).
pub fn blend(base: i32, oracle: Option<u8>, weight: Decimal) -> i32 {
    match oracle {
        Some(oracle_score) => {
            let blended = Decimal::from(base) * (Decimal::ONE - weight)
                + Decimal::from(oracle_score) * weight;
            blended
                .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
                .to_i32()
                .unwrap_or(base)
        }
        None => base,
    }
}

pub fn clamp_confidence(score: i32, floor: u8) -> u8 {
    score.clamp(i32::from(floor), 99) as u8
}

// ---------------------------------------------------------------------------
// Recommendation mapping
// ---------------------------------------------------------------------------

/// Map a clamped confidence to a label via the configured cut points.
pub fn recommend(confidence: u8, cfg: &ScoringConfig) -> Recommendation {
    if confidence >= cfg.strong_buy_cutoff {
        Recommendation::StrongBuy
    } else if confidence >= cfg.buy_cutoff {
        Recommendation::Buy
    } else {
        Recommendation::Watch
    }
}

/// Full scoring pipeline for one token observation.
pub fn score_token(
    token: &TokenRecord,
    oracle: Option<u8>,
    cfg: &ScoringConfig,
) -> (u8, Recommendation) {
    let base = base_score(token, cfg);
    let blended = blend(base, oracle, cfg.oracle_weight);
    let confidence = clamp_confidence(blended, cfg.floor);
    (confidence, recommend(confidence, cfg))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
