//! Bounded, newest-first store of scored signals.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::Signal;

/// Ordered signal collection with id-keyed dedupe, a size cap (oldest
/// evicted first) and age-based expiry.
#[derive(Debug)]
pub struct SignalRegistry {
    signals: VecDeque<Signal>,
    cap: usize,
    ttl: Duration,
}

impl SignalRegistry {
    pub fn new(cap: usize, ttl_secs: u64) -> Self {
        Self {
            signals: VecDeque::with_capacity(cap.min(64)),
            cap,
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Insert at the front. Returns `false` without mutating when a signal
    /// with the same id is already present.
    pub fn insert(&mut self, signal: Signal) -> bool {
        if self.signals.iter().any(|s| s.id == signal.id) {
            return false;
        }
        self.signals.push_front(signal);
        while self.signals.len() > self.cap {
            self.signals.pop_back();
        }
        true
    }

    pub fn by_id(&self, id: Uuid) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id == id)
    }

    /// Most recent signal for a token symbol.
    pub fn by_symbol(&self, symbol: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.token == symbol)
    }

    /// Resolve a client-supplied key that may be either a signal id or a
    /// token symbol.
    pub fn find(&self, key: &str) -> Option<&Signal> {
        if let Ok(id) = key.parse::<Uuid>() {
            if let Some(signal) = self.by_id(id) {
                return Some(signal);
            }
        }
        self.by_symbol(key)
    }

    /// Drop signals older than the configured TTL. Returns how many were
    /// removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.signals.len();
        let ttl = self.ttl;
        self.signals.retain(|s| now - s.created_at <= ttl);
        before - self.signals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn snapshot(&self) -> Vec<Signal> {
        self.signals.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chain, Recommendation, SignalSource};
    use rust_decimal::Decimal;

    fn signal(symbol: &str) -> Signal {
        Signal {
            id: Uuid::new_v4(),
            token: symbol.to_string(),
            address: format!("0x{symbol}"),
            chain: Chain::Base,
            price: Decimal::ONE,
            confidence: 85,
            recommendation: Recommendation::Buy,
            volume_24h: Decimal::from(150_000),
            liquidity: Decimal::from(120_000),
            change_24h: Decimal::from(10),
            source: SignalSource::Scanner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut registry = SignalRegistry::new(10, 3600);
        registry.insert(signal("AAA"));
        registry.insert(signal("BBB"));
        let tokens: Vec<_> = registry.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(tokens, vec!["BBB", "AAA"]);
    }

    #[test]
    fn test_evicts_oldest_past_cap() {
        let mut registry = SignalRegistry::new(3, 3600);
        for symbol in ["A", "B", "C", "D"] {
            registry.insert(signal(symbol));
        }
        assert_eq!(registry.len(), 3);
        assert!(registry.by_symbol("A").is_none());
        assert!(registry.by_symbol("D").is_some());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = SignalRegistry::new(10, 3600);
        let s = signal("AAA");
        assert!(registry.insert(s.clone()));
        assert!(!registry.insert(s));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_symbol_collision_most_recent_wins() {
        let mut registry = SignalRegistry::new(10, 3600);
        let mut older = signal("PEPE");
        older.confidence = 70;
        let mut newer = signal("PEPE");
        newer.confidence = 92;
        registry.insert(older);
        registry.insert(newer);
        assert_eq!(registry.by_symbol("PEPE").map(|s| s.confidence), Some(92));
    }

    #[test]
    fn test_find_by_id_or_symbol() {
        let mut registry = SignalRegistry::new(10, 3600);
        let s = signal("WIF");
        let id = s.id;
        registry.insert(s);
        assert!(registry.find(&id.to_string()).is_some());
        assert!(registry.find("WIF").is_some());
        assert!(registry.find("unknown").is_none());
    }

    #[test]
    fn test_prune_expired() {
        let mut registry = SignalRegistry::new(10, 60);
        let mut stale = signal("OLD");
        stale.created_at = Utc::now() - Duration::seconds(120);
        registry.insert(stale);
        registry.insert(signal("NEW"));

        assert_eq!(registry.prune_expired(Utc::now()), 1);
        assert!(registry.by_symbol("OLD").is_none());
        assert!(registry.by_symbol("NEW").is_some());
    }
}
