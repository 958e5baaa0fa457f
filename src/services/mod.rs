pub mod market_scanner;
pub mod notifier;
pub mod reporter;
pub mod revaluer;
pub mod whale_watch;
