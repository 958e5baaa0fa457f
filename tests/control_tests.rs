mod common;

use rust_decimal::Decimal;
use snipebot::config::{Settings, SettingsDoc};
use snipebot::models::Chain;

use common::{build_bot, token};

#[tokio::test]
async fn test_start_applies_overrides() {
    let bot = build_bot(vec![], &[], Decimal::ONE, 0.0, SettingsDoc::default());

    let overrides = Settings {
        min_confidence: 60,
        auto_buy_enabled: true,
        ..Settings::default()
    };
    bot.engine.start(Some(overrides)).await.unwrap();

    let snapshot = bot.engine.snapshot().await;
    assert!(snapshot.running);
    assert_eq!(snapshot.settings.min_confidence, 60);
    assert!(snapshot.settings.auto_buy_enabled);

    bot.engine.stop().await;
    assert!(!bot.engine.running().await);
}

#[tokio::test]
async fn test_start_while_running_updates_settings_in_place() {
    let bot = build_bot(vec![], &[], Decimal::ONE, 0.0, SettingsDoc::default());

    bot.engine.start(None).await.unwrap();
    let overrides = Settings {
        min_confidence: 55,
        ..Settings::default()
    };
    bot.engine.start(Some(overrides)).await.unwrap();

    let snapshot = bot.engine.snapshot().await;
    assert!(snapshot.running);
    assert_eq!(snapshot.settings.min_confidence, 55);

    bot.engine.stop().await;
}

#[tokio::test]
async fn test_restart_after_stop() {
    let bot = build_bot(vec![], &[], Decimal::ONE, 0.0, SettingsDoc::default());

    bot.engine.start(None).await.unwrap();
    bot.engine.stop().await;
    bot.engine.start(None).await.unwrap();
    assert!(bot.engine.running().await);

    bot.engine.stop().await;
    assert!(!bot.engine.running().await);
}

#[tokio::test]
async fn test_invalid_overrides_do_not_start_the_bot() {
    let bot = build_bot(vec![], &[], Decimal::ONE, 0.0, SettingsDoc::default());

    let bad = Settings {
        stop_loss: Decimal::ZERO,
        ..Settings::default()
    };
    assert!(bot.engine.start(Some(bad)).await.is_err());
    assert!(!bot.engine.running().await);
}

#[tokio::test]
async fn test_manual_scan_works_while_stopped() {
    let bot = build_bot(
        vec![token("HOT", Chain::Base, 150_000, 120_000, 10)],
        &[],
        Decimal::ONE,
        0.0,
        SettingsDoc::default(),
    );

    assert_eq!(bot.engine.scan_market(Chain::Base).await, 1);
    let snapshot = bot.engine.snapshot().await;
    assert!(!snapshot.running);
    assert_eq!(snapshot.signals.len(), 1);
}

#[tokio::test]
async fn test_report_names_top_signal() {
    let bot = build_bot(
        vec![
            token("HOT", Chain::Base, 150_000, 120_000, 10),
            token("WARM", Chain::Base, 150_000, 60_000, 0),
        ],
        &[],
        Decimal::ONE,
        0.0,
        SettingsDoc::default(),
    );
    bot.engine.scan_chain(Chain::Base, None).await;

    let summary = bot.engine.report_tick().await;
    assert!(!summary.running);
    assert_eq!(summary.open_positions, 0);
    assert_eq!(summary.stats.signals_today, 2);

    let top = summary.top_signal.expect("strongest signal present");
    assert_eq!(top.token, "HOT");
    assert!(summary.text.contains("stopped"));
    assert!(summary.text.contains("HOT"));
}
