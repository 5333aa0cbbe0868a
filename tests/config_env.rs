use post_impact_alerts::AppConfig;
use serial_test::serial;

const KEYS: &[&str] = &[
    "IMPACT_THRESHOLD",
    "CRYPTO_ONLY",
    "DEDUP_WINDOW_MIN",
    "TELEGRAM_TOKEN",
    "TELEGRAM_CHAT_ID",
    "DRY_RUN",
];

fn clear() {
    for k in KEYS {
        std::env::remove_var(k);
    }
}

#[test]
#[serial]
fn reads_process_environment() {
    clear();
    std::env::set_var("IMPACT_THRESHOLD", "0.75");
    std::env::set_var("CRYPTO_ONLY", "true");
    std::env::set_var("DEDUP_WINDOW_MIN", "15");
    std::env::set_var("TELEGRAM_TOKEN", "123:abc");
    std::env::set_var("TELEGRAM_CHAT_ID", "-42");

    let cfg = AppConfig::from_env();
    assert_eq!(cfg.policy.impact_threshold, 0.75);
    assert!(cfg.policy.crypto_only);
    assert_eq!(cfg.dedup_window(), chrono::Duration::minutes(15));
    assert_eq!(cfg.telegram(), Some(("123:abc", "-42")));
    clear();
}

#[test]
#[serial]
fn dry_run_disables_telegram() {
    clear();
    std::env::set_var("TELEGRAM_TOKEN", "123:abc");
    std::env::set_var("TELEGRAM_CHAT_ID", "-42");
    std::env::set_var("DRY_RUN", "on");

    assert!(AppConfig::from_env().telegram().is_none());
    clear();
}
