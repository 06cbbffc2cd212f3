use sheetfill::config::{
    Config, DEFAULT_FTE_PERCENT, DEFAULT_NOMINAL_START, DEFAULT_NOMINAL_START_TIME, MAX_FUZZ_MINUTES,
};
use sheetfill::core::engine::EngineSettings;
use sheetfill::errors::AppError;
use std::fs;
use std::time::Duration;

#[test]
fn empty_file_gives_defaults() {
    let cfg = Config::from_yaml("").unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.nominal_start_time, DEFAULT_NOMINAL_START);
    assert_eq!(cfg.fte_percent, DEFAULT_FTE_PERCENT);
}

#[test]
fn bad_values_fall_back_one_key_at_a_time() {
    let cfg = Config::from_yaml(
        r#"
nominalStartTime: "25:99"
fuzzStartTime: "abc"
fuzzDuration: "20"
ftePercent: 80
"#,
    )
    .unwrap();

    assert_eq!(cfg.nominal_start_time, "08:00");
    assert_eq!(cfg.fuzz_start_time, 15);
    assert_eq!(cfg.fuzz_duration, 20);
    assert_eq!(cfg.fte_percent, 80);
}

#[test]
fn out_of_range_values_are_clamped() {
    let cfg = Config::from_yaml(
        r#"
fuzzStartTime: -10
fuzzDuration: -1
ftePercent: 0
uiSettleMs: 100
uiTimeoutMs: 20
"#,
    )
    .unwrap();

    assert_eq!(cfg.fuzz_start_time, 0);
    assert_eq!(cfg.fuzz_duration, 0);
    assert_eq!(cfg.fte_percent, 1);
    assert_eq!(cfg.ui_timeout_ms, 100);
}

#[test]
fn broken_yaml_is_an_error_for_strict_callers() {
    assert!(matches!(
        Config::from_yaml("ftePercent: [80"),
        Err(AppError::Yaml(_))
    ));
}

#[test]
fn set_validates_and_get_reads_back() {
    let mut cfg = Config::default();

    cfg.set("ftePercent", "75").unwrap();
    assert_eq!(cfg.get("ftePercent").as_deref(), Some("75"));

    cfg.set("nominalStartTime", "09:30").unwrap();
    assert_eq!(cfg.get("nominalStartTime").as_deref(), Some("09:30"));

    assert!(matches!(
        cfg.set("nominalStartTime", "9.30"),
        Err(AppError::InvalidTime(_))
    ));
    assert!(matches!(cfg.set("fuzzDuration", "lots"), Err(AppError::Config(_))));
    assert!(matches!(cfg.set("colour", "blue"), Err(AppError::Config(_))));
    assert_eq!(cfg.get("colour"), None);
}

#[test]
fn saved_file_reads_back_and_reports_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheetfill.conf");

    let mut cfg = Config::default();
    cfg.set("fuzzStartTime", "5").unwrap();
    cfg.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert!(Config::missing_keys(&path).unwrap().is_empty());

    fs::write(&path, "ftePercent: 90\n").unwrap();
    let missing = Config::missing_keys(&path).unwrap();
    assert!(missing.contains(&"nominalStartTime"));
    assert!(!missing.contains(&"ftePercent"));
}

#[test]
fn engine_and_waiter_take_their_settings_from_the_config() {
    let mut cfg = Config::default();
    cfg.set("nominalStartTime", "07:30").unwrap();
    cfg.set("fuzzStartTime", "0").unwrap();
    cfg.set("ftePercent", "150").unwrap();
    cfg.set("uiSettleMs", "10").unwrap();
    cfg.set("uiTimeoutMs", "100").unwrap();

    let settings = EngineSettings::from_config(&cfg);
    assert_eq!(settings.nominal_start.to_string(), "07:30:00");
    assert_eq!(settings.start_jitter, 0);
    assert_eq!(settings.fte_percent, 150);

    let waiter = cfg.waiter();
    assert_eq!(waiter.step(), Duration::from_millis(10));
    assert_eq!(waiter.max_polls(), 10);
}

#[test]
fn huge_numbers_do_not_wrap_into_small_settings() {
    let mut cfg = Config::default();
    cfg.set("ftePercent", "4294967296").unwrap();
    cfg.set("fuzzDuration", "4294967295").unwrap();
    cfg.set("fuzzStartTime", "99999999999").unwrap();

    assert_eq!(cfg.fuzz_duration, MAX_FUZZ_MINUTES);
    assert_eq!(cfg.fuzz_start_time, MAX_FUZZ_MINUTES);

    let settings = EngineSettings::from_config(&cfg);
    assert_eq!(settings.fte_percent, u32::MAX);
    assert_eq!(settings.duration_tolerance, 24 * 60);
    assert_eq!(settings.start_jitter, 24 * 60);

    // a hand-edited file bypasses `set`, the engine still sees bounded values
    let mut raw = Config::default();
    raw.fuzz_duration = i64::MAX;
    raw.fte_percent = i64::MAX;
    let settings = EngineSettings::from_config(&raw);
    assert_eq!(settings.duration_tolerance, 24 * 60);
    assert_eq!(settings.fte_percent, u32::MAX);
}

#[test]
fn unusable_start_time_falls_back_to_the_default_not_midnight() {
    let mut cfg = Config::default();
    cfg.nominal_start_time = "late-ish".to_string();

    assert_eq!(cfg.nominal_start(), DEFAULT_NOMINAL_START_TIME);
    assert_eq!(EngineSettings::from_config(&cfg).nominal_start.to_string(), "08:00:00");
    assert_eq!(DEFAULT_NOMINAL_START_TIME.format("%H:%M").to_string(), DEFAULT_NOMINAL_START);
}
