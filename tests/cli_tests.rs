use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use sheetfill::page::snapshot::{SimulatedPage, TimesheetSnapshot};
use std::fs;

mod common;
use common::{TODAY, day_row, id_of, oct, october_sheet, sfi_in, sheet, write_sheet};

#[test]
fn init_creates_config_and_log_database() {
    let home = tempfile::tempdir().unwrap();

    sfi_in(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("initialization completed"));

    let dir = home.path().join(".sheetfill");
    assert!(dir.join("sheetfill.conf").exists());
    assert!(dir.join("sheetfill.sqlite").exists());

    sfi_in(home.path())
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("init"));
}

#[test]
fn test_mode_init_leaves_no_config_file() {
    let home = tempfile::tempdir().unwrap();
    let db = home.path().join("custom.sqlite");

    sfi_in(home.path())
        .args(["--db", db.to_str().unwrap(), "--test", "init"])
        .assert()
        .success();

    assert!(db.exists());
    assert!(!home.path().join(".sheetfill/sheetfill.conf").exists());
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();

    sfi_in(home.path())
        .args(["config", "--set", "ftePercent=80"])
        .assert()
        .success();

    sfi_in(home.path())
        .args(["config", "--get", "ftePercent"])
        .assert()
        .success()
        .stdout(contains("80"));

    sfi_in(home.path())
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(contains("ftePercent: 80").and(contains("nominalStartTime")));
}

#[test]
fn config_set_rejects_bad_values_and_keys() {
    let home = tempfile::tempdir().unwrap();

    sfi_in(home.path())
        .args(["config", "--set", "fuzzDuration=lots"])
        .assert()
        .failure()
        .stderr(contains("expects a number"));

    sfi_in(home.path())
        .args(["config", "--set", "shoeSize=42"])
        .assert()
        .failure()
        .stderr(contains("unknown key"));
}

#[test]
fn hand_edited_config_is_read_leniently() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".sheetfill");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("sheetfill.conf"),
        "fuzzStartTime: soon\nftePercent: \"-5\"\n",
    )
    .unwrap();

    sfi_in(home.path())
        .args(["config", "--get", "fuzzStartTime"])
        .assert()
        .success()
        .stdout(contains("15"));

    sfi_in(home.path())
        .args(["config", "--get", "ftePercent"])
        .assert()
        .success()
        .stdout(contains("1"));

    sfi_in(home.path())
        .args(["config", "--check"])
        .assert()
        .success()
        .stderr(contains("'nominalStartTime' not set"));
}

#[test]
fn clear_rewrites_the_timesheet() {
    let home = tempfile::tempdir().unwrap();
    let snapshot = october_sheet();
    let path = write_sheet(home.path(), "october.yaml", &snapshot);

    sfi_in(home.path())
        .args(["clear", "--page", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("3 row(s) updated"));

    let page = SimulatedPage::new(&TimesheetSnapshot::load(&path).unwrap()).unwrap();
    let id = id_of(&snapshot, oct(6));
    assert_eq!(page.row_clock(id).unwrap(), vec!["--:--", "--:--"]);
}

#[test]
fn autofill_dry_run_keeps_the_file() {
    let home = tempfile::tempdir().unwrap();
    let path = write_sheet(home.path(), "october.yaml", &october_sheet());
    let before = fs::read_to_string(&path).unwrap();

    sfi_in(home.path())
        .args([
            "autofill",
            "--page",
            path.to_str().unwrap(),
            "--today",
            TODAY,
            "--seed",
            "7",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(contains("Dry run"))
        .stdout(contains("REQUIRED"));

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn autofill_writes_and_logs() {
    let home = tempfile::tempdir().unwrap();
    let snapshot = october_sheet();
    let path = write_sheet(home.path(), "october.yaml", &snapshot);

    sfi_in(home.path())
        .args([
            "autofill",
            "--page",
            path.to_str().unwrap(),
            "--today",
            TODAY,
            "--seed",
            "7",
        ])
        .assert()
        .success()
        .stdout(contains("11 row(s) updated"));

    let page = SimulatedPage::new(&TimesheetSnapshot::load(&path).unwrap()).unwrap();
    assert!(page.actual_minutes(id_of(&snapshot, oct(1))).unwrap() > 0);

    sfi_in(home.path())
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("autofill").and(contains("11 rows changed")));
}

#[test]
fn autofill_out_of_period_row_fails_and_keeps_the_file() {
    let home = tempfile::tempdir().unwrap();
    let bad = sheet(
        oct(1),
        oct(31),
        vec![
            day_row(1, oct(1), Some("8h 00m"), &[]),
            day_row(2, chrono::NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(), None, &[]),
        ],
    );
    let path = write_sheet(home.path(), "bad.yaml", &bad);
    let before = fs::read_to_string(&path).unwrap();

    sfi_in(home.path())
        .args(["autofill", "--page", path.to_str().unwrap(), "--today", TODAY])
        .assert()
        .failure()
        .stderr(contains("Error: Date out of timesheet period"));

    assert_eq!(fs::read_to_string(&path).unwrap(), before);

    sfi_in(home.path())
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("autofill failed"));
}

#[test]
fn invalid_today_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let path = write_sheet(home.path(), "october.yaml", &october_sheet());

    sfi_in(home.path())
        .args(["autofill", "--page", path.to_str().unwrap(), "--today", "18/10/2026"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn message_answers_with_a_status_object() {
    let home = tempfile::tempdir().unwrap();
    let path = write_sheet(home.path(), "october.yaml", &october_sheet());

    sfi_in(home.path())
        .args(["message", "--page", path.to_str().unwrap(), r#"{"action":"nuke"}"#])
        .assert()
        .success()
        .stdout(contains(r#"{"status":"error","message":"Unknown action"}"#));

    sfi_in(home.path())
        .args(["message", "--page", path.to_str().unwrap(), "not json"])
        .assert()
        .success()
        .stdout(contains(r#""status":"error""#).and(contains("Malformed request")));
}

#[test]
fn message_reads_the_request_from_stdin() {
    let home = tempfile::tempdir().unwrap();
    let snapshot = october_sheet();
    let path = write_sheet(home.path(), "october.yaml", &snapshot);

    sfi_in(home.path())
        .args(["message", "--page", path.to_str().unwrap()])
        .write_stdin(r#"{"action":"clear"}"#)
        .assert()
        .success()
        .stdout(contains(r#"{"status":"completed"}"#));

    let page = SimulatedPage::new(&TimesheetSnapshot::load(&path).unwrap()).unwrap();
    assert_eq!(page.actual_minutes(id_of(&snapshot, oct(5))), Some(0));
}

#[test]
fn missing_page_file_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("nowhere.yaml");

    sfi_in(home.path())
        .args(["clear", "--page", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Timesheet file not found"));
}

#[test]
fn message_rejects_bad_requests_before_reading_the_page() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("nowhere.yaml");

    sfi_in(home.path())
        .args(["message", "--page", missing.to_str().unwrap(), r#"{"action":"nuke"}"#])
        .assert()
        .success()
        .stdout(contains(r#"{"status":"error","message":"Unknown action"}"#));

    sfi_in(home.path())
        .args(["message", "--page", missing.to_str().unwrap(), "{"])
        .assert()
        .success()
        .stdout(contains("Malformed request"));

    // a valid action does need the page
    sfi_in(home.path())
        .args(["message", "--page", missing.to_str().unwrap(), r#"{"action":"clear"}"#])
        .assert()
        .failure()
        .stderr(contains("Timesheet file not found"));
}
