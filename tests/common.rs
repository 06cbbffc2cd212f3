#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{Datelike, NaiveDate, Weekday};
use sheetfill::page::snapshot::{SnapshotRow, TimesheetSnapshot};
use sheetfill::utils::date::{period_label, row_label};
use std::path::{Path, PathBuf};

pub const TODAY: &str = "2026-10-18";

pub fn sfi() -> Command {
    cargo_bin_cmd!("sheetfill")
}

/// sheetfill with an isolated home directory (config + log db live there)
pub fn sfi_in(home: &Path) -> Command {
    let mut cmd = sfi();
    cmd.env("HOME", home).env("APPDATA", home);
    cmd
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn oct(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

pub fn day_row(id: u32, date: NaiveDate, required: Option<&str>, clock: &[Option<&str>]) -> SnapshotRow {
    SnapshotRow {
        id,
        summary: None,
        date: row_label(date),
        required: required.map(str::to_string),
        clock: clock.iter().map(|c| c.map(str::to_string)).collect(),
    }
}

pub fn summary_row(id: u32, text: &str) -> SnapshotRow {
    SnapshotRow {
        id,
        summary: Some(text.to_string()),
        date: String::new(),
        required: None,
        clock: Vec::new(),
    }
}

pub fn sheet(min: NaiveDate, max: NaiveDate, rows: Vec<SnapshotRow>) -> TimesheetSnapshot {
    TimesheetSnapshot {
        period: period_label(min, max),
        viewport_rows: 4,
        render_delay: 0,
        reverse_dom_order: false,
        rows,
    }
}

/// October 2026 as the attendance app shows it on the 18th:
/// weekdays need 8h, weekends nothing, a week total after each Sunday.
///
/// Recorded so far: Oct 5th half a day, Oct 6th a full day, Oct 7th two
/// short pairs. Everything else is blank.
pub fn october_sheet() -> TimesheetSnapshot {
    let mut rows = Vec::new();
    let mut id = 0;
    let mut next = || {
        id += 1;
        id
    };

    for day in 1..=31 {
        let date = oct(day);
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let required = (!weekend).then_some("8h 00m");
        let clock: Vec<Option<&str>> = match day {
            5 => vec![Some("08:00"), Some("12:00")],
            6 => vec![Some("08:00"), Some("16:00")],
            7 => vec![Some("08:00"), Some("10:00"), Some("11:00"), Some("12:00")],
            _ => Vec::new(),
        };
        rows.push(day_row(next(), date, required, &clock));

        if date.weekday() == Weekday::Sun {
            rows.push(summary_row(next(), "Week total"));
        }
    }

    sheet(oct(1), oct(31), rows)
}

/// Identity of the row labelled with `date`.
pub fn id_of(snapshot: &TimesheetSnapshot, date: NaiveDate) -> u32 {
    let label = row_label(date);
    snapshot
        .rows
        .iter()
        .find(|r| r.summary.is_none() && r.date == label)
        .map(|r| r.id)
        .unwrap()
}

/// Past weekdays still short of 8h in [`october_sheet`].
pub fn october_short_days() -> Vec<NaiveDate> {
    (1..18)
        .map(oct)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .filter(|d| d.day() != 6)
        .collect()
}

pub fn write_sheet(dir: &Path, name: &str, snapshot: &TimesheetSnapshot) -> PathBuf {
    let path = dir.join(name);
    snapshot.save(&path).unwrap();
    path
}
