//! Time-of-day utilities: parsing HH:MM, the empty-slot sentinel, shifting by durations.

use crate::errors::{AppError, AppResult};
use crate::models::duration::WorkDuration;
use chrono::{NaiveTime, Timelike};

/// What an empty clock slot displays.
pub const EMPTY_TIME: &str = "--:--";

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Display form of an optional slot value: `HH:MM` or `--:--`.
pub fn display_time(t: Option<NaiveTime>) -> String {
    t.map(format_time).unwrap_or_else(|| EMPTY_TIME.to_string())
}

/// Inverse of [`display_time`]: the sentinel (or blank) means "no time".
pub fn parse_slot(value: &str) -> AppResult<Option<NaiveTime>> {
    let v = value.trim();
    if v.is_empty() || v == EMPTY_TIME {
        return Ok(None);
    }
    parse_time(v)
        .map(Some)
        .ok_or_else(|| AppError::InvalidTime(v.to_string()))
}

pub fn minutes_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

pub fn from_minutes_of_day(mins: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(mins / 60, mins % 60, 0)
}

/// `start + duration`, refusing to wrap past midnight.
pub fn add_duration(start: NaiveTime, duration: WorkDuration) -> AppResult<NaiveTime> {
    minutes_of_day(start)
        .checked_add(duration.to_minutes())
        .and_then(from_minutes_of_day)
        .ok_or_else(|| {
            AppError::Schedule(format!(
                "{} + {} ends past midnight",
                format_time(start),
                duration
            ))
        })
}

/// Minutes between two times of day (0 when `end` is not after `start`).
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> u32 {
    minutes_of_day(end).saturating_sub(minutes_of_day(start))
}
