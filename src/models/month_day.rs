use crate::errors::{AppError, AppResult};
use chrono::Weekday;
use regex::Regex;
use std::sync::LazyLock;

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([A-Za-z]+)\.?,?\s+)?([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?$")
        .expect("valid month-day regex")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Calendar day without a year, as printed in the row labels ("Oct 18th").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    /// 0 = January ... 11 = December
    pub month0: u32,
    pub day: u32,
    /// Weekday printed in front of the date, when there is one ("Sun, Oct 18th").
    pub weekday: Option<Weekday>,
}

impl MonthDay {
    pub fn parse(text: &str) -> AppResult<Self> {
        let trimmed = text.trim();
        let caps = MONTH_DAY_RE
            .captures(trimmed)
            .ok_or_else(|| AppError::Parse(format!("invalid date label '{}'", trimmed)))?;

        let weekday = match caps.get(1) {
            Some(w) => Some(parse_weekday(w.as_str()).ok_or_else(|| {
                AppError::Parse(format!("unknown weekday '{}' in '{}'", w.as_str(), trimmed))
            })?),
            None => None,
        };

        let month0 = month_index(&caps[2]).ok_or_else(|| {
            AppError::Parse(format!("unknown month '{}' in '{}'", &caps[2], trimmed))
        })?;

        let day: u32 = caps[3]
            .parse()
            .map_err(|_| AppError::Parse(format!("invalid day in '{}'", trimmed)))?;
        if !(1..=31).contains(&day) {
            return Err(AppError::Parse(format!("invalid day in '{}'", trimmed)));
        }

        Ok(Self {
            month0,
            day,
            weekday,
        })
    }

    /// 1-based month, as chrono wants it.
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }
}

/// "Oct", "october", "Sept" → 9
pub fn month_index(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32)
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    match &lower[..3] {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
