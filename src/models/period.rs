use super::month_day::{MonthDay, month_index};
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static PERIOD_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})")
        .expect("valid period regex")
});

/// Longest span accepted for a period label; anything wider is a mis-read header.
pub const MAX_PERIOD_DAYS: i64 = 366;

/// Calendar bounds of the timesheet currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimesheetPeriod {
    min_date: NaiveDate,
    max_date: NaiveDate,
}

impl TimesheetPeriod {
    pub fn new(min_date: NaiveDate, max_date: NaiveDate) -> AppResult<Self> {
        if min_date > max_date {
            return Err(AppError::Parse(format!(
                "period starts after it ends ({} > {})",
                min_date, max_date
            )));
        }
        if (max_date - min_date).num_days() > MAX_PERIOD_DAYS {
            return Err(AppError::Parse(format!(
                "period {} .. {} spans more than {} days",
                min_date, max_date, MAX_PERIOD_DAYS
            )));
        }
        Ok(Self { min_date, max_date })
    }

    /// Parse the header label: `"Oct 1st, 2026 - Oct 31st, 2026"`.
    pub fn parse(label: &str) -> AppResult<Self> {
        let dates = PERIOD_DATE_RE
            .captures_iter(label)
            .map(|caps| {
                let month = month_index(&caps[1]).ok_or_else(|| {
                    AppError::Parse(format!("unknown month '{}' in period", &caps[1]))
                })?;
                let day: u32 = caps[2]
                    .parse()
                    .map_err(|_| AppError::Parse(format!("invalid day in period '{}'", label)))?;
                let year: i32 = caps[3]
                    .parse()
                    .map_err(|_| AppError::Parse(format!("invalid year in period '{}'", label)))?;
                NaiveDate::from_ymd_opt(year, month + 1, day)
                    .ok_or_else(|| AppError::Parse(format!("invalid date in period '{}'", label)))
            })
            .collect::<AppResult<Vec<_>>>()?;

        match dates.as_slice() {
            [min, max] => Self::new(*min, *max),
            _ => Err(AppError::Parse(format!(
                "period label '{}' must contain exactly two dates",
                label.trim()
            ))),
        }
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min_date <= date && date <= self.max_date
    }

    /// Give a year-less row label its full date.
    ///
    /// The label is first placed in the year the period starts; if that day
    /// does not exist or lies before the period, the following year is tried.
    pub fn resolve(&self, md: &MonthDay) -> AppResult<NaiveDate> {
        let first_year = self.min_date.year();

        let resolved = [first_year, first_year + 1]
            .into_iter()
            .filter_map(|year| NaiveDate::from_ymd_opt(year, md.month(), md.day))
            .find(|d| *d >= self.min_date);

        let date = match resolved {
            Some(d) if self.contains(d) => d,
            _ => {
                return Err(AppError::DateOutOfRange(format!(
                    "{:02}-{:02} does not fall in {} .. {}",
                    md.month(),
                    md.day,
                    self.min_date,
                    self.max_date
                )));
            }
        };

        if let Some(wd) = md.weekday
            && wd != date.weekday()
        {
            return Err(AppError::DateOutOfRange(format!(
                "{} is a {:?}, label says {:?}",
                date,
                date.weekday(),
                wd
            )));
        }

        Ok(date)
    }
}
