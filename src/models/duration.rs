use crate::errors::{AppError, AppResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)h(\d+)m").expect("valid duration regex"));

/// Amount of worked time as shown by the timesheet ("8h 30m").
///
/// Hours are unbounded (a duration can exceed a day), minutes stay in [0, 60).
/// Field order gives the lexicographic (hours, minutes) ordering.
/// The total always fits in `u32` minutes, so `to_minutes` cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDuration {
    hours: u32,
    minutes: u32,
}

impl WorkDuration {
    pub const ZERO: WorkDuration = WorkDuration {
        hours: 0,
        minutes: 0,
    };

    /// Build from hours and minutes, carrying minute overflow into hours.
    /// `None` when the total does not fit in `u32` minutes.
    pub fn new(hours: u32, minutes: u32) -> Option<Self> {
        hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .map(Self::from_minutes)
    }

    pub fn from_minutes(total: u32) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    /// Parse a `<int>h<int>m` label. Whitespace anywhere is ignored.
    pub fn parse(text: &str) -> AppResult<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

        let caps = DURATION_RE
            .captures(&compact)
            .ok_or_else(|| AppError::Parse(format!("invalid duration '{}'", text.trim())))?;

        let hours: u32 = caps[1]
            .parse()
            .map_err(|_| AppError::Parse(format!("hours out of range in '{}'", text.trim())))?;
        let minutes: u32 = caps[2]
            .parse()
            .map_err(|_| AppError::Parse(format!("minutes out of range in '{}'", text.trim())))?;

        Self::new(hours, minutes)
            .ok_or_else(|| AppError::Parse(format!("duration out of range in '{}'", text.trim())))
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn to_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    /// `None` on overflow.
    pub fn add(&self, other: WorkDuration) -> Option<WorkDuration> {
        self.to_minutes()
            .checked_add(other.to_minutes())
            .map(WorkDuration::from_minutes)
    }

    /// Label in the host page style: `08h 30m`.
    pub fn label(&self) -> String {
        format!("{:02}h {:02}m", self.hours, self.minutes)
    }
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}
