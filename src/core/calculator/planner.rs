//! Allocation planner for `autofill`.
//!
//! Pass 1 collects the required minutes of every row that is short of its
//! hours. Planning then draws a randomized actual duration for each of them
//! so that the grand total still equals the total required time exactly.
//! Pass 2 hands each row its planned duration, looked up by identity, and
//! derives a jittered start time and the matching end time.

use crate::errors::{AppError, AppResult};
use crate::models::duration::WorkDuration;
use crate::models::row::{RowData, RowId};
use crate::utils::time::{add_duration, from_minutes_of_day, minutes_of_day};
use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};

const LAST_MINUTE_OF_DAY: i64 = 24 * 60 - 1;

/// Only past days that are short of their required time get touched.
pub fn needs_adjustment(row: &RowData, today: NaiveDate) -> bool {
    row.date < today && row.actual < row.required
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRow {
    pub required: u32,
    pub actual: u32,
}

/// Operation-scoped planner state, threaded through both passes.
#[derive(Debug, Default)]
pub struct AllocationState {
    collected: Vec<(RowId, u32)>,
    pending: BTreeMap<RowId, PlannedRow>,
    skipped: BTreeSet<RowId>,
    planned: bool,
}

impl AllocationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass 1. Returns whether the row was collected.
    pub fn collect(&mut self, row: &RowData, today: NaiveDate) -> AppResult<bool> {
        if self.planned {
            return Err(AppError::Consistency(
                "rows collected after planning".to_string(),
            ));
        }
        if !needs_adjustment(row, today) {
            return Ok(false);
        }
        if self.collected.iter().any(|(id, _)| *id == row.id) {
            return Err(AppError::Consistency(format!(
                "row {} seen twice in the first pass",
                row.id
            )));
        }
        self.collected.push((row.id, row.required.to_minutes()));
        Ok(true)
    }

    /// Pick the rows to touch (`fte_percent` of them) and balance their durations.
    pub fn plan<R: Rng>(&mut self, rng: &mut R, tolerance: u32, fte_percent: u32) -> AppResult<()> {
        if self.planned {
            return Err(AppError::Consistency("allocation planned twice".to_string()));
        }

        let n = self.collected.len();
        let touch = rows_to_touch(n, fte_percent);

        let chosen: BTreeSet<usize> = if touch >= n {
            (0..n).collect()
        } else {
            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(rng);
            order.into_iter().take(touch).collect()
        };

        let (picked, left_out): (Vec<_>, Vec<_>) = self
            .collected
            .iter()
            .enumerate()
            .partition(|(i, _)| chosen.contains(i));

        let required: Vec<u32> = picked.iter().map(|(_, (_, r))| *r).collect();
        let actual = balance_durations(rng, &required, tolerance);

        self.pending = picked
            .iter()
            .zip(actual)
            .map(|((_, (id, r)), a)| {
                (
                    *id,
                    PlannedRow {
                        required: *r,
                        actual: a,
                    },
                )
            })
            .collect();
        self.skipped = left_out.iter().map(|(_, (id, _))| *id).collect();
        self.planned = true;
        Ok(())
    }

    /// Pass 2. `Some(actual minutes)` for a planned row, `None` for a row the
    /// FTE selection left alone.
    pub fn take(&mut self, row: &RowData) -> AppResult<Option<u32>> {
        if !self.planned {
            return Err(AppError::Consistency(
                "second pass started before planning".to_string(),
            ));
        }

        if let Some(plan) = self.pending.remove(&row.id) {
            let now = row.required.to_minutes();
            if plan.required != now {
                return Err(AppError::Consistency(format!(
                    "row {} required {} in the first pass, {} now",
                    row.id,
                    WorkDuration::from_minutes(plan.required),
                    row.required
                )));
            }
            return Ok(Some(plan.actual));
        }

        if self.skipped.remove(&row.id) {
            return Ok(None);
        }

        Err(AppError::Consistency(format!(
            "row {} ({}) was not planned in the first pass",
            row.id,
            row.date_str()
        )))
    }

    /// Every planned row must have been applied.
    pub fn finish(self) -> AppResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let missing: Vec<String> = self.pending.keys().map(|id| id.to_string()).collect();
        Err(AppError::Consistency(format!(
            "planned rows disappeared before the second pass: {}",
            missing.join(", ")
        )))
    }

    /// (sum required, sum actual) over the planned rows still pending.
    pub fn pending_totals(&self) -> (u64, u64) {
        self.pending.values().fold((0, 0), |(r, a), p| {
            (r + u64::from(p.required), a + u64::from(p.actual))
        })
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn skipped_len(&self) -> usize {
        self.skipped.len()
    }
}

/// How many of `n` rows a `fte_percent` schedule fills (rounded up).
pub fn rows_to_touch(n: usize, fte_percent: u32) -> usize {
    let pct = fte_percent.clamp(1, 100) as usize;
    (n * pct).div_ceil(100)
}

/// Randomize each required value within ±`tolerance` (never below zero)
/// while keeping the total equal to the total required.
pub fn balance_durations<R: Rng>(rng: &mut R, required: &[u32], tolerance: u32) -> Vec<u32> {
    let bounds: Vec<(u32, u32)> = required
        .iter()
        .map(|&r| (r.saturating_sub(tolerance), r.saturating_add(tolerance)))
        .collect();

    let mut actual: Vec<u32> = bounds
        .iter()
        .map(|&(lo, hi)| rng.random_range(lo..=hi))
        .collect();

    let target: i64 = required.iter().map(|&r| r as i64).sum();
    let mut diff: i64 = actual.iter().map(|&a| a as i64).sum::<i64>() - target;

    // Each window contains its required value, so there is always slack
    // in the direction diff needs. A random row absorbs a random share of
    // the difference, up to its own slack.
    while diff != 0 {
        let slack = |i: usize| -> i64 {
            if diff > 0 {
                (actual[i] - bounds[i].0) as i64
            } else {
                (bounds[i].1 - actual[i]) as i64
            }
        };
        let candidates: Vec<usize> = (0..actual.len()).filter(|&i| slack(i) > 0).collect();
        if candidates.is_empty() {
            break;
        }

        let i = candidates[rng.random_range(0..candidates.len())];
        let step = rng.random_range(1..=slack(i).min(diff.abs()));
        if diff > 0 {
            actual[i] -= step as u32;
            diff -= step;
        } else {
            actual[i] += step as u32;
            diff += step;
        }
    }

    actual
}

/// Start = nominal ± jitter (not before midnight), end = start + actual.
pub fn schedule_row<R: Rng>(
    rng: &mut R,
    nominal_start: NaiveTime,
    start_jitter: u32,
    actual_minutes: u32,
) -> AppResult<(NaiveTime, NaiveTime)> {
    let jitter = start_jitter as i64;
    let offset = if jitter == 0 {
        0
    } else {
        rng.random_range(-jitter..=jitter)
    };

    let start_min = (minutes_of_day(nominal_start) as i64 + offset).clamp(0, LAST_MINUTE_OF_DAY);
    let start = from_minutes_of_day(start_min as u32)
        .ok_or_else(|| AppError::Schedule(format!("invalid start minute {}", start_min)))?;
    let end = add_duration(start, WorkDuration::from_minutes(actual_minutes))?;

    Ok((start, end))
}
