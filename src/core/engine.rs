//! Operation orchestrator: `clear` and `autofill`, plus the command interface
//! used by the extension shell (`{"action": ...}` → `{"status": ...}`).

use crate::config::{Config, MAX_FUZZ_MINUTES};
use crate::core::calculator::planner::{AllocationState, needs_adjustment, schedule_row};
use crate::core::extract::read_period;
use crate::core::interact::{Interactor, RowWrite};
use crate::core::table::{Flow, for_each_row};
use crate::errors::{AppError, AppResult};
use crate::models::duration::WorkDuration;
use crate::models::period::TimesheetPeriod;
use crate::models::row::{RowData, RowId};
use crate::page::{Page, PageContext};
use crate::ui::messages::info;
use crate::utils::time::display_time;
use chrono::{NaiveDate, NaiveTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Autofill,
    Clear,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "autofill" => Some(Action::Autofill),
            "clear" => Some(Action::Clear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Autofill => "autofill",
            Action::Clear => "clear",
        }
    }
}

/// Message from the extension shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub action: String,
}

impl Request {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
        }
    }
}

/// Terminal answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Completed,
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Response::Completed)
    }
}

/// Jitter in minutes, kept within a day whatever the caller put in the config.
fn minutes_setting(value: i64) -> u32 {
    value.clamp(0, MAX_FUZZ_MINUTES) as u32
}

/// The subset of the settings the engine works with, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub nominal_start: NaiveTime,
    pub start_jitter: u32,
    pub duration_tolerance: u32,
    pub fte_percent: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EngineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            nominal_start: cfg.nominal_start(),
            start_jitter: minutes_setting(cfg.fuzz_start_time),
            duration_tolerance: minutes_setting(cfg.fuzz_duration),
            fte_percent: u32::try_from(cfg.fte_percent.max(1)).unwrap_or(u32::MAX),
        }
    }
}

/// One row the operation actually wrote to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChange {
    pub id: RowId,
    pub date: NaiveDate,
    pub required: WorkDuration,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub cells_written: usize,
}

#[derive(Debug, Clone)]
pub struct OperationSummary {
    pub action: Action,
    pub period: TimesheetPeriod,
    pub rows_visited: usize,
    pub rows_planned: usize,
    pub cell_writes: usize,
    pub changes: Vec<RowChange>,
}

impl OperationSummary {
    fn new(action: Action, period: TimesheetPeriod) -> Self {
        Self {
            action,
            period,
            rows_visited: 0,
            rows_planned: 0,
            cell_writes: 0,
            changes: Vec::new(),
        }
    }

    fn record(
        &mut self,
        row: &RowData,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
        write: RowWrite,
    ) {
        if write.cells_written == 0 {
            return;
        }
        self.cell_writes += write.cells_written;
        self.changes.push(RowChange {
            id: row.id,
            date: row.date,
            required: row.required,
            start,
            end,
            cells_written: write.cells_written,
        });
    }

    pub fn rows_changed(&self) -> usize {
        self.changes.len()
    }
}

/// Resets the single-flight flag when the operation ends, however it ends.
pub struct OperationGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct Engine {
    settings: EngineSettings,
    ctx: PageContext,
    today: NaiveDate,
    seed: Option<u64>,
    verbose: bool,
    busy: AtomicBool,
}

impl Engine {
    pub fn new(settings: EngineSettings, ctx: PageContext, today: NaiveDate) -> Self {
        Self {
            settings,
            ctx,
            today,
            seed: None,
            verbose: false,
            busy: AtomicBool::new(false),
        }
    }

    /// Deterministic randomness (tests, reproducible runs).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Print one line per written row.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Claim the engine for one operation; a second claim fails with `Busy`.
    pub fn begin(&self) -> AppResult<OperationGuard<'_>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(AppError::Busy);
        }
        Ok(OperationGuard { flag: &self.busy })
    }

    /// Command interface: never panics, never returns an `Err`.
    pub fn handle<P: Page + ?Sized>(&self, page: &mut P, request: &Request) -> Response {
        let Some(action) = Action::parse(request.action.trim()) else {
            return Response::error("Unknown action");
        };

        match self.run(page, action) {
            Ok(_) => Response::Completed,
            Err(e) => Response::error(e.to_string()),
        }
    }

    pub fn run<P: Page + ?Sized>(&self, page: &mut P, action: Action) -> AppResult<OperationSummary> {
        let _guard = self.begin()?;
        match action {
            Action::Clear => self.clear_rows(page),
            Action::Autofill => self.autofill_rows(page),
        }
    }

    pub fn clear<P: Page + ?Sized>(&self, page: &mut P) -> AppResult<OperationSummary> {
        self.run(page, Action::Clear)
    }

    pub fn autofill<P: Page + ?Sized>(&self, page: &mut P) -> AppResult<OperationSummary> {
        self.run(page, Action::Autofill)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn report(&self, row: &RowData, start: Option<NaiveTime>, end: Option<NaiveTime>) {
        if self.verbose {
            info(format!(
                "{} {}: {} → {}",
                row.id,
                row.date_str(),
                display_time(start),
                display_time(end)
            ));
        }
    }

    // ------------------------------------------------
    // CLEAR: one pass, blank every row
    // ------------------------------------------------
    fn clear_rows<P: Page + ?Sized>(&self, page: &mut P) -> AppResult<OperationSummary> {
        let period = read_period(page, &self.ctx.locators)?;
        let mut summary = OperationSummary::new(Action::Clear, period);

        let stats = for_each_row(page, &self.ctx, &period, |p, row| {
            let write = Interactor::new(p, &self.ctx).set_row_times(row.id, None, None)?;
            if write.cells_written > 0 {
                self.report(row, None, None);
            }
            summary.record(row, None, None, write);
            Ok(Flow::Continue)
        })?;

        summary.rows_visited = stats.rows_visited;
        Ok(summary)
    }

    // ------------------------------------------------
    // AUTOFILL: collect, plan, apply
    // ------------------------------------------------
    fn autofill_rows<P: Page + ?Sized>(&self, page: &mut P) -> AppResult<OperationSummary> {
        let period = read_period(page, &self.ctx.locators)?;
        let mut summary = OperationSummary::new(Action::Autofill, period);
        let mut rng = self.rng();
        let mut state = AllocationState::new();

        // 1️⃣ first pass: who is short of hours?
        let first = for_each_row(page, &self.ctx, &period, |_, row| {
            state.collect(row, self.today)?;
            Ok(Flow::Continue)
        })?;
        summary.rows_visited = first.rows_visited;

        // 2️⃣ plan
        state.plan(
            &mut rng,
            self.settings.duration_tolerance,
            self.settings.fte_percent,
        )?;
        summary.rows_planned = state.pending_len();

        if state.pending_len() == 0 && state.skipped_len() == 0 {
            return Ok(summary);
        }

        let period_now = read_period(page, &self.ctx.locators)?;
        if period_now != period {
            return Err(AppError::Consistency(format!(
                "timesheet period changed from {} .. {} to {} .. {}",
                period.min_date(),
                period.max_date(),
                period_now.min_date(),
                period_now.max_date()
            )));
        }

        // 3️⃣ second pass: write the planned rows
        let settings = &self.settings;
        for_each_row(page, &self.ctx, &period, |p, row| {
            if !needs_adjustment(row, self.today) {
                return Ok(Flow::Continue);
            }
            let Some(actual) = state.take(row)? else {
                return Ok(Flow::Continue);
            };

            let (start, end) = schedule_row(
                &mut rng,
                settings.nominal_start,
                settings.start_jitter,
                actual,
            )?;
            let write =
                Interactor::new(p, &self.ctx).set_row_times(row.id, Some(start), Some(end))?;
            if write.cells_written > 0 {
                self.report(row, Some(start), Some(end));
            }
            summary.record(row, Some(start), Some(end), write);
            Ok(Flow::Continue)
        })?;

        state.finish()?;
        Ok(summary)
    }
}
