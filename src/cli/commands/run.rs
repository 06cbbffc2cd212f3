use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::{Action, Engine, EngineSettings, OperationSummary};
use crate::db::log::ttlog_or_warn;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::duration::WorkDuration;
use crate::page::PageContext;
use crate::page::locators::Locators;
use crate::page::snapshot::{SimulatedPage, TimesheetSnapshot};
use crate::page::wait::CancelToken;
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{RESET, color_for_delta, colorize_end, colorize_start};
use crate::utils::date::{self, parse_date};
use crate::utils::formatting::{bold, signed_hhmm};
use crate::utils::path::resolve_page;
use crate::utils::table::{Column, Table};
use crate::utils::time::{display_time, minutes_between};
use chrono::NaiveDate;

/// Handle `autofill` and `clear`
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let (action, page, today, seed, dry_run, verbose) = match cmd {
        Commands::Autofill {
            page,
            today,
            seed,
            dry_run,
            verbose,
        } => (
            Action::Autofill,
            page,
            today.as_deref(),
            *seed,
            *dry_run,
            *verbose,
        ),
        Commands::Clear {
            page,
            dry_run,
            verbose,
        } => (Action::Clear, page, None, None, *dry_run, *verbose),
        _ => return Ok(()),
    };

    let today = resolve_today(today)?;
    let path = resolve_page(page)?;

    // 1️⃣ load the timesheet
    let snapshot = TimesheetSnapshot::load(&path)?;
    let mut sheet = SimulatedPage::new(&snapshot)?;

    // 2️⃣ engine, wired to Ctrl+C
    let cancel = CancelToken::from_ctrlc()?;
    let ctx = PageContext::new(Locators::default(), cfg.waiter().with_cancel(cancel));
    let mut engine =
        Engine::new(EngineSettings::from_config(cfg), ctx, today).with_verbose(verbose);
    if let Some(seed) = seed {
        engine = engine.with_seed(seed);
    }

    header(format!("{} {}", action.as_str().to_uppercase(), path.display()));

    // 3️⃣ run, log the outcome either way
    let result = engine.run(&mut sheet, action);
    log_outcome(cfg, action, &path.to_string_lossy(), &result);
    let summary = result?;

    print_summary(&summary);

    // 4️⃣ write back
    if summary.cell_writes == 0 {
        success("Nothing to change.");
    } else if dry_run {
        info(format!(
            "Dry run: {} cell(s) would change, {} left untouched.",
            summary.cell_writes,
            path.display()
        ));
    } else {
        sheet.to_snapshot().save(&path)?;
        success(format!(
            "{} row(s) updated, saved to {}",
            summary.rows_changed(),
            path.display()
        ));
    }

    Ok(())
}

fn resolve_today(arg: Option<&str>) -> AppResult<NaiveDate> {
    match arg {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())),
        None => Ok(date::today()),
    }
}

fn log_outcome(cfg: &Config, action: Action, target: &str, result: &AppResult<OperationSummary>) {
    let pool = match DbPool::open(&cfg.database) {
        Ok(p) => p,
        Err(e) => {
            warning(format!("Failed to open log database: {}", e));
            return;
        }
    };

    match result {
        Ok(s) => ttlog_or_warn(
            &pool.conn,
            action.as_str(),
            target,
            &format!(
                "{} rows visited, {} planned, {} rows changed, {} cell writes",
                s.rows_visited,
                s.rows_planned,
                s.rows_changed(),
                s.cell_writes
            ),
        ),
        Err(e) => ttlog_or_warn(
            &pool.conn,
            "error",
            target,
            &format!("{} failed: {}", action.as_str(), e),
        ),
    }
}

fn print_summary(summary: &OperationSummary) {
    println!(
        "{} {} .. {}\n",
        bold("Period:"),
        summary.period.min_date(),
        summary.period.max_date()
    );

    if summary.changes.is_empty() {
        return;
    }

    let mut table = Table::new(vec![
        Column::new("ROW"),
        Column::new("DATE"),
        Column::new("REQUIRED"),
        Column::new("START"),
        Column::new("END"),
        Column::new("WORKED"),
        Column::new("Δ"),
    ]);

    for c in &summary.changes {
        let worked = match (c.start, c.end) {
            (Some(s), Some(e)) => Some(minutes_between(s, e) as i64),
            _ => None,
        };
        let (worked_str, delta_str) = match worked {
            Some(w) => {
                let delta = w - c.required.to_minutes() as i64;
                (
                    WorkDuration::from_minutes(w as u32).label(),
                    format!(
                        "{}{}{}",
                        color_for_delta(delta),
                        signed_hhmm(delta),
                        RESET
                    ),
                )
            }
            None => ("-".to_string(), "-".to_string()),
        };

        table.add_row(vec![
            c.id.to_string(),
            c.date.format("%a %Y-%m-%d").to_string(),
            c.required.label(),
            colorize_start(&display_time(c.start)),
            colorize_end(&display_time(c.end)),
            worked_str,
            delta_str,
        ]);
    }

    print!("{}", table.render());
    println!();
}
