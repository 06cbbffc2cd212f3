//! Row model extraction: turn rendered rows into [`RowData`].
//!
//! Read-only over the page at call time. Nothing here is cached: the list
//! recycles its elements while scrolling, so every pass reads afresh.

use crate::errors::{AppError, AppResult};
use crate::models::duration::WorkDuration;
use crate::models::month_day::MonthDay;
use crate::models::period::TimesheetPeriod;
use crate::models::row::{RowData, RowId};
use crate::page::locators::{Locator, Locators, ROW_ID_ATTR};
use crate::page::{NodeId, Page};
use regex::Regex;
use std::sync::LazyLock;

static ROW_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^table-row-(\d+)$").expect("valid row id regex"));

/// Read the timesheet period from the page header.
pub fn read_period<P: Page + ?Sized>(page: &P, loc: &Locators) -> AppResult<TimesheetPeriod> {
    let label = loc.period_label.require_first(page, page.root())?;
    TimesheetPeriod::parse(&page.text(label)?)
}

pub fn find_table<P: Page + ?Sized>(page: &P, loc: &Locators) -> AppResult<NodeId> {
    loc.table.find_one(page, page.root())
}

/// Expandable rows have exactly one child: a DIV carrying the marker class.
/// Anything else (week totals, headers) is decoration.
pub fn is_expandable<P: Page + ?Sized>(page: &P, loc: &Locators, row: NodeId) -> AppResult<bool> {
    let children = page.children(row)?;
    let [only] = children.as_slice() else {
        return Ok(false);
    };

    if !page.tag_name(*only)?.eq_ignore_ascii_case("DIV") {
        return Ok(false);
    }

    let class = page.attribute(*only, "class")?.unwrap_or_default();
    Ok(class.contains(loc.expandable_marker.as_str()))
}

pub fn row_identity<P: Page + ?Sized>(page: &P, row: NodeId) -> AppResult<RowId> {
    let raw = page
        .attribute(row, ROW_ID_ATTR)?
        .ok_or_else(|| AppError::Structure(format!("row without {} attribute", ROW_ID_ATTR)))?;

    let caps = ROW_ID_RE
        .captures(raw.trim())
        .ok_or_else(|| AppError::Structure(format!("malformed row identity '{}'", raw)))?;

    caps[1]
        .parse()
        .map(RowId)
        .map_err(|_| AppError::Structure(format!("row identity out of range '{}'", raw)))
}

/// Duration label under `row`; a missing label means nothing recorded yet.
fn read_duration<P: Page + ?Sized>(
    page: &P,
    locator: &Locator,
    row: NodeId,
) -> AppResult<WorkDuration> {
    match locator.find_first(page, row)? {
        Some(label) => {
            let text = page.text(label)?;
            if text.trim().is_empty() {
                Ok(WorkDuration::ZERO)
            } else {
                WorkDuration::parse(&text)
            }
        }
        None => Ok(WorkDuration::ZERO),
    }
}

/// Build the record for one expandable row element.
pub fn extract_row<P: Page + ?Sized>(
    page: &P,
    loc: &Locators,
    row: NodeId,
    period: &TimesheetPeriod,
) -> AppResult<RowData> {
    let id = row_identity(page, row)?;

    let date_label = loc.date_label.find_first(page, row)?.ok_or_else(|| {
        AppError::Structure(format!("row {} has no {}", id, loc.date_label.name))
    })?;
    let month_day = MonthDay::parse(&page.text(date_label)?)?;
    let date = period.resolve(&month_day).map_err(|e| match e {
        AppError::DateOutOfRange(msg) => AppError::DateOutOfRange(format!("row {}: {}", id, msg)),
        other => other,
    })?;

    let required = read_duration(page, &loc.required_label, row)?;
    let actual = read_duration(page, &loc.actual_label, row)?;

    Ok(RowData {
        id,
        date,
        required,
        actual,
    })
}

/// Currently rendered expandable rows with their identities, in DOM order.
pub fn present_rows<P: Page + ?Sized>(
    page: &P,
    loc: &Locators,
    table: NodeId,
) -> AppResult<Vec<(RowId, NodeId)>> {
    let mut out = Vec::new();
    for row in loc.row.find_all(page, table)? {
        if is_expandable(page, loc, row)? {
            out.push((row_identity(page, row)?, row));
        }
    }
    Ok(out)
}

/// Look the live row element up again by identity.
pub fn find_row<P: Page + ?Sized>(page: &P, loc: &Locators, id: RowId) -> AppResult<NodeId> {
    let table = find_table(page, loc)?;
    loc.row
        .find_all(page, table)?
        .into_iter()
        .find(|&row| row_identity(page, row).is_ok_and(|rid| rid == id))
        .ok_or(AppError::RowNotFound(id.0))
}
