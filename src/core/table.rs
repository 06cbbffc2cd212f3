//! Table driver: visit every logical row of the virtualized list exactly once.

use crate::core::extract::{extract_row, find_table, present_rows, row_identity};
use crate::errors::AppResult;
use crate::models::period::TimesheetPeriod;
use crate::models::row::{RowData, RowId};
use crate::page::locators::Locators;
use crate::page::{Page, PageContext};
use std::collections::BTreeSet;

/// Handler verdict after one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassStats {
    pub windows: usize,
    pub rows_visited: usize,
    pub stopped: bool,
}

/// Identities of every rendered row element, decorative ones included.
fn rendered_window<P: Page + ?Sized>(page: &P, loc: &Locators) -> AppResult<Vec<RowId>> {
    let table = find_table(page, loc)?;
    let mut ids: Vec<RowId> = loc
        .row
        .find_all(page, table)?
        .into_iter()
        .filter_map(|row| row_identity(page, row).ok())
        .collect();
    ids.sort();
    Ok(ids)
}

/// Scroll through the list one window at a time and hand every unseen row to
/// `handler`, in ascending identity order within each window.
///
/// Rows of a window are all read before the first handler runs: a handler
/// may expand or edit rows and re-render the list underneath.
pub fn for_each_row<P, F>(
    page: &mut P,
    ctx: &PageContext,
    period: &TimesheetPeriod,
    mut handler: F,
) -> AppResult<PassStats>
where
    P: Page + ?Sized,
    F: FnMut(&mut P, &RowData) -> AppResult<Flow>,
{
    let loc = &ctx.locators;
    let mut seen: BTreeSet<RowId> = BTreeSet::new();
    let mut stats = PassStats::default();
    let mut top = 0u32;
    let mut last_top: Option<u32> = None;

    loop {
        // ------------------------------------------------
        // 1️⃣ Scroll to the window and let the list re-render
        // ------------------------------------------------
        let table = find_table(page, loc)?;
        let top_before = page.scroll_metrics(table)?.scroll_top;
        let window_before = rendered_window(page, loc)?;

        page.scroll_to(table, top)?;
        ctx.waiter.pause(page)?;

        // The list re-renders some time after the scroll event: a moved
        // viewport must show a different set of rows before it is read.
        let table = find_table(page, loc)?;
        if page.scroll_metrics(table)?.scroll_top != top_before {
            ctx.waiter
                .wait_until(page, "the list to render the scrolled window", |p| {
                    Ok((rendered_window(p, loc)? != window_before).then_some(()))
                })?;
        }

        let table = find_table(page, loc)?;
        let metrics = page.scroll_metrics(table)?;
        stats.windows += 1;

        // ------------------------------------------------
        // 2️⃣ Read every unseen row, lowest identity first
        // ------------------------------------------------
        let mut present = present_rows(page, loc, table)?;
        present.sort_by_key(|(id, _)| *id);
        present.dedup_by_key(|(id, _)| *id);

        let view: &P = page;
        let fresh = present
            .into_iter()
            .filter(|(id, _)| !seen.contains(id))
            .map(|(_, node)| extract_row(view, loc, node, period))
            .collect::<AppResult<Vec<_>>>()?;

        // ------------------------------------------------
        // 3️⃣ Hand them over
        // ------------------------------------------------
        let found_new = !fresh.is_empty();
        for row in fresh {
            seen.insert(row.id);
            stats.rows_visited += 1;
            if handler(page, &row)? == Flow::Stop {
                stats.stopped = true;
                return Ok(stats);
            }
        }

        // ------------------------------------------------
        // 4️⃣ Next window, or done
        // ------------------------------------------------
        if metrics.at_end() {
            break;
        }
        let stuck = last_top == Some(metrics.scroll_top);
        if stuck && !found_new {
            break;
        }
        last_top = Some(metrics.scroll_top);
        top = metrics.bottom();
    }

    Ok(stats)
}
