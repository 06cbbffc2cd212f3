//! Interaction engine: write start/end times into one row through the UI.
//!
//! Every step re-locates what it needs by row identity: a handle read before
//! a click is not trusted after it.

use crate::core::extract::{find_row, is_expandable};
use crate::errors::{AppError, AppResult};
use crate::models::row::RowId;
use crate::page::locators::Locators;
use crate::page::{NodeId, Page, PageContext};
use crate::utils::time::display_time;
use chrono::NaiveTime;

/// Outcome of one `set_row_times` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowWrite {
    pub cells_checked: usize,
    pub cells_written: usize,
}

pub struct Interactor<'a, P: Page + ?Sized> {
    page: &'a mut P,
    ctx: &'a PageContext,
}

/// Treat a row that is momentarily missing (mid re-render) as "not yet".
fn not_yet<T>(result: AppResult<Option<T>>) -> AppResult<Option<T>> {
    match result {
        Err(AppError::RowNotFound(_)) => Ok(None),
        other => other,
    }
}

fn expansion_of<P: Page + ?Sized>(page: &P, loc: &Locators, id: RowId) -> AppResult<Option<NodeId>> {
    let row = find_row(page, loc, id)?;
    loc.expansion.find_first(page, row)
}

fn clock_cells<P: Page + ?Sized>(page: &P, loc: &Locators, id: RowId) -> AppResult<Vec<NodeId>> {
    let expansion = expansion_of(page, loc, id)?
        .ok_or_else(|| AppError::Structure(format!("row {} collapsed unexpectedly", id)))?;
    loc.clock_cell.find_all(page, expansion)
}

/// Clickable text of clock slot `slot` in row `id`.
fn clock_text<P: Page + ?Sized>(
    page: &P,
    loc: &Locators,
    id: RowId,
    slot: usize,
) -> AppResult<NodeId> {
    let cells = clock_cells(page, loc, id)?;
    let cell = cells.get(slot).copied().ok_or_else(|| {
        AppError::Structure(format!("row {} lost clock slot {}", id, slot + 1))
    })?;
    loc.clock_text.require_first(page, cell)
}

impl<'a, P: Page + ?Sized> Interactor<'a, P> {
    pub fn new(page: &'a mut P, ctx: &'a PageContext) -> Self {
        Self { page, ctx }
    }

    /// Make row `id` show `start` / `end` in its first two clock slots and
    /// clear any further slot. `None` clears.
    pub fn set_row_times(
        &mut self,
        id: RowId,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> AppResult<RowWrite> {
        let ctx = self.ctx;
        let loc = &ctx.locators;

        find_row(&*self.page, loc, id)?;
        self.ensure_expanded(id)?;

        let slots = clock_cells(&*self.page, loc, id)?.len();
        if slots < 2 {
            return Err(AppError::Structure(format!(
                "row {} shows {} clock cell(s), need at least 2",
                id, slots
            )));
        }

        let mut outcome = RowWrite::default();
        for slot in 0..slots {
            let target = match slot {
                0 => start,
                1 => end,
                _ => None,
            };
            outcome.cells_checked += 1;
            if self.set_cell(id, slot, target)? {
                outcome.cells_written += 1;
            }
        }

        Ok(outcome)
    }

    fn ensure_expanded(&mut self, id: RowId) -> AppResult<()> {
        let ctx = self.ctx;
        let loc = &ctx.locators;

        if expansion_of(&*self.page, loc, id)?.is_some() {
            return Ok(());
        }

        let row = find_row(&*self.page, loc, id)?;
        if !is_expandable(&*self.page, loc, row)? {
            return Err(AppError::Structure(format!("row {} cannot be expanded", id)));
        }

        let toggle = loc
            .row_toggle
            .find_first(&*self.page, row)?
            .ok_or_else(|| AppError::Structure(format!("row {} has no expand toggle", id)))?;
        self.page.click(toggle)?;

        ctx.waiter
            .wait_until(self.page, &format!("row {} to expand", id), |p| {
                not_yet(expansion_of(p, loc, id).map(|e| e.map(|_| ())))
            })
    }

    /// Returns `true` when a write happened, `false` when the slot already
    /// displayed the target.
    fn set_cell(&mut self, id: RowId, slot: usize, target: Option<NaiveTime>) -> AppResult<bool> {
        let ctx = self.ctx;
        let loc = &ctx.locators;
        let want = display_time(target);

        let text = clock_text(&*self.page, loc, id, slot)?;
        if self.page.text(text)?.trim() == want {
            return Ok(false);
        }

        // 1️⃣ open the editor
        self.page.click(text)?;
        let inputs = ctx
            .waiter
            .wait_until(self.page, "clock editor input", |p| {
                let found = loc.editor_input.find_all(p, p.root())?;
                Ok((!found.is_empty()).then_some(found))
            })?;
        let [input] = inputs.as_slice() else {
            return Err(AppError::Structure(format!(
                "expected one {}, found {}",
                loc.editor_input.name,
                inputs.len()
            )));
        };

        // 2️⃣ type and commit
        self.page.fill_input(*input, &want)?;

        // 3️⃣ verify the slot shows what we typed
        ctx.waiter.wait_until(
            self.page,
            &format!("row {} slot {} to show {}", id, slot + 1, want),
            |p| {
                not_yet(
                    clock_text(p, loc, id, slot)
                        .and_then(|node| p.text(node))
                        .map(|shown| (shown.trim() == want).then_some(())),
                )
            },
        )?;

        Ok(true)
    }
}
