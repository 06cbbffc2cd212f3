//! The document contract: every element the engine looks for, by name.
//!
//! Host markup drift is fixed here and nowhere else. Each locator lists one
//! or more shapes; the first shape that matches anything wins, so an older
//! and a newer layout can be supported side by side.

use super::{NodeId, Page, Selector};
use crate::errors::{AppError, AppResult};

/// Attribute carrying the row identity (`table-row-<n>`).
pub const ROW_ID_ATTR: &str = "data-rbd-draggable-id";
pub const ROW_ID_PREFIX: &str = "table-row-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub name: &'static str,
    pub shapes: Vec<Selector>,
}

impl Locator {
    pub fn new(name: &'static str, shapes: Vec<Selector>) -> Self {
        Self { name, shapes }
    }

    /// All matches of the first shape that matches anything.
    pub fn find_all<P: Page + ?Sized>(&self, page: &P, scope: NodeId) -> AppResult<Vec<NodeId>> {
        for shape in &self.shapes {
            let found = page.query_all(scope, shape)?;
            if !found.is_empty() {
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }

    pub fn find_first<P: Page + ?Sized>(
        &self,
        page: &P,
        scope: NodeId,
    ) -> AppResult<Option<NodeId>> {
        Ok(self.find_all(page, scope)?.into_iter().next())
    }

    pub fn require_first<P: Page + ?Sized>(&self, page: &P, scope: NodeId) -> AppResult<NodeId> {
        self.find_first(page, scope)?
            .ok_or_else(|| AppError::Structure(format!("cannot find {}", self.name)))
    }

    /// Exactly one match, anything else is a structure error.
    pub fn find_one<P: Page + ?Sized>(&self, page: &P, scope: NodeId) -> AppResult<NodeId> {
        let found = self.find_all(page, scope)?;
        match found.as_slice() {
            [one] => Ok(*one),
            [] => Err(AppError::Structure(format!("cannot find {}", self.name))),
            many => Err(AppError::Structure(format!(
                "expected one {}, found {}",
                self.name,
                many.len()
            ))),
        }
    }
}

/// Named selectors for the attendance timesheet markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locators {
    /// Scrolling, virtualized list holding the rows.
    pub table: Locator,
    /// Any rendered row, expandable or decorative.
    pub row: Locator,
    /// Class marker on the single child of an expandable row.
    pub expandable_marker: String,
    /// Cells of the collapsed row; the first one toggles the expansion.
    pub row_toggle: Locator,
    /// Detail region revealed by expanding a row.
    pub expansion: Locator,
    /// Clock-in / clock-out slots inside the expansion, in document order.
    pub clock_cell: Locator,
    /// Clickable text inside a clock slot.
    pub clock_text: Locator,
    /// The single text input shown while a slot is being edited.
    pub editor_input: Locator,
    pub date_label: Locator,
    pub required_label: Locator,
    pub actual_label: Locator,
    pub period_label: Locator,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            table: Locator::new(
                "timesheet table",
                vec![Selector::class_contains("table-component-styles__List-")],
            ),
            row: Locator::new(
                "table row",
                vec![Selector::attr_prefix(ROW_ID_ATTR, ROW_ID_PREFIX)],
            ),
            expandable_marker: "expandable-table-row-component-styles__ExpandableTableRow-"
                .to_string(),
            row_toggle: Locator::new(
                "row toggle cell",
                vec![Selector::class_contains(
                    "table-cell-component-styles__TableCell-",
                )],
            ),
            expansion: Locator::new(
                "row expansion",
                vec![Selector::class_contains(
                    "row-expansion-component-styles__RowExpansion-",
                )],
            ),
            clock_cell: Locator::new(
                "clock cell",
                vec![
                    Selector::tag_class("div", "clock-in-and-out-item-clock"),
                    Selector::class_contains("clock-in-and-out-item-clock"),
                ],
            ),
            clock_text: Locator::new(
                "clock cell text",
                vec![Selector::class_contains("text-component-styles__Text-")],
            ),
            editor_input: Locator::new("clock editor input", vec![Selector::tag("input")]),
            date_label: Locator::new(
                "date label",
                vec![
                    Selector::class_contains("date-cell-component-styles__Date-"),
                    Selector::class_contains("day-label-component-styles__Label-"),
                ],
            ),
            required_label: Locator::new(
                "required duration",
                vec![Selector::class_contains(
                    "required-duration-component-styles__Timer-",
                )],
            ),
            actual_label: Locator::new(
                "actual duration",
                vec![Selector::class_contains(
                    "timer-difference-presentation-component-styles__Duration-",
                )],
            ),
            period_label: Locator::new(
                "timesheet period",
                vec![
                    Selector::class_contains("timesheet-period-component-styles__Period-"),
                    Selector::class_contains("date-range-picker-component-styles__Label-"),
                ],
            ),
        }
    }
}
