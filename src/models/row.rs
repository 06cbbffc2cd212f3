use super::duration::WorkDuration;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Stable identity of a table row, taken from its drag-and-drop attribute.
/// Used for de-duplication and for the visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One logical timesheet row, read from the live table.
///
/// Holds no element handle: virtualized rows get recycled, so the row is
/// looked up again by `id` whenever it has to be touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowData {
    pub id: RowId,
    pub date: NaiveDate,
    pub required: WorkDuration,
    pub actual: WorkDuration,
}

impl RowData {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
