//! Simulated timesheet page.
//!
//! Renders a saved timesheet (YAML snapshot) the way the attendance web app
//! does: a virtualized list that only materializes the rows in the current
//! scroll window, collapsible rows with a clock-in/clock-out expansion, a
//! single floating input while a clock slot is edited, and re-renders that
//! land `render_delay` settle steps after the action that caused them.

use super::{NodeId, Page, ScrollMetrics, Selector};
use crate::errors::{AppError, AppResult};
use crate::models::duration::WorkDuration;
use crate::utils::time::{display_time, format_time, minutes_between, parse_slot};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Pixel height of one rendered row.
pub const ROW_HEIGHT: u32 = 40;

fn default_viewport_rows() -> usize {
    8
}

/// On-disk form of a timesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetSnapshot {
    /// Header label, e.g. "Oct 1st, 2026 - Oct 31st, 2026"
    pub period: String,
    /// Rows rendered per scroll window
    #[serde(default = "default_viewport_rows")]
    pub viewport_rows: usize,
    /// Settle steps between an action and the DOM reflecting it
    #[serde(default)]
    pub render_delay: u32,
    /// Render each window bottom-up (recycled nodes rarely come back in order)
    #[serde(default)]
    pub reverse_dom_order: bool,
    pub rows: Vec<SnapshotRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub id: u32,
    /// Decorative row (week subtotal, header...); no expansion, no clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Row label, e.g. "Thu, Oct 1st"
    #[serde(default)]
    pub date: String,
    /// Required duration label, e.g. "8h 00m"; absent on days off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    /// Clock slots in order: in, out, in, out... (`null` = empty)
    #[serde(default)]
    pub clock: Vec<Option<String>>,
}

impl TimesheetSnapshot {
    pub fn from_yaml(text: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct RowState {
    id: u32,
    summary: Option<String>,
    date: String,
    required: Option<String>,
    clock: Vec<Option<NaiveTime>>,
}

impl RowState {
    fn from_snapshot(row: &SnapshotRow) -> AppResult<Self> {
        let clock = row
            .clock
            .iter()
            .map(|slot| match slot {
                Some(v) => parse_slot(v),
                None => Ok(None),
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            id: row.id,
            summary: row.summary.clone(),
            date: row.date.clone(),
            required: row.required.clone(),
            clock,
        })
    }

    fn to_snapshot(&self) -> SnapshotRow {
        SnapshotRow {
            id: self.id,
            summary: self.summary.clone(),
            date: self.date.clone(),
            required: self.required.clone(),
            clock: self.clock.iter().map(|t| t.map(format_time)).collect(),
        }
    }

    /// Rendered clock slots: always at least one in/out pair, always pairs.
    fn slot_count(&self) -> usize {
        let n = self.clock.len().max(2);
        n + n % 2
    }

    /// Sum of the complete in/out pairs.
    fn actual_minutes(&self) -> u32 {
        self.clock
            .chunks(2)
            .filter_map(|pair| match pair {
                [Some(start), Some(end)] => Some(minutes_between(*start, *end)),
                _ => None,
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeAction {
    None,
    Scroller,
    Toggle(u32),
    ClockText { row: u32, slot: usize },
    Editor,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<usize>,
    action: NodeAction,
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    fn push(&mut self, parent: Option<usize>, tag: &str, class: &str, text: &str) -> usize {
        let mut attrs = BTreeMap::new();
        if !class.is_empty() {
            attrs.insert("class".to_string(), class.to_string());
        }
        self.nodes.push(Node {
            tag: tag.to_uppercase(),
            attrs,
            text: text.to_string(),
            children: Vec::new(),
            action: NodeAction::None,
        });
        let idx = self.nodes.len() - 1;
        if let Some(p) = parent {
            self.nodes[p].children.push(idx);
        }
        idx
    }

    fn child(&mut self, parent: usize, tag: &str, class: &str, text: &str) -> usize {
        self.push(Some(parent), tag, class, text)
    }

    fn set_attr(&mut self, node: usize, name: &str, value: &str) {
        self.nodes[node]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn set_action(&mut self, node: usize, action: NodeAction) {
        self.nodes[node].action = action;
    }
}

// Class names mimic the hashed styled-components output of the web app.
const CLS_PERIOD: &str = "timesheet-period-component-styles__Period-sc-1x0";
const CLS_LIST: &str = "table-component-styles__List-sc-7q2";
const CLS_ROW: &str = "table-row-component-styles__Row-sc-3kd";
const CLS_SUMMARY: &str = "table-row-component-styles__Summary-sc-3ke";
const CLS_EXPANDABLE: &str = "expandable-table-row-component-styles__ExpandableTableRow-sc-9fz";
const CLS_CELL: &str = "table-cell-component-styles__TableCell-sc-2mw";
const CLS_DATE: &str = "date-cell-component-styles__Date-sc-5uu";
const CLS_REQUIRED: &str = "required-duration-component-styles__Timer-sc-8pa";
const CLS_ACTUAL: &str = "timer-difference-presentation-component-styles__Duration-sc-4ht";
const CLS_EXPANSION: &str = "row-expansion-component-styles__RowExpansion-sc-6nb";
const CLS_CLOCK: &str = "clock-in-and-out-item-clock";
const CLS_CLOCK_TEXT: &str = "text-component-styles__Text-sc-0ra";

/// In-memory [`Page`] over a [`TimesheetSnapshot`].
pub struct SimulatedPage {
    period: String,
    viewport_rows: usize,
    render_delay: u32,
    reverse_dom_order: bool,
    rows: Vec<RowState>,
    scroll_top: u32,
    expanded: BTreeSet<u32>,
    editing: Option<(u32, usize)>,
    nodes: Vec<Node>,
    generation: u64,
    pending_render: Option<u32>,
    writes: usize,
    clicks: usize,
}

impl SimulatedPage {
    pub fn new(snapshot: &TimesheetSnapshot) -> AppResult<Self> {
        let rows = snapshot
            .rows
            .iter()
            .map(RowState::from_snapshot)
            .collect::<AppResult<Vec<_>>>()?;

        let mut page = Self {
            period: snapshot.period.clone(),
            viewport_rows: snapshot.viewport_rows.max(1),
            render_delay: snapshot.render_delay,
            reverse_dom_order: snapshot.reverse_dom_order,
            rows,
            scroll_top: 0,
            expanded: BTreeSet::new(),
            editing: None,
            nodes: Vec::new(),
            generation: 0,
            pending_render: None,
            writes: 0,
            clicks: 0,
        };
        page.render();
        Ok(page)
    }

    pub fn from_yaml(text: &str) -> AppResult<Self> {
        Self::new(&TimesheetSnapshot::from_yaml(text)?)
    }

    /// Current state, ready to be saved back.
    pub fn to_snapshot(&self) -> TimesheetSnapshot {
        TimesheetSnapshot {
            period: self.period.clone(),
            viewport_rows: self.viewport_rows,
            render_delay: self.render_delay,
            reverse_dom_order: self.reverse_dom_order,
            rows: self.rows.iter().map(RowState::to_snapshot).collect(),
        }
    }

    /// Committed edits that changed a clock slot.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }

    /// Clock slots of a row as displayed (`HH:MM` / `--:--`).
    pub fn row_clock(&self, id: u32) -> Option<Vec<String>> {
        self.row(id).map(|r| {
            (0..r.slot_count())
                .map(|i| display_time(r.clock.get(i).copied().flatten()))
                .collect()
        })
    }

    pub fn actual_minutes(&self, id: u32) -> Option<u32> {
        self.row(id).map(RowState::actual_minutes)
    }

    // ---------------------------
    // Host-side mutations (the table changing under the engine)
    // ---------------------------

    pub fn insert_row(&mut self, row: &SnapshotRow) -> AppResult<()> {
        if self.row(row.id).is_some() {
            return Err(AppError::Other(format!("row {} already exists", row.id)));
        }
        let state = RowState::from_snapshot(row)?;
        let pos = self.rows.partition_point(|r| r.id < row.id);
        self.rows.insert(pos, state);
        self.schedule_render();
        Ok(())
    }

    pub fn remove_row(&mut self, id: u32) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        self.expanded.remove(&id);
        let removed = self.rows.len() != before;
        if removed {
            self.schedule_render();
        }
        removed
    }

    pub fn set_required(&mut self, id: u32, label: Option<&str>) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        row.required = label.map(str::to_string);
        self.schedule_render();
        true
    }

    pub fn set_period(&mut self, label: &str) {
        self.period = label.to_string();
        self.schedule_render();
    }

    // ---------------------------
    // Rendering
    // ---------------------------

    fn row(&self, id: u32) -> Option<&RowState> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn client_height(&self) -> u32 {
        self.viewport_rows as u32 * ROW_HEIGHT
    }

    fn scroll_height(&self) -> u32 {
        self.rows.len() as u32 * ROW_HEIGHT
    }

    fn max_scroll_top(&self) -> u32 {
        self.scroll_height().saturating_sub(self.client_height())
    }

    fn schedule_render(&mut self) {
        if self.render_delay == 0 {
            self.render();
        } else if self.pending_render.is_none() {
            self.pending_render = Some(self.render_delay);
        }
    }

    fn render(&mut self) {
        self.pending_render = None;
        self.generation += 1;
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());

        let mut b = TreeBuilder::default();
        let root = b.push(None, "body", "", "");
        b.child(root, "div", CLS_PERIOD, &self.period);
        let list = b.child(root, "div", CLS_LIST, "");
        b.set_action(list, NodeAction::Scroller);

        let first = (self.scroll_top / ROW_HEIGHT) as usize;
        let last = (first + self.viewport_rows).min(self.rows.len());
        let mut window: Vec<&RowState> = self.rows[first.min(last)..last].iter().collect();
        if self.reverse_dom_order {
            window.reverse();
        }

        for row in window {
            self.render_row(&mut b, list, row);
        }

        if let Some((row_id, slot)) = self.editing {
            let current = self
                .row(row_id)
                .and_then(|r| r.clock.get(slot).copied().flatten());
            let input = b.child(root, "input", "", "");
            b.set_attr(input, "type", "text");
            b.set_attr(input, "value", &display_time(current));
            b.set_action(input, NodeAction::Editor);
        }

        self.nodes = b.nodes;
    }

    fn render_row(&self, b: &mut TreeBuilder, list: usize, row: &RowState) {
        let el = b.child(list, "div", CLS_ROW, "");
        b.set_attr(el, "data-rbd-draggable-id", &format!("table-row-{}", row.id));

        if let Some(summary) = &row.summary {
            b.child(el, "div", CLS_SUMMARY, summary);
            b.child(el, "div", CLS_SUMMARY, "");
            return;
        }

        let wrapper = b.child(el, "div", CLS_EXPANDABLE, "");

        let date_cell = b.child(wrapper, "div", CLS_CELL, "");
        b.set_action(date_cell, NodeAction::Toggle(row.id));
        b.child(date_cell, "span", CLS_DATE, &row.date);

        let required_cell = b.child(wrapper, "div", CLS_CELL, "");
        if let Some(required) = &row.required {
            b.child(required_cell, "span", CLS_REQUIRED, required);
        }

        let actual_cell = b.child(wrapper, "div", CLS_CELL, "");
        let actual = row.actual_minutes();
        if actual > 0 {
            b.child(
                actual_cell,
                "span",
                CLS_ACTUAL,
                &WorkDuration::from_minutes(actual).label(),
            );
        }

        if self.expanded.contains(&row.id) {
            let expansion = b.child(wrapper, "div", CLS_EXPANSION, "");
            for slot in 0..row.slot_count() {
                let cell = b.child(expansion, "div", CLS_CLOCK, "");
                let value = display_time(row.clock.get(slot).copied().flatten());
                let text = b.child(cell, "span", CLS_CLOCK_TEXT, &value);
                b.set_action(text, NodeAction::ClockText { row: row.id, slot });
            }
        }
    }

    fn node(&self, id: NodeId) -> AppResult<&Node> {
        if id.generation() != self.generation {
            return Err(AppError::Structure(
                "stale element handle (page re-rendered)".to_string(),
            ));
        }
        self.nodes
            .get(id.index())
            .ok_or_else(|| AppError::Structure(format!("unknown element {}", id.index())))
    }

    fn handle(&self, index: usize) -> NodeId {
        NodeId::new(self.generation, index)
    }

    fn collect_matches(&self, index: usize, selector: &Selector, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[index].children {
            let node = &self.nodes[child];
            if selector.matches(&node.tag, &node.attrs) {
                out.push(self.handle(child));
            }
            self.collect_matches(child, selector, out);
        }
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        out.push_str(&node.text);
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    fn commit_slot(&mut self, row_id: u32, slot: usize, value: Option<NaiveTime>) {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == row_id) else {
            return;
        };
        if row.clock.len() <= slot {
            row.clock.resize(slot + 1, None);
        }
        if row.clock[slot] != value {
            row.clock[slot] = value;
            self.writes += 1;
        }
    }
}

impl Page for SimulatedPage {
    fn root(&self) -> NodeId {
        self.handle(0)
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> AppResult<Vec<NodeId>> {
        self.node(scope)?;
        let mut out = Vec::new();
        self.collect_matches(scope.index(), selector, &mut out);
        Ok(out)
    }

    fn children(&self, node: NodeId) -> AppResult<Vec<NodeId>> {
        Ok(self
            .node(node)?
            .children
            .iter()
            .map(|&c| self.handle(c))
            .collect())
    }

    fn tag_name(&self, node: NodeId) -> AppResult<String> {
        Ok(self.node(node)?.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> AppResult<Option<String>> {
        Ok(self.node(node)?.attrs.get(name).cloned())
    }

    fn text(&self, node: NodeId) -> AppResult<String> {
        self.node(node)?;
        let mut out = String::new();
        self.collect_text(node.index(), &mut out);
        Ok(out)
    }

    fn click(&mut self, node: NodeId) -> AppResult<()> {
        let action = self.node(node)?.action;
        self.clicks += 1;

        match action {
            NodeAction::Toggle(row_id) => {
                if !self.expanded.remove(&row_id) {
                    self.expanded.insert(row_id);
                } else if self.editing.is_some_and(|(r, _)| r == row_id) {
                    self.editing = None;
                }
                self.schedule_render();
            }
            NodeAction::ClockText { row, slot } => {
                self.editing = Some((row, slot));
                self.schedule_render();
            }
            NodeAction::None | NodeAction::Scroller | NodeAction::Editor => {}
        }
        Ok(())
    }

    fn fill_input(&mut self, node: NodeId, value: &str) -> AppResult<()> {
        if self.node(node)?.action != NodeAction::Editor {
            return Err(AppError::Structure("element is not an editable input".into()));
        }
        let Some((row_id, slot)) = self.editing.take() else {
            return Err(AppError::Structure("no clock slot is being edited".into()));
        };

        // The web app silently drops values it cannot parse.
        if let Ok(parsed) = parse_slot(value) {
            self.commit_slot(row_id, slot, parsed);
        }
        self.schedule_render();
        Ok(())
    }

    fn scroll_metrics(&self, node: NodeId) -> AppResult<ScrollMetrics> {
        if self.node(node)?.action != NodeAction::Scroller {
            return Err(AppError::Structure("element does not scroll".into()));
        }
        Ok(ScrollMetrics {
            scroll_top: self.scroll_top,
            client_height: self.client_height(),
            scroll_height: self.scroll_height(),
        })
    }

    fn scroll_to(&mut self, node: NodeId, top: u32) -> AppResult<()> {
        if self.node(node)?.action != NodeAction::Scroller {
            return Err(AppError::Structure("element does not scroll".into()));
        }
        let top = top.min(self.max_scroll_top());
        if top != self.scroll_top {
            self.scroll_top = top;
            self.schedule_render();
        }
        Ok(())
    }

    fn settle(&mut self, _step: Duration) {
        match self.pending_render {
            Some(n) if n <= 1 => self.render(),
            Some(n) => self.pending_render = Some(n - 1),
            None => {}
        }
    }
}
