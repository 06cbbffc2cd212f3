//! Read/write surface into the host document.
//!
//! The engine never touches markup directly: it asks a [`Page`] for elements
//! matching [`Selector`]s (grouped into named locators in [`locators`]) and
//! acts on them through clicks and input fills. Element handles are only
//! valid until the page re-renders; every lookup is fallible.

pub mod locators;
pub mod snapshot;
pub mod wait;

use crate::errors::AppResult;
use std::collections::BTreeMap;
use std::time::Duration;

use locators::Locators;
use wait::Waiter;

/// Opaque element handle.
///
/// `generation` changes whenever the backend re-renders, so a handle kept
/// across a suspension point is detected as stale instead of hitting a
/// recycled element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    generation: u64,
    index: usize,
}

impl NodeId {
    pub fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Element predicate over tag name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Tag name, case-insensitive: `input`
    Tag(String),
    /// Any class token containing the fragment: `[class*="Timer-"]`
    ClassContains(String),
    /// Tag plus an exact class token: `div.clock-in-and-out-item-clock`
    TagClass { tag: String, class: String },
    /// Attribute value prefix: `[data-rbd-draggable-id^="table-row-"]`
    AttrPrefix { name: String, prefix: String },
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Selector::Tag(tag.to_string())
    }

    pub fn class_contains(fragment: &str) -> Self {
        Selector::ClassContains(fragment.to_string())
    }

    pub fn tag_class(tag: &str, class: &str) -> Self {
        Selector::TagClass {
            tag: tag.to_string(),
            class: class.to_string(),
        }
    }

    pub fn attr_prefix(name: &str, prefix: &str) -> Self {
        Selector::AttrPrefix {
            name: name.to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Match an element given its tag and attribute map (`class` included).
    pub fn matches(&self, tag: &str, attrs: &BTreeMap<String, String>) -> bool {
        let class = attrs.get("class").map(String::as_str).unwrap_or("");
        match self {
            Selector::Tag(t) => t.eq_ignore_ascii_case(tag),
            Selector::ClassContains(fragment) => class.contains(fragment.as_str()),
            Selector::TagClass { tag: t, class: c } => {
                t.eq_ignore_ascii_case(tag) && class.split_whitespace().any(|tok| tok == c)
            }
            Selector::AttrPrefix { name, prefix } => attrs
                .get(name)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub client_height: u32,
    pub scroll_height: u32,
}

impl ScrollMetrics {
    pub fn bottom(&self) -> u32 {
        self.scroll_top + self.client_height
    }

    pub fn at_end(&self) -> bool {
        self.bottom() >= self.scroll_height
    }
}

/// A live document the engine can read and drive.
pub trait Page {
    /// Document root; always valid.
    fn root(&self) -> NodeId;

    /// Descendants of `scope` matching `selector`, in document order.
    fn query_all(&self, scope: NodeId, selector: &Selector) -> AppResult<Vec<NodeId>>;

    fn children(&self, node: NodeId) -> AppResult<Vec<NodeId>>;

    /// Upper-case tag name (`DIV`), like the DOM reports it.
    fn tag_name(&self, node: NodeId) -> AppResult<String>;

    fn attribute(&self, node: NodeId, name: &str) -> AppResult<Option<String>>;

    /// Rendered text of the element and its descendants.
    fn text(&self, node: NodeId) -> AppResult<String>;

    fn click(&mut self, node: NodeId) -> AppResult<()>;

    /// Set an input's value and emit the input, change and Enter key signals
    /// the host form listens to.
    fn fill_input(&mut self, node: NodeId, value: &str) -> AppResult<()>;

    fn scroll_metrics(&self, node: NodeId) -> AppResult<ScrollMetrics>;

    fn scroll_to(&mut self, node: NodeId, top: u32) -> AppResult<()>;

    /// Give the host page `step` to process pending work (re-renders).
    fn settle(&mut self, step: Duration);
}

/// What every engine component needs to talk to a page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub locators: Locators,
    pub waiter: Waiter,
}

impl PageContext {
    pub fn new(locators: Locators, waiter: Waiter) -> Self {
        Self { locators, waiter }
    }
}
