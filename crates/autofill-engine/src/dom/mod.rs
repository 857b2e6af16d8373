//! In-memory page model.
//!
//! `Document` wraps a parsed `scraper::Html` tree and layers the live state a
//! browser would keep on top of it: control values, checked/selected state,
//! attribute writes, focus, dispatched events and pending mutation records.
//! Everything the scanner and filler know about a page goes through here.

mod events;
mod layout;
mod serialize;
mod style;

pub use events::{DomEvent, EventInit};
pub use layout::Rect;
pub use style::ComputedStyle;

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Opaque reference to one element node. Stays valid after the element is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(NodeId);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Element is no longer attached to the document")]
    Detached,
    #[error("<{0}> does not hold form state")]
    NotAControl(String),
    #[error("Option index {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
}

/// One `<option>` of a select control.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub handle: ElementHandle,
    pub index: usize,
    pub value: String,
    pub text: String,
}

/// A structural change, queued for the mutation watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRecord {
    Added {
        parent: ElementHandle,
        nodes: Vec<ElementHandle>,
    },
    Removed {
        parent: Option<ElementHandle>,
        node: ElementHandle,
    },
}

#[derive(Debug, Clone, Default)]
struct ControlState {
    value: Option<String>,
    checked: Option<bool>,
    /// Outer `None`: untouched. Inner `None`: nothing selected.
    selected: Option<Option<usize>>,
}

type Listener = Box<dyn FnMut(&DomEvent)>;

pub struct Document {
    html: Html,
    attrs: HashMap<NodeId, BTreeMap<String, String>>,
    state: HashMap<NodeId, ControlState>,
    rects: HashMap<NodeId, Rect>,
    layout: RefCell<Option<HashMap<NodeId, Rect>>>,
    focused: Option<ElementHandle>,
    listeners: HashMap<NodeId, Vec<(String, Listener)>>,
    events: Vec<DomEvent>,
    mutations: Vec<MutationRecord>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.html.tree.root().descendants().count())
            .field("focused", &self.focused)
            .field("events", &self.events.len())
            .field("pending_mutations", &self.mutations.len())
            .finish()
    }
}

const CONTROL_TAGS: &[&str] = &["input", "select", "textarea", "button"];

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|e| DomError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            attrs: HashMap::new(),
            state: HashMap::new(),
            rects: HashMap::new(),
            layout: RefCell::new(None),
            focused: None,
            listeners: HashMap::new(),
            events: Vec::new(),
            mutations: Vec::new(),
        }
    }

    fn element(&self, handle: ElementHandle) -> Option<ElementRef<'_>> {
        self.html.tree.get(handle.0).and_then(ElementRef::wrap)
    }

    fn ensure_attached(&self, handle: ElementHandle) -> Result<ElementRef<'_>, DomError> {
        if !self.is_attached(handle) {
            return Err(DomError::Detached);
        }
        self.element(handle).ok_or(DomError::Detached)
    }

    fn invalidate_layout(&self) {
        self.layout.replace(None);
    }

    // ---------------------------------------------------------------------
    // Tree access
    // ---------------------------------------------------------------------

    pub fn root_element(&self) -> ElementHandle {
        ElementHandle(self.html.root_element().id())
    }

    pub fn body(&self) -> Option<ElementHandle> {
        self.html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "body")
            .map(|e| ElementHandle(e.id()))
    }

    pub fn is_attached(&self, handle: ElementHandle) -> bool {
        let Some(node) = self.html.tree.get(handle.0) else {
            return false;
        };
        let top = node.ancestors().last().map_or(node.id(), |n| n.id());
        top == self.html.tree.root().id()
    }

    /// Lowercase tag name.
    pub fn tag_name(&self, handle: ElementHandle) -> Option<&str> {
        self.element(handle).map(|e| e.value().name())
    }

    pub fn parent(&self, handle: ElementHandle) -> Option<ElementHandle> {
        self.element(handle)?
            .parent()
            .and_then(ElementRef::wrap)
            .map(|e| ElementHandle(e.id()))
    }

    /// Element ancestors, nearest first.
    pub fn ancestors(&self, handle: ElementHandle) -> Vec<ElementHandle> {
        let Some(element) = self.element(handle) else {
            return Vec::new();
        };
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .map(|e| ElementHandle(e.id()))
            .collect()
    }

    /// Element children in document order.
    pub fn children(&self, handle: ElementHandle) -> Vec<ElementHandle> {
        let Some(element) = self.element(handle) else {
            return Vec::new();
        };
        element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|e| ElementHandle(e.id()))
            .collect()
    }

    /// 1-based position among element siblings, as `:nth-child` counts.
    pub fn child_position(&self, handle: ElementHandle) -> usize {
        self.element(handle)
            .map(|e| e.prev_siblings().filter(|n| n.value().is_element()).count() + 1)
            .unwrap_or(1)
    }

    pub fn text_content(&self, handle: ElementHandle) -> String {
        self.element(handle)
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
    }

    /// Whether `handle` lies inside `ancestor` (not counting itself).
    pub fn contains(&self, ancestor: ElementHandle, handle: ElementHandle) -> bool {
        self.ancestors(handle).contains(&ancestor)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementHandle>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .html
            .select(&selector)
            .map(|e| ElementHandle(e.id()))
            .collect())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next().map(|e| ElementHandle(e.id())))
    }

    /// Descendants of `scope` (never `scope` itself) matching `selector`.
    pub fn query_selector_all_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, DomError> {
        let selector = parse_selector(selector)?;
        let Some(scope_ref) = self.element(scope) else {
            return Ok(Vec::new());
        };
        Ok(scope_ref
            .select(&selector)
            .filter(|e| e.id() != scope.0)
            .map(|e| ElementHandle(e.id()))
            .collect())
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    pub fn attr(&self, handle: ElementHandle, name: &str) -> Option<&str> {
        if let Some(value) = self.attrs.get(&handle.0).and_then(|m| m.get(name)) {
            return Some(value.as_str());
        }
        self.element(handle)?.value().attr(name)
    }

    pub fn has_attr(&self, handle: ElementHandle, name: &str) -> bool {
        self.attr(handle, name).is_some()
    }

    /// Attribute writes are an overlay; selector matching keeps seeing parse-time attributes.
    pub fn set_attribute(
        &mut self,
        handle: ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        self.ensure_attached(handle)?;
        self.attrs
            .entry(handle.0)
            .or_default()
            .insert(name.to_ascii_lowercase(), value.to_string());
        if matches!(name, "style" | "hidden" | "type") {
            self.invalidate_layout();
        }
        Ok(())
    }

    pub fn class_list(&self, handle: ElementHandle) -> Vec<&str> {
        self.attr(handle, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Form state
    // ---------------------------------------------------------------------

    pub fn is_control(&self, handle: ElementHandle) -> bool {
        self.tag_name(handle)
            .is_some_and(|tag| CONTROL_TAGS.contains(&tag))
    }

    /// What `element.type` reports: the input type, `select-one`, `textarea`, ...
    pub fn native_type(&self, handle: ElementHandle) -> String {
        match self.tag_name(handle) {
            Some("input") => {
                let declared = self
                    .attr(handle, "type")
                    .map(|t| t.trim().to_ascii_lowercase())
                    .unwrap_or_default();
                if declared.is_empty() {
                    "text".to_string()
                } else {
                    declared
                }
            }
            Some("select") => {
                if self.has_attr(handle, "multiple") {
                    "select-multiple".to_string()
                } else {
                    "select-one".to_string()
                }
            }
            Some("textarea") => "textarea".to_string(),
            Some("button") => self
                .attr(handle, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "submit".to_string()),
            _ => String::new(),
        }
    }

    /// Own `disabled` attribute or a disabled ancestor `<fieldset>`.
    pub fn is_disabled(&self, handle: ElementHandle) -> bool {
        if self.has_attr(handle, "disabled") {
            return true;
        }
        self.ancestors(handle).into_iter().any(|a| {
            self.tag_name(a) == Some("fieldset") && self.has_attr(a, "disabled")
        })
    }

    pub fn is_read_only(&self, handle: ElementHandle) -> bool {
        matches!(self.tag_name(handle), Some("input" | "textarea"))
            && self.has_attr(handle, "readonly")
    }

    pub fn value(&self, handle: ElementHandle) -> String {
        let state = self.state.get(&handle.0);
        match self.tag_name(handle) {
            Some("input") => state
                .and_then(|s| s.value.clone())
                .or_else(|| self.attr(handle, "value").map(str::to_string))
                .unwrap_or_default(),
            Some("textarea") => state
                .and_then(|s| s.value.clone())
                .unwrap_or_else(|| self.text_content(handle)),
            Some("select") => {
                let options = self.options(handle);
                self.selected_index(handle)
                    .and_then(|i| options.into_iter().nth(i))
                    .map(|o| o.value)
                    .unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    pub fn set_value(&mut self, handle: ElementHandle, value: &str) -> Result<(), DomError> {
        let tag = self.ensure_attached(handle)?.value().name().to_string();
        match tag.as_str() {
            "input" | "textarea" => {
                self.state.entry(handle.0).or_default().value = Some(value.to_string());
                Ok(())
            }
            "select" => {
                let index = self
                    .options(handle)
                    .into_iter()
                    .find(|o| o.value == value)
                    .map(|o| o.index);
                self.state.entry(handle.0).or_default().selected = Some(index);
                Ok(())
            }
            _ => Err(DomError::NotAControl(tag)),
        }
    }

    pub fn checked(&self, handle: ElementHandle) -> bool {
        self.state
            .get(&handle.0)
            .and_then(|s| s.checked)
            .unwrap_or_else(|| self.has_attr(handle, "checked"))
    }

    /// Checking a radio unchecks the other radios of its group.
    pub fn set_checked(&mut self, handle: ElementHandle, checked: bool) -> Result<(), DomError> {
        let tag = self.ensure_attached(handle)?.value().name().to_string();
        let kind = self.native_type(handle);
        if tag != "input" || !matches!(kind.as_str(), "checkbox" | "radio") {
            return Err(DomError::NotAControl(tag));
        }

        if kind == "radio" && checked {
            for other in self.radio_group(handle) {
                if other != handle {
                    self.state.entry(other.0).or_default().checked = Some(false);
                }
            }
        }
        self.state.entry(handle.0).or_default().checked = Some(checked);
        Ok(())
    }

    fn radio_group(&self, handle: ElementHandle) -> Vec<ElementHandle> {
        let Some(name) = self.attr(handle, "name").filter(|n| !n.is_empty()) else {
            return vec![handle];
        };
        let owner = self.form_owner(handle);
        self.query_selector_all("input")
            .unwrap_or_default()
            .into_iter()
            .filter(|&other| {
                self.native_type(other) == "radio"
                    && self.attr(other, "name") == Some(name)
                    && self.form_owner(other) == owner
            })
            .collect()
    }

    fn form_owner(&self, handle: ElementHandle) -> Option<ElementHandle> {
        self.ancestors(handle)
            .into_iter()
            .find(|&a| self.tag_name(a) == Some("form"))
    }

    pub fn options(&self, handle: ElementHandle) -> Vec<SelectOption> {
        if self.tag_name(handle) != Some("select") {
            return Vec::new();
        }
        self.query_selector_all_within(handle, "option")
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, option)| {
                let text = collapse_whitespace(&self.text_content(option));
                let value = self
                    .attr(option, "value")
                    .map(str::to_string)
                    .unwrap_or_else(|| text.clone());
                SelectOption {
                    handle: option,
                    index,
                    value,
                    text,
                }
            })
            .collect()
    }

    pub fn selected_index(&self, handle: ElementHandle) -> Option<usize> {
        if let Some(selected) = self.state.get(&handle.0).and_then(|s| s.selected) {
            return selected;
        }
        let options = self.options(handle);
        let marked = options
            .iter()
            .filter(|o| self.has_attr(o.handle, "selected"))
            .map(|o| o.index)
            .last();
        match marked {
            Some(index) => Some(index),
            None if self.has_attr(handle, "multiple") || options.is_empty() => None,
            None => Some(0),
        }
    }

    pub fn set_selected_index(&mut self, handle: ElementHandle, index: usize) -> Result<(), DomError> {
        let tag = self.ensure_attached(handle)?.value().name().to_string();
        if tag != "select" {
            return Err(DomError::NotAControl(tag));
        }
        let len = self.options(handle).len();
        if index >= len {
            return Err(DomError::OptionOutOfRange { index, len });
        }
        self.state.entry(handle.0).or_default().selected = Some(Some(index));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Style and layout
    // ---------------------------------------------------------------------

    pub fn computed_style(&self, handle: ElementHandle) -> ComputedStyle {
        style::compute(self, handle)
    }

    /// Border box of the element. Detached or unrendered elements get an empty rect.
    pub fn rect(&self, handle: ElementHandle) -> Rect {
        if let Some(rect) = self.rects.get(&handle.0) {
            return *rect;
        }
        if !self.is_attached(handle) {
            return Rect::default();
        }
        if self.layout.borrow().is_none() {
            let computed = layout::compute(self);
            self.layout.replace(Some(computed));
        }
        self.layout
            .borrow()
            .as_ref()
            .and_then(|l| l.get(&handle.0).copied())
            .unwrap_or_default()
    }

    /// Pin an element's geometry, for hosts that know the real layout.
    pub fn set_rect(&mut self, handle: ElementHandle, rect: Rect) {
        self.rects.insert(handle.0, rect);
    }

    // ---------------------------------------------------------------------
    // Focus and events
    // ---------------------------------------------------------------------

    pub fn focused(&self) -> Option<ElementHandle> {
        self.focused
    }

    pub fn focus(&mut self, handle: ElementHandle) -> Result<(), DomError> {
        self.ensure_attached(handle)?;
        if self.focused == Some(handle) {
            return Ok(());
        }
        self.focused = Some(handle);
        self.dispatch_event(handle, EventInit::plain("focus"))
    }

    pub fn add_event_listener<F>(&mut self, handle: ElementHandle, kind: &str, listener: F)
    where
        F: FnMut(&DomEvent) + 'static,
    {
        self.listeners
            .entry(handle.0)
            .or_default()
            .push((kind.to_string(), Box::new(listener)));
    }

    /// Record the event and run listeners on the target, then up the tree when it bubbles.
    pub fn dispatch_event(&mut self, handle: ElementHandle, init: EventInit) -> Result<(), DomError> {
        self.ensure_attached(handle)?;
        let event = DomEvent {
            kind: init.kind,
            target: handle,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
        };

        let mut path = vec![handle];
        if event.bubbles {
            path.extend(self.ancestors(handle));
        }
        for node in path {
            if let Some(listeners) = self.listeners.get_mut(&node.0) {
                for (kind, listener) in listeners.iter_mut() {
                    if *kind == event.kind {
                        listener(&event);
                    }
                }
            }
        }

        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Parse `fragment` and append its nodes to `parent`. Returns the top-level elements added.
    pub fn append_html(
        &mut self,
        parent: ElementHandle,
        fragment: &str,
    ) -> Result<Vec<ElementHandle>, DomError> {
        self.ensure_attached(parent)?;
        let parsed = Html::parse_fragment(fragment);
        let container = parsed.root_element();

        let mut added = Vec::new();
        for child in container.children() {
            if let Some(id) = copy_subtree(&mut self.html.tree, parent.0, child) {
                if child.value().is_element() {
                    added.push(ElementHandle(id));
                }
            }
        }

        self.invalidate_layout();
        self.mutations.push(MutationRecord::Added {
            parent,
            nodes: added.clone(),
        });
        Ok(added)
    }

    pub fn remove(&mut self, handle: ElementHandle) -> Result<(), DomError> {
        self.ensure_attached(handle)?;
        let parent = self.parent(handle);
        if let Some(mut node) = self.html.tree.get_mut(handle.0) {
            node.detach();
        }
        if self.focused.is_some_and(|f| !self.is_attached(f)) {
            self.focused = None;
        }
        self.invalidate_layout();
        self.mutations.push(MutationRecord::Removed {
            parent,
            node: handle,
        });
        Ok(())
    }

    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Serialize the current tree, including live form state.
    pub fn to_html(&self) -> String {
        serialize::to_html(self)
    }
}

fn copy_subtree(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) -> Option<NodeId> {
    let id = tree.get_mut(parent)?.append(source.value().clone()).id();
    for child in source.children() {
        copy_subtree(tree, id, child);
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_trims_and_joins() {
        assert_eq!(collapse_whitespace("  New \n  York "), "New York");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn invalid_selector_is_an_error_not_a_panic() {
        let doc = Document::parse("<input id='a'>");
        let err = doc.query_selector_all("#1bad").unwrap_err();
        assert!(matches!(err, DomError::InvalidSelector { .. }));
        assert!(doc.query_selector("input[").is_err());
    }
}
