//! Line-per-control layout.
//!
//! There is no rendering engine behind `Document`, so geometry is synthesized:
//! every rendered form control takes the next row, sized by its kind or by
//! inline `width`/`height` in px. Everything else gets an empty box unless the
//! host pins one with `Document::set_rect`.

use super::style::{declared, parse_px};
use super::{CONTROL_TAGS, Document, ElementHandle};
use ego_tree::NodeId;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ROW_HEIGHT: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn default_size(tag: &str, native_type: &str) -> (f32, f32) {
    match (tag, native_type) {
        ("input", "checkbox" | "radio") => (16.0, 16.0),
        ("textarea", _) => (300.0, 64.0),
        ("button", _) => (80.0, 24.0),
        _ => (200.0, 24.0),
    }
}

pub(crate) fn compute(doc: &Document) -> HashMap<NodeId, Rect> {
    let mut rects = HashMap::new();
    let mut row = 0usize;

    for node in doc.html.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = element.value().name();
        if !CONTROL_TAGS.contains(&tag) {
            continue;
        }
        let handle = ElementHandle(node.id());
        if doc.computed_style(handle).display_none {
            continue;
        }

        let (default_width, default_height) = default_size(tag, &doc.native_type(handle));
        let style = doc.attr(handle, "style");
        let width = declared(style, "width")
            .and_then(|v| parse_px(&v))
            .unwrap_or(default_width);
        let height = declared(style, "height")
            .and_then(|v| parse_px(&v))
            .unwrap_or(default_height);

        rects.insert(
            node.id(),
            Rect::new(0.0, row as f32 * ROW_HEIGHT, width, height),
        );
        row += 1;
    }

    rects
}
