//! Computed style from inline declarations and a few user-agent rules.

use super::{Document, ElementHandle};

/// Elements the user agent never renders.
const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "base",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    /// `display: none` on the element or any ancestor.
    pub display_none: bool,
    /// Inherited `visibility: hidden | collapse`.
    pub visibility_hidden: bool,
    /// The element's own opacity.
    pub opacity: f32,
}

impl ComputedStyle {
    pub fn is_visible(&self) -> bool {
        !self.display_none && !self.visibility_hidden && self.opacity != 0.0
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display_none: false,
            visibility_hidden: false,
            opacity: 1.0,
        }
    }
}

/// Last declaration of `property` in an inline style attribute.
pub(crate) fn declared(style: Option<&str>, property: &str) -> Option<String> {
    style?
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
        .last()
}

/// `12px`, `12.5px` or a bare `0`.
pub(crate) fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok();
    }
    value.parse::<f32>().ok().filter(|n| *n == 0.0)
}

fn hides_itself(doc: &Document, handle: ElementHandle) -> bool {
    let Some(tag) = doc.tag_name(handle) else {
        return false;
    };
    if NON_RENDERED_TAGS.contains(&tag) || doc.has_attr(handle, "hidden") {
        return true;
    }
    if tag == "input" && doc.native_type(handle) == "hidden" {
        return true;
    }
    declared(doc.attr(handle, "style"), "display").as_deref() == Some("none")
}

pub(crate) fn compute(doc: &Document, handle: ElementHandle) -> ComputedStyle {
    let chain: Vec<ElementHandle> = std::iter::once(handle)
        .chain(doc.ancestors(handle))
        .collect();

    let display_none = chain.iter().any(|&h| hides_itself(doc, h));

    let visibility_hidden = chain
        .iter()
        .find_map(|&h| declared(doc.attr(h, "style"), "visibility"))
        .is_some_and(|v| v == "hidden" || v == "collapse");

    let opacity = declared(doc.attr(handle, "style"), "opacity")
        .and_then(|v| v.parse::<f32>().ok())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(1.0);

    ComputedStyle {
        display_none,
        visibility_hidden,
        opacity,
    }
}
