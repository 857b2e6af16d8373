//! Context extraction: the text a person would read next to a control.

use crate::dom::{Document, ElementHandle};
use autofill_common::FieldContext;
use regex::Regex;
use std::sync::LazyLock;

/// Sibling text that reads like a field caption.
static CAPTION_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(name|email|phone|address|city|state|zip|title|experience|skills)").unwrap()
});

const NEARBY_TEXT_SELECTOR: &str = "p, span, div, h1, h2, h3, h4, h5, h6";

/// Gather the textual surroundings of `handle`. Pure read of the page.
pub fn extract_context(doc: &Document, handle: ElementHandle) -> FieldContext {
    let attr = |name: &str| doc.attr(handle, name).unwrap_or_default().to_string();

    let label_text = find_label(doc, handle)
        .map(|label| doc.text_content(label).trim().to_string())
        .unwrap_or_default();

    FieldContext {
        element_name: attr("name"),
        element_id: attr("id"),
        placeholder: attr("placeholder"),
        native_input_type: doc.native_type(handle),
        label_text,
        nearby_text: nearby_text(doc, handle),
        aria_label: attr("aria-label"),
        aria_described_by: attr("aria-describedby"),
        tag_name: doc.tag_name(handle).unwrap_or_default().to_string(),
    }
}

/// Label resolution: `label[for=id]`, then an enclosing `<label>`, then a caption-like sibling.
pub fn find_label(doc: &Document, handle: ElementHandle) -> Option<ElementHandle> {
    if let Some(id) = doc.attr(handle, "id").filter(|id| !id.is_empty()) {
        // Compare attributes rather than building `label[for="..."]`, which
        // would need escaping for arbitrary ids.
        let explicit = doc
            .query_selector_all("label[for]")
            .unwrap_or_default()
            .into_iter()
            .find(|&label| doc.attr(label, "for") == Some(id));
        if explicit.is_some() {
            return explicit;
        }
    }

    for ancestor in doc.ancestors(handle) {
        match doc.tag_name(ancestor) {
            Some("body") | Some("html") => break,
            Some("label") => return Some(ancestor),
            _ => {}
        }
    }

    let parent = doc.parent(handle)?;
    doc.children(parent).into_iter().find(|&sibling| {
        sibling != handle
            && (doc.tag_name(sibling) == Some("label")
                || doc.class_list(sibling).contains(&"label")
                || CAPTION_TEXT.is_match(doc.text_content(sibling).trim_start()))
    })
}

/// Visible text of block and inline text elements under the control's parent.
fn nearby_text(doc: &Document, handle: ElementHandle) -> String {
    let Some(parent) = doc.parent(handle) else {
        return String::new();
    };
    doc.query_selector_all_within(parent, NEARBY_TEXT_SELECTOR)
        .unwrap_or_default()
        .into_iter()
        .filter(|&el| el != handle && doc.computed_style(el).is_visible())
        .map(|el| doc.text_content(el).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
