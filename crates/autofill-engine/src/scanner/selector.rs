//! CSS selectors that re-resolve to one element.

use crate::dom::{Document, ElementHandle};
use regex::Regex;
use std::sync::LazyLock;

static CSS_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").unwrap());

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn resolves_uniquely(doc: &Document, selector: &str, handle: ElementHandle) -> bool {
    doc.query_selector_all(selector)
        .is_ok_and(|matches| matches.len() == 1 && matches[0] == handle)
}

/// `#id` when unique, then `[name="..."]` when unique, then a child-index path from `html`.
pub fn unique_selector(doc: &Document, handle: ElementHandle) -> String {
    if let Some(id) = doc.attr(handle, "id").filter(|id| CSS_IDENT.is_match(id)) {
        let selector = format!("#{id}");
        if resolves_uniquely(doc, &selector, handle) {
            return selector;
        }
    }

    if let Some(name) = doc.attr(handle, "name").filter(|n| !n.is_empty()) {
        let selector = format!("[name=\"{}\"]", escape_string(name));
        if resolves_uniquely(doc, &selector, handle) {
            return selector;
        }
    }

    path_selector(doc, handle)
}

fn path_selector(doc: &Document, handle: ElementHandle) -> String {
    let mut chain: Vec<ElementHandle> = doc.ancestors(handle);
    chain.reverse();
    chain.push(handle);

    chain
        .into_iter()
        .filter_map(|h| {
            let tag = doc.tag_name(h)?;
            Some(match tag {
                "html" | "body" => tag.to_string(),
                _ => format!("{tag}:nth-child({})", doc.child_position(h)),
            })
        })
        .collect::<Vec<_>>()
        .join(" > ")
}
