use super::{Document, ElementHandle};
use ego_tree::NodeRef;
use scraper::Node;
use std::collections::HashSet;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

pub(crate) fn to_html(doc: &Document) -> String {
    let selected: HashSet<ElementHandle> = doc
        .query_selector_all("select")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|select| {
            let index = doc.selected_index(select)?;
            doc.options(select).into_iter().nth(index).map(|o| o.handle)
        })
        .collect();

    let mut out = String::new();
    for child in doc.html.tree.root().children() {
        write_node(doc, child, &selected, &mut out);
    }
    out
}

fn write_node(
    doc: &Document,
    node: NodeRef<'_, Node>,
    selected: &HashSet<ElementHandle>,
    out: &mut String,
) {
    match node.value() {
        Node::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype.name());
            out.push('>');
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Text(text) => {
            let raw = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| RAW_TEXT_TAGS.contains(&name));
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        Node::Element(element) => {
            let handle = ElementHandle(node.id());
            let tag = element.name();
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes(doc, handle, selected) {
                out.push(' ');
                out.push_str(&name);
                if let Some(value) = value {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&value));
                    out.push('"');
                }
            }
            out.push('>');
            if VOID_TAGS.contains(&tag) {
                return;
            }
            if tag == "textarea" {
                out.push_str(&escape_text(&doc.value(handle)));
            } else {
                for child in node.children() {
                    write_node(doc, child, selected, out);
                }
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        _ => {
            for child in node.children() {
                write_node(doc, child, selected, out);
            }
        }
    }
}

/// Parse-time attributes with writes applied and live form state reflected.
fn attributes(
    doc: &Document,
    handle: ElementHandle,
    selected: &HashSet<ElementHandle>,
) -> Vec<(String, Option<String>)> {
    let Some(element) = doc.element(handle) else {
        return Vec::new();
    };
    let tag = element.value().name();
    let native_type = doc.native_type(handle);
    let is_toggle = tag == "input" && matches!(native_type.as_str(), "checkbox" | "radio");
    let is_option = tag == "option";

    let reflected = |name: &str| -> bool {
        (tag == "input" && !is_toggle && name == "value")
            || (is_toggle && name == "checked")
            || (is_option && name == "selected")
    };

    let mut attrs: Vec<(String, Option<String>)> = Vec::new();
    for (name, _) in element.value().attrs() {
        if reflected(name) {
            continue;
        }
        attrs.push((name.to_string(), doc.attr(handle, name).map(str::to_string)));
    }
    if let Some(written) = doc.attrs.get(&handle.0) {
        for (name, value) in written {
            if !reflected(name) && element.value().attr(name).is_none() {
                attrs.push((name.clone(), Some(value.clone())));
            }
        }
    }

    if tag == "input" && !is_toggle {
        let value = doc.value(handle);
        if !value.is_empty() || doc.has_attr(handle, "value") {
            attrs.push(("value".to_string(), Some(value)));
        }
    }
    if is_toggle && doc.checked(handle) {
        attrs.push(("checked".to_string(), None));
    }
    if is_option && selected.contains(&handle) {
        attrs.push(("selected".to_string(), None));
    }
    attrs
}
