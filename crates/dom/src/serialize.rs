//! HTML serialization of document subtrees.
//!
//! Rules:
//! - Attributes serialize in stored order as `name="value"`; value-less
//!   attributes as `name=""`.
//! - Void elements emit no end tag; raw-text element content is verbatim.
//! - Text escapes `&`, `<`, `>`; attribute values escape `&` and `"`.
//! - Comments emit as `<!--data-->` with the data verbatim.

use crate::parse::is_raw_text_element;
use crate::types::{Document, NodeId, NodeKind};

fn is_void_name(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Serialize the children of `node`.
pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    let raw = doc
        .element_name(node)
        .is_some_and(is_raw_text_element);
    for &child in doc.children(node) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

/// Serialize `node` itself, including its subtree.
pub fn outer_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, false, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, parent_is_raw: bool, out: &mut String) {
    match doc.kind(node) {
        NodeKind::Fragment => {
            for &child in doc.children(node) {
                write_node(doc, child, false, out);
            }
        }
        NodeKind::Element { name, attributes, .. } => {
            out.push('<');
            out.push_str(name);
            for (k, v) in attributes {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                escape_attr(v, out);
                out.push('"');
            }
            out.push('>');
            if is_void_name(name) {
                return;
            }
            let raw = is_raw_text_element(name);
            for &child in doc.children(node) {
                write_node(doc, child, raw, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Text { text } => {
            if parent_is_raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}
