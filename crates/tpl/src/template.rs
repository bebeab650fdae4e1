//! Compiled templates: the annotated HTML is parsed into an inert fragment,
//! which is walked once to classify every marker into a part descriptor.
//!
//! Invariants:
//! - `parts` is ordered by the walker's pre-order visit of each descriptor's
//!   anchor node, which is also the order bindings appear in the source.
//! - A descriptor's `index` is the anchor's zero-based pre-order position in
//!   the inert fragment; instances resolve it by re-walking their clone in
//!   the same order.
//! - The values consumed by all descriptors sum to `strings.len() - 1`.

use crate::marker::{comment_body, marker, BOUND_ATTR_SUFFIX};
use crate::result::{Statics, TemplateKind};
use crate::scan::scan;
use dom::{Document, Namespace, NodeId, NodeKind, TreeWalker};
use std::cell::RefCell;

thread_local! {
    // One walker, re-targeted per parse and per clone.
    static WALKER: RefCell<TreeWalker> = RefCell::new(TreeWalker::new());
}

/// Run `f` with the shared tree walker. Walks never nest: compiles happen
/// outside clone walks, and commits happen after the walk that bound them.
pub(crate) fn with_walker<R>(f: impl FnOnce(&mut TreeWalker) -> R) -> R {
    WALKER.with(|w| f(&mut w.borrow_mut()))
}

/// Binding flavor parsed from the raw attribute name's first character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BindingKind {
    /// Bare name: `setAttribute` semantics.
    Attribute,
    /// `.name`: element property assignment.
    Property,
    /// `?name`: attribute present iff the value is truthy.
    Boolean,
    /// `@name`: reserved for event listeners; parsed but never bound.
    Event,
}

/// Static descriptor of one binding site.
#[derive(Debug)]
pub(crate) enum TemplatePart {
    Attribute {
        index: usize,
        name: String,
        /// `None` for a single-value binding; otherwise the `k + 1` literal
        /// segments of an interpolation.
        strings: Option<Vec<String>>,
        kind: BindingKind,
    },
    Node {
        index: usize,
    },
    /// A bare marker attribute sat on this element. Reserved; no binding
    /// class yet, but it consumes one value.
    Element {
        index: usize,
    },
    /// A marker inside comment data. Inactive, but keeps the value ledger
    /// aligned for later bindings.
    Comment {
        index: usize,
    },
}

impl TemplatePart {
    pub(crate) fn index(&self) -> usize {
        match self {
            TemplatePart::Attribute { index, .. }
            | TemplatePart::Node { index }
            | TemplatePart::Element { index }
            | TemplatePart::Comment { index } => *index,
        }
    }

    /// How many dynamic values this descriptor consumes.
    pub(crate) fn value_count(&self) -> usize {
        match self {
            TemplatePart::Attribute {
                strings: Some(statics),
                ..
            } => statics.len() - 1,
            _ => 1,
        }
    }
}

/// A compiled template: the inert prototype fragment plus its descriptors.
#[derive(Debug)]
pub struct Template {
    pub(crate) document: Document,
    pub(crate) root: NodeId,
    pub(crate) parts: Vec<TemplatePart>,
}

pub(crate) fn compile(kind: TemplateKind, strings: Statics) -> Template {
    let scanned = scan(kind, strings);
    let mut document = Document::new();
    let root = dom::parse_fragment(&mut document, &scanned.html, Namespace::Html);
    if kind == TemplateKind::Svg {
        unwrap_svg_root(&mut document, root);
    }

    let mut parts = Vec::new();
    let mut attr_names = scanned.attr_names.into_iter();
    let mut value_count = 0usize;
    let mut node_index = 0usize;

    with_walker(|walker| {
        walker.retarget(root);
        while let Some(node) = walker.next(&document) {
            if matches!(document.kind(node), NodeKind::Element { .. }) {
                collect_attribute_parts(
                    &mut document,
                    node,
                    node_index,
                    &mut attr_names,
                    &mut parts,
                    &mut value_count,
                );
                if is_raw_text(&document, node) {
                    split_raw_text(&mut document, node, node_index, &mut parts, &mut value_count);
                }
            } else if let NodeKind::Comment { text } = document.kind(node) {
                if text == comment_body() {
                    parts.push(TemplatePart::Node { index: node_index });
                    value_count += 1;
                } else {
                    for _ in 0..text.matches(marker()).count() {
                        parts.push(TemplatePart::Comment { index: node_index });
                        value_count += 1;
                    }
                }
            }
            node_index += 1;
        }
    });

    assert_eq!(
        value_count,
        strings.len() - 1,
        "compiled parts consume {value_count} values but the literal has {} interpolations",
        strings.len() - 1
    );

    log::trace!(
        target: "tpl.compile",
        "compiled template: {} nodes walked, {} parts",
        node_index,
        parts.len()
    );

    Template {
        document,
        root,
        parts,
    }
}

/// Move the scanner's `<svg>` wrapper contents up into the fragment root and
/// discard the wrapper. Children were parsed inside it, so they already carry
/// the SVG namespace.
fn unwrap_svg_root(document: &mut Document, root: NodeId) {
    let wrapper = document
        .first_child(root)
        .expect("svg scan output always parses to a wrapper element");
    debug_assert_eq!(document.element_name(wrapper), Some("svg"));
    let children: Vec<NodeId> = document.children(wrapper).to_vec();
    for child in children {
        document.insert_before(root, child, Some(wrapper));
    }
    document.remove_child(root, wrapper);
}

fn is_raw_text(document: &Document, node: NodeId) -> bool {
    matches!(
        document.element_name(node),
        Some("script" | "style" | "textarea")
    )
}

/// Classify this element's marked attributes in stored order. Bound names
/// come from the scanner's ledger (the parser lowercased the names in the
/// tree, the ledger preserves the authored case and prefix).
fn collect_attribute_parts(
    document: &mut Document,
    node: NodeId,
    node_index: usize,
    attr_names: &mut impl Iterator<Item = String>,
    parts: &mut Vec<TemplatePart>,
    value_count: &mut usize,
) {
    let mut i = 0;
    while i < document.attributes(node).len() {
        let (name, value) = {
            let (n, v) = &document.attributes(node)[i];
            (n.clone(), v.clone())
        };
        if name.ends_with(BOUND_ATTR_SUFFIX) {
            document.remove_attribute(node, &name);
            let statics: Vec<String> = value.split(marker()).map(str::to_string).collect();
            let raw = attr_names
                .next()
                .expect("attribute ledger exhausted before its bindings");
            let (kind, bound_name) = split_binding_prefix(&raw);
            let single = statics.len() == 2 && statics[0].is_empty() && statics[1].is_empty();
            *value_count += if single { 1 } else { statics.len() - 1 };
            parts.push(TemplatePart::Attribute {
                index: node_index,
                name: bound_name.to_string(),
                strings: if single { None } else { Some(statics) },
                kind,
            });
            // The attribute list shifted left; keep `i` in place.
        } else if name == marker() {
            document.remove_attribute(node, &name);
            parts.push(TemplatePart::Element { index: node_index });
            *value_count += 1;
        } else {
            i += 1;
        }
    }
}

fn split_binding_prefix(raw: &str) -> (BindingKind, &str) {
    match raw.as_bytes().first() {
        Some(b'.') => (BindingKind::Property, &raw[1..]),
        Some(b'?') => (BindingKind::Boolean, &raw[1..]),
        Some(b'@') => (BindingKind::Event, &raw[1..]),
        _ => (BindingKind::Attribute, raw),
    }
}

/// Split a raw-text element's content on the marker and rebuild its children
/// with a fresh comment anchor per binding. The appended nodes are walked
/// right after the element, so anchor indices are offsets from the element's
/// own index.
fn split_raw_text(
    document: &mut Document,
    node: NodeId,
    node_index: usize,
    parts: &mut Vec<TemplatePart>,
    value_count: &mut usize,
) {
    let children = document.children(node).to_vec();
    let [text_node] = children[..] else {
        return;
    };
    let content = document.text(text_node).to_string();
    if !content.contains(marker()) {
        return;
    }
    document.remove_child(node, text_node);

    let segments: Vec<&str> = content.split(marker()).collect();
    let last = segments.len() - 1;
    let mut appended = 0usize;
    for segment in &segments[..last] {
        if segment.is_empty() {
            let placeholder = document.create_comment("");
            document.append_child(node, placeholder);
        } else {
            let text = document.create_text(segment);
            document.append_child(node, text);
        }
        appended += 1;
        let anchor = document.create_comment("");
        document.append_child(node, anchor);
        appended += 1;
        parts.push(TemplatePart::Node {
            index: node_index + appended,
        });
        *value_count += 1;
    }
    if !segments[last].is_empty() {
        let tail = document.create_text(segments[last]);
        document.append_child(node, tail);
    }
}
