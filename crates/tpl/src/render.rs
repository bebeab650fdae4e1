//! Render entry point and per-container root parts.
//!
//! The first render into a container appends one empty comment as the root
//! part's start anchor and leaves the end open, so the part's range runs
//! through the container's last child. Later renders into the same container
//! reuse that root; all DOM mutations happen synchronously in template order
//! before `render` returns.

use crate::part::NodePart;
use crate::value::Value;
use dom::{Document, NodeId};
use std::cell::RefCell;
use std::collections::HashMap;

/// Render options. No options are active yet; the surface is reserved for a
/// future event-listener part.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct RenderOptions {}

thread_local! {
    // Root parts keyed by (document identity, container). Document ids are
    // never reused, so entries for dropped documents go unreachable rather
    // than aliasing a new document.
    static ROOTS: RefCell<HashMap<(u64, NodeId), NodePart>> = RefCell::new(HashMap::new());
}

/// Render `value` into `container`, installing the container's root part on
/// first use.
pub fn render(doc: &mut Document, value: impl Into<Value>, container: NodeId) {
    render_with_options(doc, value, container, RenderOptions::default());
}

pub fn render_with_options(
    doc: &mut Document,
    value: impl Into<Value>,
    container: NodeId,
    _options: RenderOptions,
) {
    let key = (doc.id(), container);
    let mut root = ROOTS
        .with(|roots| roots.borrow_mut().remove(&key))
        .unwrap_or_else(|| {
            log::trace!(target: "tpl.render", "installing root part on container {container:?}");
            let start = doc.create_comment("");
            doc.append_child(container, start);
            NodePart::new(start, None)
        });
    root.commit(doc, value.into());
    // The part is held out of the registry during the commit; commits never
    // re-enter render, so the slot cannot be observed empty.
    ROOTS.with(|roots| roots.borrow_mut().insert(key, root));
}

/// The root part's start anchor for a container, if one was installed.
pub fn root_anchor(doc: &Document, container: NodeId) -> Option<NodeId> {
    let key = (doc.id(), container);
    ROOTS.with(|roots| roots.borrow().get(&key).map(NodePart::start_node))
}

/// Drop the root part installed on `container`. The rendered nodes stay in
/// the document; the next render starts from a fresh root.
pub fn detach_root(doc: &Document, container: NodeId) -> bool {
    let key = (doc.id(), container);
    ROOTS.with(|roots| roots.borrow_mut().remove(&key)).is_some()
}
