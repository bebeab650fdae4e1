//! Arena-backed document tree.
//!
//! Invariants:
//! - A `NodeId` is an index into one `Document`'s arena and is never reused.
//!   Detached nodes stay allocated until the document is dropped.
//! - Element names are canonical ASCII lowercase.
//! - Attribute order is source order; attribute names written through this
//!   API are stored verbatim and looked up by exact match.
//! - Structural misuse (inserting under a leaf, a reference node that is not
//!   a child of the stated parent) is a caller bug and panics.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a node inside one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
}

/// Scalar stored in an element's property bag.
///
/// Properties are distinct from attributes: they never serialize and their
/// names are case-preserving.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug)]
pub enum NodeKind {
    /// Root container for a parsed fragment or a render target.
    Fragment,
    Element {
        name: String,
        namespace: Namespace,
        attributes: Vec<(String, String)>,
        properties: Vec<(String, PropValue)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// A document tree: one arena of nodes plus a process-unique identity.
#[derive(Debug)]
pub struct Document {
    id: u64,
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }

    /// Process-unique identity, usable as a key for external side tables.
    pub fn id(&self) -> u64 {
        self.id
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let index = u32::try_from(self.nodes.len()).expect("node arena overflow");
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
        });
        NodeId(index)
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0 as usize]
    }

    fn data_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.nodes[node.0 as usize]
    }

    // --- creation ---

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_ns(name, Namespace::Html)
    }

    pub fn create_element_ns(&mut self, name: &str, namespace: Namespace) -> NodeId {
        debug_assert!(
            !name.bytes().any(|b| b.is_ascii_uppercase()),
            "element name must be canonical lowercase: {name:?}"
        );
        self.alloc(NodeKind::Element {
            name: name.to_string(),
            namespace,
            attributes: Vec::new(),
            properties: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Comment {
            text: text.to_string(),
        })
    }

    // --- structure ---

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.data(node).kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.data(node).children
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).children.first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).children.last().copied()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.data(node).parent?;
        let siblings = &self.data(parent).children;
        let pos = siblings
            .iter()
            .position(|&c| c == node)
            .expect("node missing from its parent's child list");
        siblings.get(pos + 1).copied()
    }

    fn assert_container(&self, node: NodeId) {
        assert!(
            matches!(
                self.data(node).kind,
                NodeKind::Fragment | NodeKind::Element { .. }
            ),
            "text and comment nodes cannot have children"
        );
    }

    /// Detach `node` from its parent, if any. The node stays allocated and
    /// keeps its subtree.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.data(node).parent else {
            return;
        };
        let siblings = &mut self.data_mut(parent).children;
        let pos = siblings
            .iter()
            .position(|&c| c == node)
            .expect("node missing from its parent's child list");
        siblings.remove(pos);
        self.data_mut(node).parent = None;
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_container(parent);
        self.detach(child);
        self.data_mut(parent).children.push(child);
        self.data_mut(child).parent = Some(parent);
    }

    /// Insert `child` before `reference` under `parent`; `None` appends.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let Some(reference) = reference else {
            self.append_child(parent, child);
            return;
        };
        self.assert_container(parent);
        self.detach(child);
        let siblings = &mut self.data_mut(parent).children;
        let pos = siblings
            .iter()
            .position(|&c| c == reference)
            .expect("reference node is not a child of the stated parent");
        siblings.insert(pos, child);
        self.data_mut(child).parent = Some(parent);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        assert_eq!(
            self.data(child).parent,
            Some(parent),
            "remove_child: node is not a child of the stated parent"
        );
        self.detach(child);
    }

    // --- text and comment data ---

    /// Character data of a text or comment node.
    pub fn text(&self, node: NodeId) -> &str {
        match &self.data(node).kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => text,
            _ => panic!("text(): node has no character data"),
        }
    }

    pub fn set_text(&mut self, node: NodeId, new_text: &str) {
        match &mut self.data_mut(node).kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => {
                text.clear();
                text.push_str(new_text);
            }
            _ => panic!("set_text(): node has no character data"),
        }
    }

    // --- elements ---

    pub fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.data(node).kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn namespace(&self, node: NodeId) -> Option<Namespace> {
        match &self.data(node).kind {
            NodeKind::Element { namespace, .. } => Some(*namespace),
            _ => None,
        }
    }

    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match &self.data(node).kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let NodeKind::Element { attributes, .. } = &mut self.data_mut(node).kind else {
            panic!("set_attribute(): not an element");
        };
        if let Some(slot) = attributes.iter_mut().find(|(k, _)| k == name) {
            slot.1.clear();
            slot.1.push_str(value);
        } else {
            attributes.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let NodeKind::Element { attributes, .. } = &mut self.data_mut(node).kind else {
            panic!("remove_attribute(): not an element");
        };
        attributes.retain(|(k, _)| k != name);
    }

    pub fn property(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        match &self.data(node).kind {
            NodeKind::Element { properties, .. } => {
                properties.iter().find(|(k, _)| k == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn set_property(&mut self, node: NodeId, name: &str, value: PropValue) {
        let NodeKind::Element { properties, .. } = &mut self.data_mut(node).kind else {
            panic!("set_property(): not an element");
        };
        if let Some(slot) = properties.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value;
        } else {
            properties.push((name.to_string(), value));
        }
    }

    pub fn remove_property(&mut self, node: NodeId, name: &str) {
        let NodeKind::Element { properties, .. } = &mut self.data_mut(node).kind else {
            panic!("remove_property(): not an element");
        };
        properties.retain(|(k, _)| k != name);
    }

    // --- cross-document copy ---

    /// Deep-copy a subtree from another document into this one. The copy is
    /// detached; properties are not copied (they are live state, not markup).
    pub fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = match &source.data(node).kind {
            NodeKind::Fragment => self.create_fragment(),
            NodeKind::Element {
                name,
                namespace,
                attributes,
                ..
            } => {
                let element = self.create_element_ns(name, *namespace);
                let NodeKind::Element {
                    attributes: dst, ..
                } = &mut self.data_mut(element).kind
                else {
                    unreachable!("create_element_ns returns an element");
                };
                *dst = attributes.clone();
                element
            }
            NodeKind::Text { text } => self.create_text(text),
            NodeKind::Comment { text } => self.create_comment(text),
        };
        for &child in source.children(node) {
            let imported = self.import(source, child);
            self.append_child(copy, imported);
        }
        copy
    }

    /// First descendant element with the given name, in pre-order. Test and
    /// debugging convenience, not a selector engine.
    pub fn query_element(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.element_name(node) == Some(name) {
                return Some(node);
            }
            for &child in self.children(node).iter().rev() {
                stack.push(child);
            }
        }
        None
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
