//! Live bindings: each part owns a DOM anchor and commits values with
//! dirty-checking and sentinel semantics.
//!
//! Invariants:
//! - A node part's start anchor is never removed by the part itself; clears
//!   evict only the nodes strictly between start and end.
//! - A primitive equal (strict) to the previously committed primitive is
//!   never written again.
//! - `NoChange` commits nothing and stores nothing; `Nothing` stores, then
//!   erases the binding's DOM effect.

use crate::cache::template_for;
use crate::instance::TemplateInstance;
use crate::result::TemplateResult;
use crate::template::BindingKind;
use crate::value::Value;
use dom::{Document, NodeId, NodeKind};
use std::rc::Rc;

/// What a node part currently holds between its anchors.
#[derive(Debug)]
enum NodeState {
    Empty,
    /// A single text node carrying the committed primitive. The primitive is
    /// kept for the strict-equality skip.
    Text(Value),
    Node(NodeId),
    Instance(TemplateInstance),
    Nothing,
}

/// Binding to a range of siblings: `(start, end)`, exclusive on both sides.
/// `end == None` means the range runs to the end of the parent.
#[derive(Debug)]
pub(crate) struct NodePart {
    start: NodeId,
    end: Option<NodeId>,
    state: NodeState,
}

impl NodePart {
    pub(crate) fn new(start: NodeId, end: Option<NodeId>) -> Self {
        Self {
            start,
            end,
            state: NodeState::Empty,
        }
    }

    pub(crate) fn start_node(&self) -> NodeId {
        self.start
    }

    pub(crate) fn commit(&mut self, doc: &mut Document, value: Value) {
        match value {
            Value::NoChange => {}
            Value::Template(result) => self.commit_template(doc, result),
            Value::Node(node) => self.commit_node(doc, node),
            Value::Nothing => {
                self.state = NodeState::Nothing;
                self.clear(doc);
            }
            primitive => self.commit_text(doc, primitive),
        }
    }

    fn parent(&self, doc: &Document) -> NodeId {
        doc.parent(self.start)
            .expect("node part anchor must stay attached")
    }

    /// Remove every node strictly between the anchors.
    fn clear(&mut self, doc: &mut Document) {
        let parent = self.parent(doc);
        while let Some(next) = doc.next_sibling(self.start) {
            if Some(next) == self.end {
                break;
            }
            doc.remove_child(parent, next);
        }
    }

    fn insert(&self, doc: &mut Document, node: NodeId) {
        let parent = self.parent(doc);
        doc.insert_before(parent, node, self.end);
    }

    fn commit_text(&mut self, doc: &mut Document, value: Value) {
        debug_assert!(value.is_primitive());
        if let NodeState::Text(previous) = &self.state {
            if previous.primitive_eq(&value) {
                return;
            }
            // The range still holds exactly the text node we wrote earlier;
            // mutate it in place.
            let existing = doc
                .next_sibling(self.start)
                .expect("committed text node must follow the anchor");
            debug_assert!(matches!(doc.kind(existing), NodeKind::Text { .. }));
            doc.set_text(existing, &value.to_text());
            self.state = NodeState::Text(value);
            return;
        }
        self.clear(doc);
        let text = doc.create_text(&value.to_text());
        self.insert(doc, text);
        self.state = NodeState::Text(value);
    }

    fn commit_node(&mut self, doc: &mut Document, node: NodeId) {
        if let NodeState::Node(previous) = &self.state {
            if *previous == node {
                return;
            }
        }
        self.clear(doc);
        self.insert(doc, node);
        self.state = NodeState::Node(node);
    }

    fn commit_template(&mut self, doc: &mut Document, result: TemplateResult) {
        let template = template_for(&result);
        let values = result.into_values();
        if let NodeState::Instance(instance) = &mut self.state {
            if Rc::ptr_eq(instance.template(), &template) {
                instance.update(doc, values);
                return;
            }
        }
        let mut instance = TemplateInstance::new(template);
        let fragment = instance.stamp(doc);
        instance.update(doc, values);
        self.clear(doc);
        let children = doc.children(fragment).to_vec();
        for child in children {
            self.insert(doc, child);
        }
        self.state = NodeState::Instance(instance);
    }
}

/// Binding to one element attribute, property, or boolean attribute.
///
/// `strings == None` is a single-value binding; otherwise the part owns the
/// `k + 1` literal segments of an interpolation and a per-component committed
/// cache used to carry values across `NoChange` holes.
#[derive(Debug)]
pub(crate) struct AttributePart {
    element: NodeId,
    name: String,
    kind: BindingKind,
    strings: Option<Vec<String>>,
    committed: Vec<Value>,
    has_committed: bool,
}

impl AttributePart {
    pub(crate) fn new(
        element: NodeId,
        name: String,
        kind: BindingKind,
        strings: Option<Vec<String>>,
    ) -> Self {
        debug_assert!(kind != BindingKind::Event, "event bindings never bind");
        let components = strings.as_ref().map_or(1, |s| s.len() - 1);
        Self {
            element,
            name,
            kind,
            strings,
            committed: vec![Value::Null; components],
            has_committed: false,
        }
    }

    /// Number of dynamic values this part consumes per update.
    pub(crate) fn value_count(&self) -> usize {
        self.strings.as_ref().map_or(1, |s| s.len() - 1)
    }

    pub(crate) fn commit(&mut self, doc: &mut Document, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.value_count());
        if self.strings.is_some() {
            self.commit_interpolation(doc, values);
        } else {
            let [value] = values
                .try_into()
                .expect("single-value binding takes one value");
            self.commit_single(doc, value);
        }
    }

    fn commit_single(&mut self, doc: &mut Document, value: Value) {
        if matches!(value, Value::NoChange) {
            return;
        }
        if self.has_committed
            && (value.is_primitive() || matches!(value, Value::Nothing))
            && self.committed[0].primitive_eq(&value)
        {
            return;
        }
        match self.kind {
            BindingKind::Attribute => {
                if matches!(value, Value::Nothing) {
                    doc.remove_attribute(self.element, &self.name);
                } else {
                    doc.set_attribute(self.element, &self.name, &value.to_text());
                }
            }
            BindingKind::Boolean => {
                if value.is_truthy() {
                    doc.set_attribute(self.element, &self.name, "");
                } else {
                    doc.remove_attribute(self.element, &self.name);
                }
            }
            BindingKind::Property => {
                if matches!(value, Value::Nothing) {
                    doc.remove_property(self.element, &self.name);
                } else {
                    doc.set_property(self.element, &self.name, value.to_prop());
                }
            }
            BindingKind::Event => unreachable!("event bindings never bind"),
        }
        self.committed[0] = value;
        self.has_committed = true;
    }

    fn commit_interpolation(&mut self, doc: &mut Document, values: Vec<Value>) {
        let strings = self.strings.as_ref().expect("interpolation has segments");
        let mut text = strings[0].clone();
        let mut changed = !self.has_committed;
        let mut remove = false;
        for (i, value) in values.into_iter().enumerate() {
            if !matches!(value, Value::NoChange) {
                if !self.committed[i].primitive_eq(&value) {
                    changed = true;
                }
                self.committed[i] = value;
            }
            let component = &self.committed[i];
            if matches!(component, Value::Nothing) {
                remove = true;
            }
            text.push_str(&component.to_text());
            text.push_str(&strings[i + 1]);
        }
        if !changed {
            return;
        }
        self.has_committed = true;
        if remove {
            doc.remove_attribute(self.element, &self.name);
            return;
        }
        match self.kind {
            BindingKind::Attribute => doc.set_attribute(self.element, &self.name, &text),
            BindingKind::Boolean => {
                if !text.is_empty() {
                    doc.set_attribute(self.element, &self.name, "");
                } else {
                    doc.remove_attribute(self.element, &self.name);
                }
            }
            BindingKind::Property => {
                doc.set_property(self.element, &self.name, Value::Str(text).to_prop())
            }
            BindingKind::Event => unreachable!("event bindings never bind"),
        }
    }
}
