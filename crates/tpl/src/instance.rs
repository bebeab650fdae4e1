//! Template instances: a stamped clone of the inert fragment plus the live
//! parts bound to its nodes.

use crate::part::{AttributePart, NodePart};
use crate::template::{BindingKind, Template, TemplatePart};
use crate::value::Value;
use dom::{Document, NodeId};
use std::rc::Rc;

/// One live slot per descriptor, in descriptor order. Inactive slots bind
/// nothing but still consume their reserved values on update.
#[derive(Debug)]
enum Slot {
    Node(NodePart),
    Attribute(AttributePart),
    Inactive { reserved: usize },
}

#[derive(Debug)]
pub(crate) struct TemplateInstance {
    template: Rc<Template>,
    slots: Vec<Slot>,
}

impl TemplateInstance {
    pub(crate) fn new(template: Rc<Template>) -> Self {
        Self {
            template,
            slots: Vec::new(),
        }
    }

    pub(crate) fn template(&self) -> &Rc<Template> {
        &self.template
    }

    /// Deep-import the prototype into `doc` and bind a live part for each
    /// descriptor by correlating walker position with descriptor index.
    /// Returns the stamped fragment; the caller moves its children into
    /// place (part anchors are node ids, stable across the move).
    pub(crate) fn stamp(&mut self, doc: &mut Document) -> NodeId {
        assert!(self.slots.is_empty(), "instance stamped twice");
        let fragment = doc.import(&self.template.document, self.template.root);

        let template = Rc::clone(&self.template);
        let mut descriptors = template.parts.iter().peekable();
        let mut node_index = 0usize;
        crate::template::with_walker(|walker| {
            walker.retarget(fragment);
            while let Some(node) = walker.next(doc) {
                while descriptors
                    .peek()
                    .is_some_and(|part| part.index() == node_index)
                {
                    let part = descriptors.next().expect("peeked descriptor exists");
                    self.slots.push(bind_slot(doc, part, node));
                }
                node_index += 1;
            }
        });
        assert!(
            descriptors.next().is_none(),
            "descriptor anchors missing from the stamped fragment"
        );
        fragment
    }

    /// Walk the slots in order, handing each its values.
    pub(crate) fn update(&mut self, doc: &mut Document, values: Vec<Value>) {
        let expected: usize = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Node(_) => 1,
                Slot::Attribute(part) => part.value_count(),
                Slot::Inactive { reserved } => *reserved,
            })
            .sum();
        assert_eq!(
            values.len(),
            expected,
            "update got {} values for {} bindings",
            values.len(),
            expected
        );

        let mut values = values.into_iter();
        for slot in &mut self.slots {
            match slot {
                Slot::Node(part) => {
                    let value = values.next().expect("value counts verified above");
                    part.commit(doc, value);
                }
                Slot::Attribute(part) => {
                    let taken: Vec<Value> = values.by_ref().take(part.value_count()).collect();
                    part.commit(doc, taken);
                }
                Slot::Inactive { reserved } => {
                    for _ in 0..*reserved {
                        values.next();
                    }
                }
            }
        }
    }

}

fn bind_slot(doc: &Document, part: &TemplatePart, node: NodeId) -> Slot {
    match part {
        TemplatePart::Node { .. } => Slot::Node(NodePart::new(node, doc.next_sibling(node))),
        TemplatePart::Attribute {
            name,
            strings,
            kind,
            ..
        } => {
            if *kind == BindingKind::Event {
                // Reserved: parsed, never bound.
                Slot::Inactive {
                    reserved: strings.as_ref().map_or(1, |s| s.len() - 1),
                }
            } else {
                Slot::Attribute(AttributePart::new(
                    node,
                    name.clone(),
                    *kind,
                    strings.clone(),
                ))
            }
        }
        TemplatePart::Element { .. } | TemplatePart::Comment { .. } => {
            Slot::Inactive { reserved: 1 }
        }
    }
}
