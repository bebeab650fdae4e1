//! Re-targetable depth-first pre-order walker.
//!
//! One walker instance is meant to be reused across many traversals
//! (`retarget` resets it onto a new root). It visits every descendant of the
//! root — elements, text, and comments — in document order, excluding the
//! root itself. Positions are computed lazily from the live tree, so nodes
//! appended below the current position during the walk are still visited.

use crate::types::{Document, NodeId};

#[derive(Debug)]
pub struct TreeWalker {
    root: Option<NodeId>,
    current: Option<NodeId>,
}

impl TreeWalker {
    pub fn new() -> Self {
        Self {
            root: None,
            current: None,
        }
    }

    /// Point the walker at a new root and reset its position.
    pub fn retarget(&mut self, root: NodeId) {
        self.root = Some(root);
        self.current = None;
    }

    /// Advance to the next node in pre-order, or `None` when the subtree is
    /// exhausted.
    pub fn next(&mut self, doc: &Document) -> Option<NodeId> {
        let root = self.root.expect("walker used before retarget()");
        let next = match self.current {
            None => doc.first_child(root),
            Some(current) => {
                if let Some(child) = doc.first_child(current) {
                    Some(child)
                } else {
                    // Climb until a next sibling exists, stopping at the root.
                    let mut node = current;
                    loop {
                        if node == root {
                            break None;
                        }
                        if let Some(sibling) = doc.next_sibling(node) {
                            break Some(sibling);
                        }
                        node = doc.parent(node).expect("walk escaped its root");
                    }
                }
            }
        };
        self.current = next;
        next
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}
