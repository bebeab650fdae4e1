//! In-process document tree: arena node store, permissive HTML fragment
//! parsing, pre-order traversal, and HTML serialization.
//!
//! This crate is the host side of the templating pipeline: templates parse
//! into inert fragments here, and rendering mutates a live `Document` through
//! the same node API.

mod entities;
mod parse;
mod serialize;
mod types;
mod walk;

pub use crate::parse::parse_fragment;
pub use crate::serialize::{inner_html, outer_html};
pub use crate::types::{Document, Namespace, NodeId, NodeKind, PropValue};
pub use crate::walk::TreeWalker;
