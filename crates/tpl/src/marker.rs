//! Marker vocabulary.
//!
//! All markers derive from one per-process token chosen so the fragment
//! parser accepts it as an element name, an attribute name, and an unquoted
//! attribute value. The token is lowercase hex so parser name
//! canonicalization is the identity on it.
//!
//! Derived forms:
//! - `BOUND_ATTR_SUFFIX` is appended to a bound attribute's name in the
//!   emitted HTML so the compiled-template walk can find it after parsing.
//! - `node_marker()` (`<?token>`) parses as a comment node and marks text
//!   positions.
//! - `comment_body()` (`?token`) is the data of such a comment.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::OnceLock;

/// Suffix spliced onto a bound attribute's name in scanner output.
pub(crate) const BOUND_ATTR_SUFFIX: &str = "$lit$";

static MARKER: OnceLock<String> = OnceLock::new();
static NODE_MARKER: OnceLock<String> = OnceLock::new();
static COMMENT_BODY: OnceLock<String> = OnceLock::new();

/// The per-process marker token.
pub(crate) fn marker() -> &'static str {
    MARKER.get_or_init(|| {
        crate::register_version();
        let entropy = RandomState::new().build_hasher().finish();
        format!("tpl${entropy:016x}$")
    })
}

/// Marker form for text positions; parses as a comment node.
pub(crate) fn node_marker() -> &'static str {
    NODE_MARKER.get_or_init(|| format!("<?{}>", marker()))
}

/// Comment data produced by parsing [`node_marker`].
pub(crate) fn comment_body() -> &'static str {
    COMMENT_BODY.get_or_init(|| format!("?{}", marker()))
}
