//! Shared helpers for engine integration tests.
//!
//! Rendered containers carry engine marker comments (the root anchor and one
//! anchor per node binding). They are implementation detail; tests strip
//! them before asserting on serialized output.

use dom::{inner_html, Document, NodeId};
use regex::Regex;
use std::sync::OnceLock;

/// Marker comments: empty anchors (`<!---->`) and text-position markers
/// (`<!--?tpl$…$-->`).
fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<!--\?tpl\$[0-9a-f]+\$-->|<!---->").expect("marker pattern compiles")
    })
}

/// Remove engine marker comments from serialized HTML.
pub fn strip_markers(html: &str) -> String {
    marker_pattern().replace_all(html, "").into_owned()
}

/// Serialize a rendered container with marker comments stripped.
pub fn rendered_html(doc: &Document, container: NodeId) -> String {
    strip_markers(&inner_html(doc, container))
}

/// Assert a container's stripped serialization, with both forms in the
/// failure message.
#[track_caller]
pub fn assert_rendered(doc: &Document, container: NodeId, expected: &str) {
    let raw = inner_html(doc, container);
    let actual = strip_markers(&raw);
    assert_eq!(
        actual, expected,
        "rendered output mismatch\n  raw: {raw}\n  stripped: {actual}\n  expected: {expected}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_anchor_and_text_markers_only() {
        let html = "<div><!--?tpl$00deadbeef$-->A</div><!---->B<!-- keep -->";
        assert_eq!(strip_markers(html), "<div>A</div>B<!-- keep -->");
    }
}
