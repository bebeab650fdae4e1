//! HTML scanner: annotates the static fragments with marker tokens.
//!
//! The scanner walks each static fragment with a mode machine that mirrors
//! how the fragment parser will later classify the same bytes, so that every
//! interpolation boundary gets the one marker shape the parser will keep
//! intact at that position:
//!
//! - text position → the node marker (`<?token>`, parses as a comment);
//! - attribute-value position → the bare token, with the bound-attribute
//!   suffix spliced onto the attribute's name the first time the attribute
//!   is seen (the raw authored name, prefix included, goes on a side ledger
//!   in order);
//! - comment, raw-text, and in-tag-but-not-a-value positions → the bare
//!   token.
//!
//! Invariants:
//! - Mode carries across fragment boundaries; the cursor does not.
//! - A bound attribute's name span always lies within the fragment where the
//!   binding starts, so suffix splicing is a single-fragment edit.
//! - Scanning never fails; unrecognized input stays in the current mode and
//!   flows through to the permissive parser.

use crate::marker::{marker, node_marker, BOUND_ATTR_SUFFIX};
use crate::result::{Statics, TemplateKind};
use memchr::memchr;

/// Scanner output: the annotated HTML and the ordered raw names of the
/// attribute bindings encountered.
#[derive(Debug)]
pub(crate) struct ScannedHtml {
    pub html: String,
    pub attr_names: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
enum Mode {
    Text,
    /// Inside an open tag. `raw` holds the element name when the tag opens a
    /// raw-text element, so `>` can switch into raw mode instead of text.
    Tag { raw: Option<&'static str> },
    DoubleQuoted,
    SingleQuoted,
    Comment,
    Raw(&'static str),
}

/// Where the most recent attribute of the current fragment stands when the
/// fragment runs out.
#[derive(Debug)]
enum AttrRun {
    /// No attribute is expecting a value at the boundary.
    None,
    /// `name=` (or `name=partial`, or `name="…` without a closing quote) ran
    /// into the boundary: the interpolation lands in the value. Holds the end
    /// of the name span within this fragment and the raw authored name.
    Bound { name_end: usize, name: String },
}

pub(crate) fn scan(kind: TemplateKind, strings: Statics) -> ScannedHtml {
    let mut out = String::new();
    let mut attr_names = Vec::new();
    let mut mode = Mode::Text;

    let last = strings.len() - 1;
    for (i, &fragment) in strings.iter().enumerate() {
        let attr_run = scan_fragment(fragment, &mut mode);
        if i == last {
            out.push_str(fragment);
            break;
        }
        match attr_run {
            AttrRun::Bound { name_end, name } => {
                out.push_str(&fragment[..name_end]);
                out.push_str(BOUND_ATTR_SUFFIX);
                out.push_str(&fragment[name_end..]);
                out.push_str(marker());
                attr_names.push(name);
            }
            AttrRun::None => {
                out.push_str(fragment);
                match mode {
                    Mode::Text => out.push_str(node_marker()),
                    _ => out.push_str(marker()),
                }
            }
        }
    }

    if kind == TemplateKind::Svg {
        out.insert_str(0, "<svg>");
        out.push_str("</svg>");
    }

    log::trace!(
        target: "tpl.scan",
        "scanned {} fragments into {} bytes, {} attribute bindings",
        strings.len(),
        out.len(),
        attr_names.len()
    );

    ScannedHtml {
        html: out,
        attr_names,
    }
}

/// Advance `mode` across one fragment and report the attribute standing at
/// its end.
fn scan_fragment(fragment: &str, mode: &mut Mode) -> AttrRun {
    let bytes = fragment.as_bytes();
    let mut cursor = 0;

    loop {
        if cursor >= bytes.len() {
            return AttrRun::None;
        }
        match *mode {
            Mode::Text => match find_text_exit(fragment, cursor) {
                Some(TextExit::CommentOpen { after }) => {
                    *mode = Mode::Comment;
                    cursor = after;
                }
                Some(TextExit::TagOpen { after, raw }) => {
                    *mode = Mode::Tag { raw };
                    cursor = after;
                }
                None => return AttrRun::None,
            },
            Mode::Tag { raw } => match scan_tag(fragment, cursor, raw, mode) {
                TagScan::Continue { at } => cursor = at,
                TagScan::Boundary(run) => return run,
            },
            Mode::DoubleQuoted => match memchr(b'"', &bytes[cursor..]) {
                Some(rel) => {
                    *mode = Mode::Tag { raw: None };
                    cursor += rel + 1;
                }
                None => return AttrRun::None,
            },
            Mode::SingleQuoted => match memchr(b'\'', &bytes[cursor..]) {
                Some(rel) => {
                    *mode = Mode::Tag { raw: None };
                    cursor += rel + 1;
                }
                None => return AttrRun::None,
            },
            Mode::Comment => match find_comment_close(bytes, cursor) {
                Some(after) => {
                    *mode = Mode::Text;
                    cursor = after;
                }
                None => return AttrRun::None,
            },
            Mode::Raw(name) => match find_raw_exit(bytes, cursor, name) {
                Some(after) => {
                    *mode = Mode::Tag { raw: None };
                    cursor = after;
                }
                None => return AttrRun::None,
            },
        }
    }
}

enum TextExit {
    CommentOpen {
        after: usize,
    },
    TagOpen {
        after: usize,
        raw: Option<&'static str>,
    },
}

/// Find the next `<` that opens a comment or a tag; `<` followed by anything
/// else stays text.
fn find_text_exit(fragment: &str, mut cursor: usize) -> Option<TextExit> {
    let bytes = fragment.as_bytes();
    loop {
        let rel = memchr(b'<', &bytes[cursor..])?;
        let lt = cursor + rel;
        if fragment[lt..].starts_with("<!--") {
            return Some(TextExit::CommentOpen { after: lt + 4 });
        }
        let rest = &bytes[lt + 1..];
        if rest.is_empty() {
            // `<` right before the boundary: the dynamic-tag-name position.
            return Some(TextExit::TagOpen {
                after: lt + 1,
                raw: None,
            });
        }
        let (is_tag, is_end_tag, name_at) = match rest[0] {
            b'/' => {
                if rest.len() == 1 {
                    return Some(TextExit::TagOpen {
                        after: lt + 2,
                        raw: None,
                    });
                }
                (rest[1].is_ascii_alphabetic(), true, lt + 2)
            }
            b if b.is_ascii_alphabetic() => (true, false, lt + 1),
            _ => (false, false, lt + 1),
        };
        if !is_tag {
            cursor = lt + 1;
            continue;
        }
        let mut name_end = name_at;
        while name_end < bytes.len() {
            let b = bytes[name_end];
            if b.is_ascii_whitespace() || b == b'>' || b == b'/' {
                break;
            }
            name_end += 1;
        }
        // Only a start tag can open raw-text content.
        let raw = if is_end_tag {
            None
        } else {
            raw_text_name(&fragment[name_at..name_end])
        };
        return Some(TextExit::TagOpen {
            after: name_end,
            raw,
        });
    }
}

fn raw_text_name(name: &str) -> Option<&'static str> {
    for candidate in ["script", "style", "textarea"] {
        if name.eq_ignore_ascii_case(candidate) {
            return Some(candidate);
        }
    }
    None
}

fn find_comment_close(bytes: &[u8], mut cursor: usize) -> Option<usize> {
    while cursor < bytes.len() {
        let rel = memchr(b'-', &bytes[cursor..])?;
        let at = cursor + rel;
        if bytes[at..].starts_with(b"-->") {
            return Some(at + 3);
        }
        cursor = at + 1;
    }
    None
}

/// Case-insensitive `</name`; the scanner re-enters tag mode there and lets
/// the tag scan consume the rest of the close tag.
fn find_raw_exit(bytes: &[u8], mut cursor: usize, name: &str) -> Option<usize> {
    let needle_len = 2 + name.len();
    loop {
        let rel = memchr(b'<', &bytes[cursor..])?;
        let at = cursor + rel;
        if at + needle_len <= bytes.len()
            && bytes[at + 1] == b'/'
            && bytes[at + 2..at + needle_len].eq_ignore_ascii_case(name.as_bytes())
        {
            return Some(at + needle_len);
        }
        cursor = at + 1;
    }
}

enum TagScan {
    /// The tag closed at `at`; the caller resumes in the updated mode.
    Continue { at: usize },
    /// The fragment ran out inside the tag.
    Boundary(AttrRun),
}

/// Scan attributes inside an open tag from `cursor` to either `>` or the end
/// of the fragment.
fn scan_tag(fragment: &str, mut cursor: usize, raw: Option<&'static str>, mode: &mut Mode) -> TagScan {
    let bytes = fragment.as_bytes();
    loop {
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor >= bytes.len() {
            return TagScan::Boundary(AttrRun::None);
        }
        match bytes[cursor] {
            b'>' => {
                *mode = match raw {
                    Some(name) => Mode::Raw(name),
                    None => Mode::Text,
                };
                return TagScan::Continue { at: cursor + 1 };
            }
            b'/' | b'=' | b'"' | b'\'' => {
                // Solidus, stray equals, or stray quote outside a value.
                cursor += 1;
            }
            _ => {
                let name_start = cursor;
                while cursor < bytes.len() {
                    let b = bytes[cursor];
                    if b.is_ascii_whitespace() || matches!(b, b'>' | b'/' | b'=' | b'"' | b'\'') {
                        break;
                    }
                    cursor += 1;
                }
                let name_end = cursor;
                while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                if cursor >= bytes.len() {
                    // Ends after a value-less attribute name: not a value
                    // position.
                    return TagScan::Boundary(AttrRun::None);
                }
                if bytes[cursor] != b'=' {
                    continue;
                }
                cursor += 1;
                while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                let name = fragment[name_start..name_end].to_string();
                if cursor >= bytes.len() {
                    return TagScan::Boundary(AttrRun::Bound { name_end, name });
                }
                match bytes[cursor] {
                    quote @ (b'"' | b'\'') => match memchr(quote, &bytes[cursor + 1..]) {
                        Some(rel) => cursor += rel + 2,
                        None => {
                            *mode = if quote == b'"' {
                                Mode::DoubleQuoted
                            } else {
                                Mode::SingleQuoted
                            };
                            return TagScan::Boundary(AttrRun::Bound { name_end, name });
                        }
                    },
                    _ => {
                        // Unquoted value runs to whitespace or `>`.
                        while cursor < bytes.len()
                            && !bytes[cursor].is_ascii_whitespace()
                            && bytes[cursor] != b'>'
                        {
                            cursor += 1;
                        }
                        if cursor >= bytes.len() {
                            return TagScan::Boundary(AttrRun::Bound { name_end, name });
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_strings(strings: Statics) -> ScannedHtml {
        scan(TemplateKind::Html, strings)
    }

    #[test]
    fn text_position_gets_the_node_marker() {
        let scanned = scan_strings(&["<div>", "</div>"]);
        assert_eq!(
            scanned.html,
            format!("<div>{}</div>", node_marker())
        );
        assert!(scanned.attr_names.is_empty());
    }

    #[test]
    fn attribute_value_position_splices_the_suffix() {
        let scanned = scan_strings(&["<div a=", "></div>"]);
        assert_eq!(
            scanned.html,
            format!("<div a{suffix}={m}></div>", suffix = BOUND_ATTR_SUFFIX, m = marker())
        );
        assert_eq!(scanned.attr_names, vec!["a"]);
    }

    #[test]
    fn quoted_run_pushes_the_name_once() {
        let scanned = scan_strings(&["<div a=\"x ", " ", "\"></div>"]);
        assert_eq!(
            scanned.html,
            format!(
                "<div a{suffix}=\"x {m} {m}\"></div>",
                suffix = BOUND_ATTR_SUFFIX,
                m = marker()
            )
        );
        assert_eq!(scanned.attr_names, vec!["a"]);
    }

    #[test]
    fn prefixed_names_keep_their_prefix_in_the_ledger() {
        let scanned = scan_strings(&["<input .value=", " ?disabled=", " @change=", ">"]);
        assert_eq!(scanned.attr_names, vec![".value", "?disabled", "@change"]);
        assert!(scanned.html.contains(&format!(".value{BOUND_ATTR_SUFFIX}")));
        assert!(scanned.html.contains(&format!("?disabled{BOUND_ATTR_SUFFIX}")));
    }

    #[test]
    fn comment_position_gets_the_bare_marker() {
        let scanned = scan_strings(&["<!-- ", " -->"]);
        assert_eq!(scanned.html, format!("<!-- {} -->", marker()));
    }

    #[test]
    fn raw_text_position_gets_the_bare_marker() {
        let scanned = scan_strings(&["<script>a=", ";</script>"]);
        assert_eq!(
            scanned.html,
            format!("<script>a={};</script>", marker())
        );
    }

    #[test]
    fn raw_mode_survives_tag_like_content() {
        let scanned = scan_strings(&["<script>if (a<b) x('<div>');", "</script>"]);
        assert_eq!(
            scanned.html,
            format!("<script>if (a<b) x('<div>');{}</script>", marker())
        );
    }

    #[test]
    fn attribute_binding_on_a_raw_text_element() {
        let scanned = scan_strings(&["<script src=", "></script>"]);
        assert!(scanned
            .html
            .starts_with(&format!("<script src{BOUND_ATTR_SUFFIX}={}", marker())));
        assert_eq!(scanned.attr_names, vec!["src"]);
    }

    #[test]
    fn in_tag_non_value_position_gets_the_bare_marker() {
        let scanned = scan_strings(&["<div ", ">"]);
        assert_eq!(scanned.html, format!("<div {}>", marker()));
        assert!(scanned.attr_names.is_empty());
    }

    #[test]
    fn dynamic_tag_name_position_gets_the_bare_marker() {
        let scanned = scan_strings(&["<", "></div>"]);
        assert_eq!(scanned.html, format!("<{}></div>", marker()));
    }

    #[test]
    fn value_less_attribute_before_boundary_is_not_a_binding() {
        let scanned = scan_strings(&["<div hidden ", ">"]);
        assert_eq!(scanned.html, format!("<div hidden {}>", marker()));
        assert!(scanned.attr_names.is_empty());
    }

    #[test]
    fn unquoted_partial_value_still_binds_the_attribute() {
        let scanned = scan_strings(&["<div a=b", ">"]);
        assert_eq!(
            scanned.html,
            format!("<div a{BOUND_ATTR_SUFFIX}=b{}>", marker())
        );
        assert_eq!(scanned.attr_names, vec!["a"]);
    }

    #[test]
    fn svg_output_is_wrapped() {
        let scanned = scan(TemplateKind::Svg, &["<circle r=\"4\"/>"]);
        assert_eq!(scanned.html, "<svg><circle r=\"4\"/></svg>");
    }

    #[test]
    fn text_after_a_closed_tag_is_text_again() {
        let scanned = scan_strings(&["<div a=\"v\">", "</div>"]);
        assert_eq!(
            scanned.html,
            format!("<div a=\"v\">{}</div>", node_marker())
        );
    }

    #[test]
    fn lone_angle_bracket_stays_text() {
        let scanned = scan_strings(&["1 < 2 and ", " more"]);
        assert_eq!(
            scanned.html,
            format!("1 < 2 and {} more", node_marker())
        );
    }
}
