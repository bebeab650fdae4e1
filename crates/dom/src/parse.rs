//! Permissive single-pass HTML fragment parser.
//!
//! This parser exists to materialize inert template fragments, so it favors
//! predictable, browser-shaped recovery over HTML5 completeness:
//! - Tag and attribute names are canonicalized to ASCII lowercase; any
//!   non-delimiter byte is accepted in a name (markers like `a$x$` survive).
//! - `<!--…-->` is a comment; `<!…>` and `<?…>` are bogus comments (for
//!   `<?name>` the comment data keeps the leading `?`).
//! - Raw-text elements (`script`, `style`, `textarea`) swallow everything up
//!   to their matching close tag as one verbatim text node.
//! - End tags pop to the nearest matching open element and are ignored when
//!   nothing matches.
//! - Parsing never fails; unterminated constructs close at end of input.

use crate::entities::decode_entities;
use crate::types::{Document, Namespace, NodeId, NodeKind};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(crate) fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "textarea")
}

/// Find the end of a raw-text run: the byte offset of `</name`, plus the
/// offset just past the closing `>`. Case-insensitive; ASCII whitespace is
/// allowed between the name and `>`.
fn find_raw_text_close(haystack: &[u8], name: &str) -> Option<(usize, usize)> {
    let mut i = 0;
    while i < haystack.len() {
        let rel = memchr(b'<', &haystack[i..])?;
        i += rel;
        let tail = &haystack[i..];
        if tail.len() > name.len() + 2
            && tail[1] == b'/'
            && tail[2..2 + name.len()].eq_ignore_ascii_case(name.as_bytes())
        {
            let mut k = i + 2 + name.len();
            while k < haystack.len() && haystack[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < haystack.len() && haystack[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Parse `html` into a fresh fragment node. Children at the top level take
/// `namespace` as their context.
pub fn parse_fragment(doc: &mut Document, html: &str, namespace: Namespace) -> NodeId {
    let root = doc.create_fragment();
    let mut parser = Parser {
        doc,
        bytes: html.as_bytes(),
        source: html,
        cursor: 0,
        root,
        context: namespace,
        open: Vec::new(),
    };
    parser.run();
    log::trace!(
        target: "dom.parse",
        "parsed fragment: {} bytes, {} top-level nodes",
        html.len(),
        doc.children(root).len()
    );
    root
}

struct Parser<'d, 's> {
    doc: &'d mut Document,
    bytes: &'s [u8],
    source: &'s str,
    cursor: usize,
    root: NodeId,
    context: Namespace,
    open: Vec<NodeId>,
}

impl Parser<'_, '_> {
    fn run(&mut self) {
        while self.cursor < self.bytes.len() {
            let Some(rel) = memchr(b'<', &self.bytes[self.cursor..]) else {
                self.flush_text(self.bytes.len());
                break;
            };
            let lt = self.cursor + rel;
            // `<` at end of input is literal text.
            if lt + 1 >= self.bytes.len() {
                self.flush_text(self.bytes.len());
                break;
            }
            match self.bytes[lt + 1] {
                b'!' => {
                    self.flush_text(lt);
                    self.markup_declaration(lt);
                }
                b'?' => {
                    self.flush_text(lt);
                    self.bogus_comment(lt + 1);
                }
                b'/' => {
                    self.flush_text(lt);
                    self.end_tag(lt);
                }
                b if b.is_ascii_alphabetic() => {
                    self.flush_text(lt);
                    self.start_tag(lt);
                }
                _ => {
                    // Not a tag; the `<` is literal text. Emit through it and
                    // keep scanning after it.
                    self.flush_text(lt + 1);
                }
            }
        }
    }

    /// Emit the pending text run `[cursor..end)` and leave the cursor at
    /// `end`. Adjacent runs merge into one text node, as a browser parse
    /// would produce.
    fn flush_text(&mut self, end: usize) {
        if end > self.cursor {
            let decoded = decode_entities(&self.source[self.cursor..end]);
            if !decoded.is_empty() {
                let parent = self.parent();
                match self.doc.last_child(parent) {
                    Some(last) if matches!(self.doc.kind(last), NodeKind::Text { .. }) => {
                        let merged = format!("{}{}", self.doc.text(last), decoded);
                        self.doc.set_text(last, &merged);
                    }
                    _ => {
                        let text = self.doc.create_text(&decoded);
                        self.doc.append_child(parent, text);
                    }
                }
            }
        }
        self.cursor = end;
    }

    fn parent(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.root)
    }

    fn parent_namespace(&self) -> Namespace {
        self.open
            .last()
            .and_then(|&el| self.doc.namespace(el))
            .unwrap_or(self.context)
    }

    fn markup_declaration(&mut self, lt: usize) {
        if self.source[lt..].starts_with(COMMENT_START) {
            let data_start = lt + COMMENT_START.len();
            let (data_end, next) = match find_subslice(&self.bytes[data_start..], COMMENT_END) {
                Some(rel) => (data_start + rel, data_start + rel + COMMENT_END.len()),
                None => (self.bytes.len(), self.bytes.len()),
            };
            let comment = self
                .doc
                .create_comment(&self.source[data_start..data_end]);
            let parent = self.parent();
            self.doc.append_child(parent, comment);
            self.cursor = next;
        } else {
            // `<!…>` without `--`: bogus comment, data starts after `<!`.
            self.bogus_comment(lt + 2);
        }
    }

    /// Bogus comment: data runs from `data_start` up to the next `>`.
    fn bogus_comment(&mut self, data_start: usize) {
        let (data_end, next) = match memchr(b'>', &self.bytes[data_start..]) {
            Some(rel) => (data_start + rel, data_start + rel + 1),
            None => (self.bytes.len(), self.bytes.len()),
        };
        let comment = self.doc.create_comment(&self.source[data_start..data_end]);
        let parent = self.parent();
        self.doc.append_child(parent, comment);
        self.cursor = next;
    }

    fn end_tag(&mut self, lt: usize) {
        let name_start = lt + 2;
        if name_start >= self.bytes.len() || !self.bytes[name_start].is_ascii_alphabetic() {
            // `</>` and `</!…>` carry no tag name; drop through the next `>`.
            let next = match memchr(b'>', &self.bytes[name_start..]) {
                Some(rel) => name_start + rel + 1,
                None => self.bytes.len(),
            };
            self.cursor = next;
            return;
        }
        let name_end = scan_name(self.bytes, name_start);
        let name = self.source[name_start..name_end].to_ascii_lowercase();
        let next = match memchr(b'>', &self.bytes[name_end..]) {
            Some(rel) => name_end + rel + 1,
            None => self.bytes.len(),
        };
        self.cursor = next;

        // Ignore the end tag unless a matching element is open.
        if self
            .open
            .iter()
            .any(|&el| self.doc.element_name(el) == Some(&name))
        {
            while let Some(el) = self.open.pop() {
                if self.doc.element_name(el) == Some(&name) {
                    break;
                }
            }
        }
    }

    fn start_tag(&mut self, lt: usize) {
        let name_start = lt + 1;
        let name_end = scan_name(self.bytes, name_start);
        let name = self.source[name_start..name_end].to_ascii_lowercase();

        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;
        let mut i = name_end;

        loop {
            while i < self.bytes.len() && self.bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= self.bytes.len() {
                break;
            }
            match self.bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    if self.bytes.get(i + 1) == Some(&b'>') {
                        self_closing = true;
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                b'=' => {
                    // Stray `=` before any attribute name; skip it.
                    i += 1;
                }
                _ => {
                    let (attr, after) = self.scan_attribute(i);
                    if let Some((attr_name, attr_value)) = attr {
                        if !attributes.iter().any(|(k, _)| *k == attr_name) {
                            attributes.push((attr_name, attr_value));
                        }
                    }
                    i = after;
                }
            }
        }
        self.cursor = i;

        let namespace = if name == "svg" {
            Namespace::Svg
        } else {
            self.parent_namespace()
        };
        let element = self.doc.create_element_ns(&name, namespace);
        {
            let parent = self.parent();
            self.doc.append_child(parent, element);
        }
        for (k, v) in attributes {
            self.doc.set_attribute(element, &k, &v);
        }

        if self_closing || is_void_element(&name) {
            return;
        }
        if is_raw_text_element(&name) {
            self.raw_text(element, &name);
            return;
        }
        self.open.push(element);
    }

    fn raw_text(&mut self, element: NodeId, name: &str) {
        let start = self.cursor;
        let (content_end, next) = match find_raw_text_close(&self.bytes[start..], name) {
            Some((rel_end, rel_next)) => (start + rel_end, start + rel_next),
            None => (self.bytes.len(), self.bytes.len()),
        };
        if content_end > start {
            let text = self.doc.create_text(&self.source[start..content_end]);
            self.doc.append_child(element, text);
        }
        self.cursor = next;
    }

    /// Scan one attribute starting at a non-delimiter byte. Returns the parsed
    /// pair (if the name is non-empty) and the offset after the attribute.
    fn scan_attribute(&self, start: usize) -> (Option<(String, String)>, usize) {
        let name_end = scan_attr_name(self.bytes, start);
        let name = self.source[start..name_end].to_ascii_lowercase();
        let mut i = name_end;
        while i < self.bytes.len() && self.bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= self.bytes.len() || self.bytes[i] != b'=' {
            if name.is_empty() {
                // Defensive: caller guarantees a non-delimiter byte, but do
                // not loop forever on one we cannot consume.
                return (None, start + 1);
            }
            return (Some((name, String::new())), name_end);
        }
        i += 1;
        while i < self.bytes.len() && self.bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= self.bytes.len() {
            return (Some((name, String::new())), i);
        }
        let (raw_value, after) = match self.bytes[i] {
            quote @ (b'"' | b'\'') => {
                let value_start = i + 1;
                match memchr(quote, &self.bytes[value_start..]) {
                    Some(rel) => (
                        &self.source[value_start..value_start + rel],
                        value_start + rel + 1,
                    ),
                    None => (&self.source[value_start..], self.bytes.len()),
                }
            }
            _ => {
                let mut end = i;
                while end < self.bytes.len()
                    && !self.bytes[end].is_ascii_whitespace()
                    && self.bytes[end] != b'>'
                {
                    end += 1;
                }
                (&self.source[i..end], end)
            }
        };
        let value = decode_entities(raw_value).into_owned();
        (Some((name, value)), after)
    }
}

/// Tag name: first byte is alphabetic (checked by the caller), then anything
/// up to whitespace, `/` or `>`.
fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() || b == b'/' || b == b'>' {
            break;
        }
        i += 1;
    }
    i
}

/// Attribute name: anything up to whitespace, `=`, `/` or `>`.
fn scan_attr_name(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() || b == b'=' || b == b'>' {
            break;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'>') {
            break;
        }
        i += 1;
    }
    i
}

fn find_subslice(haystack: &[u8], needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    let first = needle[0];
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        let rel = memchr(first, &haystack[i..])?;
        i += rel;
        if i + needle.len() > haystack.len() {
            return None;
        }
        if &haystack[i..i + needle.len()] == needle {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::inner_html;
    use crate::types::NodeKind;

    fn parse(html: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = parse_fragment(&mut doc, html, Namespace::Html);
        (doc, root)
    }

    #[test]
    fn parses_nested_elements_and_text() {
        let (doc, root) = parse("<div><p>hello</p> tail</div>");
        assert_eq!(inner_html(&doc, root), "<div><p>hello</p> tail</div>");
    }

    #[test]
    fn lowercases_tag_and_attribute_names() {
        let (doc, root) = parse("<DIV Class=\"x\"></DIV>");
        let div = doc.query_element(root, "div").unwrap();
        assert_eq!(doc.attribute(div, "class"), Some("x"));
    }

    #[test]
    fn accepts_marker_shaped_names() {
        let (doc, root) = parse("<div a$lit$=\"v\" tpl$0af3$></div>");
        let div = doc.query_element(root, "div").unwrap();
        assert_eq!(doc.attribute(div, "a$lit$"), Some("v"));
        assert_eq!(doc.attribute(div, "tpl$0af3$"), Some(""));
    }

    #[test]
    fn attribute_value_styles() {
        let (doc, root) = parse("<div a=\"1\" b='2' c=3 d></div>");
        let div = doc.query_element(root, "div").unwrap();
        assert_eq!(doc.attribute(div, "a"), Some("1"));
        assert_eq!(doc.attribute(div, "b"), Some("2"));
        assert_eq!(doc.attribute(div, "c"), Some("3"));
        assert_eq!(doc.attribute(div, "d"), Some(""));
    }

    #[test]
    fn comment_and_bogus_comment_forms() {
        let (doc, root) = parse("a<!-- note -->b<?pi-target>c<!bang>");
        let kinds: Vec<String> = doc
            .children(root)
            .iter()
            .map(|&n| match doc.kind(n) {
                NodeKind::Text { text } => format!("t:{text}"),
                NodeKind::Comment { text } => format!("c:{text}"),
                _ => "other".to_string(),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["t:a", "c: note ", "t:b", "c:?pi-target", "t:c", "c:bang"]
        );
    }

    #[test]
    fn processing_instruction_form_keeps_question_mark() {
        let (doc, root) = parse("<?tpl$0000$>");
        let only = doc.children(root)[0];
        assert_eq!(doc.text(only), "?tpl$0000$");
    }

    #[test]
    fn raw_text_content_is_verbatim() {
        let (doc, root) = parse("<script>if (a < b) { x(\"<div>\"); }</script>");
        let script = doc.query_element(root, "script").unwrap();
        assert_eq!(doc.children(script).len(), 1);
        assert_eq!(
            doc.text(doc.children(script)[0]),
            "if (a < b) { x(\"<div>\"); }"
        );
    }

    #[test]
    fn raw_text_close_tag_is_case_insensitive() {
        let (doc, root) = parse("<style>.a{}</STYLE >tail");
        let style = doc.query_element(root, "style").unwrap();
        assert_eq!(doc.text(doc.children(style)[0]), ".a{}");
        let last = *doc.children(root).last().unwrap();
        assert_eq!(doc.text(last), "tail");
    }

    #[test]
    fn unterminated_raw_text_runs_to_end_of_input() {
        let (doc, root) = parse("<textarea>left open");
        let textarea = doc.query_element(root, "textarea").unwrap();
        assert_eq!(doc.text(doc.children(textarea)[0]), "left open");
    }

    #[test]
    fn void_elements_take_no_children() {
        let (doc, root) = parse("<div><br>text<img src=\"x\">more</div>");
        let div = doc.query_element(root, "div").unwrap();
        assert_eq!(doc.children(div).len(), 4);
        let br = doc.children(div)[0];
        assert_eq!(doc.element_name(br), Some("br"));
        assert!(doc.children(br).is_empty());
    }

    #[test]
    fn unmatched_end_tag_is_ignored() {
        let (doc, root) = parse("<div>a</span>b</div>");
        assert_eq!(inner_html(&doc, root), "<div>ab</div>");
    }

    #[test]
    fn end_tag_pops_to_nearest_match() {
        let (doc, root) = parse("<div><span>a</div>after");
        // The stray </div> closes both the span and the div.
        assert_eq!(inner_html(&doc, root), "<div><span>a</span></div>after");
    }

    #[test]
    fn svg_subtree_switches_namespace() {
        let (doc, root) = parse("<div></div><svg><rect/></svg>");
        let div = doc.query_element(root, "div").unwrap();
        let svg = doc.query_element(root, "svg").unwrap();
        let rect = doc.query_element(svg, "rect").unwrap();
        assert_eq!(doc.namespace(div), Some(Namespace::Html));
        assert_eq!(doc.namespace(svg), Some(Namespace::Svg));
        assert_eq!(doc.namespace(rect), Some(Namespace::Svg));
    }

    #[test]
    fn entities_decode_in_text_and_attribute_values() {
        let (doc, root) = parse("<div title=\"a &amp; b\">x &lt; y</div>");
        let div = doc.query_element(root, "div").unwrap();
        assert_eq!(doc.attribute(div, "title"), Some("a & b"));
        let text = doc.children(div)[0];
        assert_eq!(doc.text(text), "x < y");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let (doc, root) = parse("1 < 2");
        assert_eq!(doc.children(root).len(), 1);
        assert_eq!(doc.text(doc.children(root)[0]), "1 < 2");
    }
}
