//! DOM templating engine: tag macros produce template results, each unique
//! literal set compiles once into a prototype fragment with sentinel
//! markers, and every render either stamps a new instance or updates the
//! previous one in place, writing only the leaves whose values changed.
//!
//! ```
//! use dom::{inner_html, Document};
//! use tpl::{html, render};
//!
//! let mut doc = Document::new();
//! let body = doc.create_fragment();
//! let name = "world";
//! render(&mut doc, html!("<p>hello " {name} "</p>"), body);
//! // Serialized output carries the engine's marker comments alongside the
//! // committed text.
//! let p = doc.query_element(body, "p").unwrap();
//! assert!(inner_html(&doc, p).starts_with("hello "));
//! assert!(inner_html(&doc, p).ends_with("world"));
//! ```

mod cache;
mod instance;
mod marker;
mod part;
mod render;
mod result;
mod scan;
mod template;
mod value;

pub use crate::cache::cached_template_count;
pub use crate::render::{detach_root, render, render_with_options, root_anchor, RenderOptions};
pub use crate::result::{Statics, StringsKey, TemplateKind, TemplateResult};
pub use crate::value::{Value, NOTHING, NO_CHANGE};

use std::sync::Mutex;

static VERSIONS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

/// Record this crate's version in the process-wide registry. Called on first
/// engine use; a second distinct version means two incompatible copies are
/// loaded, which breaks marker and cache sharing.
pub(crate) fn register_version() {
    let mut versions = VERSIONS.lock().expect("version registry poisoned");
    let version = env!("CARGO_PKG_VERSION");
    if !versions.contains(&version) {
        versions.push(version);
    }
    if versions.len() > 1 {
        log::warn!(
            target: "tpl.render",
            "multiple template engine versions loaded: {versions:?}"
        );
    }
}

/// Engine versions seen in this process. Diagnostics only; not on any hot
/// path.
pub fn versions() -> Vec<&'static str> {
    VERSIONS.lock().expect("version registry poisoned").clone()
}
