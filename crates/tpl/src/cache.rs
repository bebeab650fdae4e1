//! Process-wide template cache, keyed by strings identity.
//!
//! The engine is single-threaded cooperative; the cache is thread-local so
//! lookups and inserts never synchronize. A literal set compiles at most
//! once; every later render with the same identity reuses the compiled
//! template.

use crate::result::{StringsKey, TemplateResult};
use crate::template::{compile, Template};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static CACHE: RefCell<HashMap<StringsKey, Rc<Template>>> = RefCell::new(HashMap::new());
}

/// Look up (or compile) the template for a result's literal set. Tag kind is
/// not part of the key; identity of the static fragments is.
pub(crate) fn template_for(result: &TemplateResult) -> Rc<Template> {
    let key = result.strings_key();
    if let Some(hit) = CACHE.with(|cache| cache.borrow_mut().get(&key).cloned()) {
        return hit;
    }
    // Compile outside the borrow: nested results inside the values do not
    // compile here, but keeping the borrow narrow costs nothing and keeps
    // the cache re-entrant.
    let template = Rc::new(compile(result.kind(), result.strings()));
    log::trace!(
        target: "tpl.compile",
        "template cache miss: {} fragments, {} parts",
        result.strings().len(),
        template.parts.len()
    );
    CACHE.with(|cache| {
        Rc::clone(
            cache
                .borrow_mut()
                .entry(key)
                .or_insert(template),
        )
    })
}

/// Number of compiled templates cached on this thread.
pub fn cached_template_count() -> usize {
    CACHE.with(|cache| cache.borrow().len())
}
