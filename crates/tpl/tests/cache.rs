//! Template cache behavior observed through renders.
//!
//! The cache is thread-local and every `#[test]` runs on its own thread, so
//! counts observed here are isolated per test.

use dom::{Document, NodeId};
use tpl::{cached_template_count, html, render};
use tpl_test_support::assert_rendered;

fn setup() -> (Document, NodeId) {
    let mut doc = Document::new();
    let container = doc.create_fragment();
    (doc, container)
}

#[test]
fn re_rendering_a_literal_compiles_it_once() {
    let (mut doc, container) = setup();
    let make = |n: i64| html!("<div>" {n} "</div>");
    let before = cached_template_count();
    render(&mut doc, make(1), container);
    assert_eq!(cached_template_count(), before + 1);
    render(&mut doc, make(2), container);
    render(&mut doc, make(3), container);
    assert_eq!(cached_template_count(), before + 1);
    assert_rendered(&doc, container, "<div>3</div>");
}

#[test]
fn each_distinct_literal_compiles_separately() {
    let (mut doc, container) = setup();
    let before = cached_template_count();
    render(&mut doc, html!("<div></div>"), container);
    render(&mut doc, html!("<span></span>"), container);
    render(&mut doc, html!("<div></div>"), container);
    assert_eq!(cached_template_count(), before + 3);
}

#[test]
fn templates_are_shared_across_containers_and_documents() {
    let make = |n: i64| html!("<p>" {n} "</p>");
    let before = cached_template_count();

    let (mut doc_a, container_a) = setup();
    render(&mut doc_a, make(1), container_a);

    let (mut doc_b, container_b) = setup();
    render(&mut doc_b, make(2), container_b);

    assert_eq!(cached_template_count(), before + 1);
    assert_rendered(&doc_a, container_a, "<p>1</p>");
    assert_rendered(&doc_b, container_b, "<p>2</p>");
}

#[test]
fn nested_literals_compile_once_each() {
    let (mut doc, container) = setup();
    let inner = |x: &str| html!("<b>" {x} "</b>");
    let outer = |v: tpl::Value| html!("<div>" {v} "</div>");
    let before = cached_template_count();
    render(&mut doc, outer(inner("x").into()), container);
    render(&mut doc, outer(inner("y").into()), container);
    assert_eq!(cached_template_count(), before + 2);
}
