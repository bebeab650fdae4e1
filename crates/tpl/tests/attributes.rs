//! Attribute, boolean-attribute, and property bindings.

use dom::{Document, NodeId, PropValue};
use tpl::{html, render, Value};
use tpl_test_support::assert_rendered;

fn setup() -> (Document, NodeId) {
    let mut doc = Document::new();
    let container = doc.create_fragment();
    (doc, container)
}

#[test]
fn interpolated_attribute_concatenates_segments() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div a=\"" {"x"} " " {"y"} "\"></div>"),
        container,
    );
    assert_rendered(&doc, container, "<div a=\"x y\"></div>");
}

#[test]
fn boolean_bindings_toggle_attribute_presence() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div ?hidden=" {false} " ?open=" {true} "></div>"),
        container,
    );
    assert_rendered(&doc, container, "<div open=\"\"></div>");
}

#[test]
fn boolean_binding_updates_both_ways() {
    let (mut doc, container) = setup();
    let make = |open: bool| html!("<div ?open=" {open} "></div>");
    render(&mut doc, make(true), container);
    assert_rendered(&doc, container, "<div open=\"\"></div>");
    render(&mut doc, make(false), container);
    assert_rendered(&doc, container, "<div></div>");
}

#[test]
fn property_binding_writes_the_element_property() {
    let (mut doc, container) = setup();
    render(&mut doc, html!("<div .foo=" {123} "></div>"), container);
    let div = doc.query_element(container, "div").unwrap();
    assert_eq!(doc.property(div, "foo"), Some(&PropValue::Int(123)));
    // Properties never serialize.
    assert_rendered(&doc, container, "<div></div>");
}

#[test]
fn property_names_are_case_preserving() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div .fooBar=" {"v"} "></div>"),
        container,
    );
    let div = doc.query_element(container, "div").unwrap();
    assert_eq!(
        doc.property(div, "fooBar"),
        Some(&PropValue::Str("v".to_string()))
    );
}

#[test]
fn attribute_names_keep_authored_case() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<svg viewBox=\"0 0 " {100} " " {100} "\"></svg>"),
        container,
    );
    let svg = doc.query_element(container, "svg").unwrap();
    assert_eq!(doc.namespace(svg), Some(dom::Namespace::Svg));
    assert_eq!(doc.attribute(svg, "viewBox"), Some("0 0 100 100"));
    assert_rendered(&doc, container, "<svg viewBox=\"0 0 100 100\"></svg>");
}

#[test]
fn null_coerces_to_empty_attribute_value() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div a=" {Value::Null} "></div>"),
        container,
    );
    assert_rendered(&doc, container, "<div a=\"\"></div>");
}

#[test]
fn numbers_and_bools_stringify_in_attribute_position() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div a=" {1.5} " b=" {true} "></div>"),
        container,
    );
    assert_rendered(&doc, container, "<div a=\"1.5\" b=\"true\"></div>");
}

#[test]
fn unquoted_value_prefix_joins_the_interpolation() {
    let (mut doc, container) = setup();
    render(&mut doc, html!("<div a=b" {"c"} "></div>"), container);
    assert_rendered(&doc, container, "<div a=\"bc\"></div>");
}

#[test]
fn single_quoted_values_bind_too() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div a='l " {"x"} " r'></div>"),
        container,
    );
    assert_rendered(&doc, container, "<div a=\"l x r\"></div>");
}

#[test]
fn event_prefix_is_reserved_and_inert() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<button @click=" {"handler"} " title=" {"t"} "></button>"),
        container,
    );
    // The event binding writes nothing, but the following binding still
    // receives its own value.
    assert_rendered(&doc, container, "<button title=\"t\"></button>");
}

#[test]
fn attribute_dirty_check_skips_equal_primitives() {
    let (mut doc, container) = setup();
    let make = |v: &str| html!("<div a=" {v} "></div>");
    render(&mut doc, make("same"), container);
    let div = doc.query_element(container, "div").unwrap();
    // Remove behind the part's back: an equal value must not re-write.
    doc.remove_attribute(div, "a");
    render(&mut doc, make("same"), container);
    assert_eq!(doc.attribute(div, "a"), None);
    render(&mut doc, make("changed"), container);
    assert_eq!(doc.attribute(div, "a"), Some("changed"));
}

#[test]
fn multiple_bindings_on_one_element_stay_ordered() {
    let (mut doc, container) = setup();
    render(
        &mut doc,
        html!("<div a=" {"1"} " b=\"l " {"2"} "\" ?c=" {true} " .d=" {4} "></div>"),
        container,
    );
    let div = doc.query_element(container, "div").unwrap();
    assert_eq!(doc.attribute(div, "a"), Some("1"));
    assert_eq!(doc.attribute(div, "b"), Some("l 2"));
    assert_eq!(doc.attribute(div, "c"), Some(""));
    assert_eq!(doc.property(div, "d"), Some(&PropValue::Int(4)));
}
