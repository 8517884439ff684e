//! Property-based tests for rendering using proptest.

use proptest::prelude::*;
use serde_json::json;
use stache::{parse, ContextStack, Renderer, Value};

// ============================================================================
// Strategies
// ============================================================================

/// Text that contains no tag delimiters.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 \t\r\n.,;:!?<>&\"'()|=#^/-]{0,80}"
}

/// Template-like text built from tag fragments, which may or may not parse.
fn tag_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("{{".to_string()),
            Just("}}".to_string()),
            Just("{{#a}}".to_string()),
            Just("{{/a}}".to_string()),
            Just("{{^b}}".to_string()),
            Just("{{/b}}".to_string()),
            Just("{{!c}}".to_string()),
            Just("{{=<% %>=}}".to_string()),
            Just("{{>p}}".to_string()),
            Just("\n".to_string()),
            "[a-z ]{0,5}",
        ],
        0..20,
    )
    .prop_map(|parts| parts.concat())
}

/// Well-formed templates over the names `a`, `b` and `xs`.
fn template() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z ]{0,6}",
        Just("{{a}}".to_string()),
        Just("{{{b}}}".to_string()),
        Just("{{.}}".to_string()),
        Just("{{! note }}".to_string()),
        Just("\n".to_string()),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::sample::select(vec!["#", "^"]),
            prop::sample::select(vec!["a", "b", "xs"]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(sigil, name, body)| {
                format!("{{{{{sigil}{name}}}}}{}{{{{/{name}}}}}", body.concat())
            })
    })
}

fn data() -> impl Strategy<Value = serde_json::Value> {
    (
        "[a-z<>&]{0,6}",
        any::<bool>(),
        prop::collection::vec(any::<i32>(), 0..4),
    )
        .prop_map(|(a, b, xs)| json!({"a": a, "b": b, "xs": xs}))
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Text without tags renders to itself.
    #[test]
    fn plain_text_renders_to_itself(text in plain_text()) {
        prop_assert_eq!(stache::render(&text, &json!({})).unwrap(), text);
    }

    /// Parsing the same input twice gives the same result, success or error.
    #[test]
    fn parsing_is_deterministic(source in tag_soup()) {
        prop_assert_eq!(parse(&source), parse(&source));
    }

    /// Well-formed templates render, and render identically every time.
    #[test]
    fn rendering_is_repeatable(source in template(), data in data()) {
        let renderer = Renderer::new();
        let first = renderer.render(&source, &data);
        prop_assert!(first.is_ok(), "{:?} failed: {:?}", source, first);
        prop_assert_eq!(first.ok(), renderer.render(&source, &data).ok());
    }

    /// After a section, `.` names the frame that was on top before it.
    #[test]
    fn sections_restore_the_stack(xs in prop::collection::vec(any::<u16>(), 0..10)) {
        let mut stack = ContextStack::new();
        stack.push(Value::from(json!({"xs": xs.clone()})));
        stack.push("TOP");

        let out = Renderer::new()
            .render_stack("{{#xs}}{{.}},{{/xs}}|{{.}}", &stack)
            .unwrap();

        let expected: String = xs.iter().map(|x| format!("{x},")).collect();
        prop_assert_eq!(out, format!("{expected}|TOP"));
    }
}
