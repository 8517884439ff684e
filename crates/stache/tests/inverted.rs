//! Inverted section tags: `{{^name}}...{{/name}}`.

use serde_json::json;
use stache::{Error, MissingTags, Renderer};

fn render(template: &str, data: serde_json::Value) -> String {
    stache::render(template, &data).unwrap()
}

#[test]
fn falsey_renders_body() {
    let template = "\"{{^boolean}}This should be rendered.{{/boolean}}\"";
    assert_eq!(render(template, json!({"boolean": false})), "\"This should be rendered.\"");
    assert_eq!(render(template, json!({"boolean": null})), "\"This should be rendered.\"");
}

#[test]
fn truthy_skips_body() {
    assert_eq!(
        render("\"{{^boolean}}This should not be rendered.{{/boolean}}\"", json!({"boolean": true})),
        "\"\""
    );
}

#[test]
fn zero_is_truthy() {
    assert_eq!(render("[{{^n}}none{{/n}}]", json!({"n": 0})), "[]");
}

#[test]
fn map_context_is_truthy() {
    assert_eq!(
        render("\"{{^context}}Found key 'context'!{{/context}}\"", json!({"context": {"name": "Joe"}})),
        "\"\""
    );
}

#[test]
fn lists() {
    assert_eq!(
        render("\"{{^list}}{{n}}{{/list}}\"", json!({"list": [{"n": 1}, {"n": 2}, {"n": 3}]})),
        "\"\""
    );
    assert_eq!(
        render("\"{{^list}}Yay lists!{{/list}}\"", json!({"list": []})),
        "\"Yay lists!\""
    );
}

#[test]
fn doubled() {
    let template = "{{^bool}}\n* first\n{{/bool}}\n* {{two}}\n{{^bool}}\n* third\n{{/bool}}\n";
    assert_eq!(
        render(template, json!({"bool": false, "two": "second"})),
        "* first\n* second\n* third\n"
    );
}

#[test]
fn nested() {
    let template = "| A {{^bool}}B {{^bool}}C{{/bool}} D{{/bool}} E |";
    assert_eq!(render(template, json!({"bool": false})), "| A B C D E |");
    assert_eq!(render(template, json!({"bool": true})), "| A  E |");
}

#[test]
fn context_misses() {
    assert_eq!(
        render("[{{^missing}}Found key 'missing'!{{/missing}}]", json!({})),
        "[Found key 'missing'!]"
    );
}

#[test]
fn strict_misses_fail() {
    let renderer = Renderer::builder()
        .missing_tags(MissingTags::Strict)
        .build()
        .unwrap();
    assert!(matches!(
        renderer.render("{{^missing}}x{{/missing}}", &json!({})),
        Err(Error::KeyNotFound(name)) if name == "missing"
    ));
}

mod dotted_names {
    use super::*;

    #[test]
    fn truthy() {
        assert_eq!(
            render("\"{{^a.b.c}}Not Here{{/a.b.c}}\" == \"\"", json!({"a": {"b": {"c": true}}})),
            "\"\" == \"\""
        );
    }

    #[test]
    fn falsey() {
        assert_eq!(
            render(
                "\"{{^a.b.c}}Not Here{{/a.b.c}}\" == \"Not Here\"",
                json!({"a": {"b": {"c": false}}})
            ),
            "\"Not Here\" == \"Not Here\""
        );
    }

    #[test]
    fn broken_chains() {
        assert_eq!(
            render("\"{{^a.b.c}}Not Here{{/a.b.c}}\" == \"Not Here\"", json!({"a": {}})),
            "\"Not Here\" == \"Not Here\""
        );
    }
}

mod whitespace {
    use super::*;

    fn no() -> serde_json::Value {
        json!({"boolean": false})
    }

    #[test]
    fn surrounding_whitespace() {
        assert_eq!(render(" | {{^boolean}}\t|\t{{/boolean}} | \n", no()), " | \t|\t | \n");
    }

    #[test]
    fn internal_whitespace() {
        assert_eq!(
            render(" | {{^boolean}} {{! Important Whitespace }}\n {{/boolean}} | \n", no()),
            " |  \n  | \n"
        );
    }

    #[test]
    fn indented_inline_sections() {
        assert_eq!(
            render(" {{^boolean}}NO{{/boolean}}\n {{^boolean}}WAY{{/boolean}}\n", no()),
            " NO\n WAY\n"
        );
    }

    #[test]
    fn standalone_lines() {
        assert_eq!(
            render("| This Is\n{{^boolean}}\n|\n{{/boolean}}\n| A Line\n", no()),
            "| This Is\n|\n| A Line\n"
        );
        assert_eq!(
            render("| This Is\n  {{^boolean}}\n|\n  {{/boolean}}\n| A Line\n", no()),
            "| This Is\n|\n| A Line\n"
        );
    }

    #[test]
    fn standalone_line_endings() {
        assert_eq!(render("|\r\n{{^boolean}}\r\n{{/boolean}}\r\n|", no()), "|\r\n|");
    }

    #[test]
    fn standalone_without_previous_line() {
        assert_eq!(render("  {{^boolean}}\n^{{/boolean}}\n/", no()), "^\n/");
    }

    #[test]
    fn standalone_without_newline() {
        assert_eq!(render("^{{^boolean}}\n/\n  {{/boolean}}", no()), "^\n/\n");
    }

    #[test]
    fn padding() {
        assert_eq!(render("|{{^ boolean }}={{/ boolean }}|", no()), "|=|");
    }
}
