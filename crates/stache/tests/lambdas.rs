//! Callable data: variable lambdas and section lambdas.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use stache::{Error, Renderer, Value};

fn render(template: &str, data: Value) -> stache::Result<String> {
    Renderer::new().render_value(template, data)
}

fn data<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    pairs.into_iter().collect()
}

// ==================== Variable Lambdas ====================

#[test]
fn interpolation() {
    let d = data([("lambda", Value::lambda(|| "world"))]);
    assert_eq!(render("Hello, {{lambda}}!", d).unwrap(), "Hello, world!");
}

#[test]
fn interpolation_expansion() {
    let d = data([
        ("planet", Value::from("world")),
        ("lambda", Value::lambda(|| "{{planet}}")),
    ]);
    assert_eq!(render("Hello, {{lambda}}!", d).unwrap(), "Hello, world!");
}

#[test]
fn interpolation_uses_default_delimiters() {
    let d = data([
        ("planet", Value::from("world")),
        ("lambda", Value::lambda(|| "|planet| => {{planet}}")),
    ]);
    assert_eq!(
        render("{{= | | =}}\nHello, (|&lambda|)!", d).unwrap(),
        "Hello, (|planet| => world)!"
    );
}

#[test]
fn interpolation_uses_configured_delimiters() {
    let renderer = Renderer::builder().delimiters("<%", "%>").build().unwrap();
    let d = data([
        ("planet", Value::from("world")),
        ("lambda", Value::lambda(|| "<%planet%>{{planet}}")),
    ]);
    assert_eq!(renderer.render_value("<%lambda%>", d).unwrap(), "world{{planet}}");
}

#[test]
fn interpolation_multiple_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let d = data([(
        "lambda",
        Value::lambda(move || counter.fetch_add(1, Ordering::SeqCst) + 1),
    )]);
    assert_eq!(
        render("{{lambda}} == {{{lambda}}} == {{lambda}}", d).unwrap(),
        "1 == 2 == 3"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn escaping() {
    let d = data([("lambda", Value::lambda(|| ">"))]);
    assert_eq!(render("<{{lambda}}{{{lambda}}}", d).unwrap(), "<&gt;>");
}

#[test]
fn scalar_results_are_stringified() {
    let d = data([
        ("n", Value::lambda(|| 42)),
        ("b", Value::lambda(|| false)),
        ("none", Value::lambda(|| Value::Null)),
    ]);
    assert_eq!(render("{{n}}|{{b}}|{{none}}", d).unwrap(), "42|false|");
}

// ==================== Section Lambdas ====================

#[test]
fn section() {
    let d = data([
        ("x", Value::from("Error!")),
        (
            "lambda",
            Value::section_lambda(|text: &str| if text == "{{x}}" { "yes" } else { "no" }),
        ),
    ]);
    assert_eq!(render("<{{#lambda}}{{x}}{{/lambda}}>", d).unwrap(), "<yes>");
}

#[test]
fn section_expansion() {
    let d = data([
        ("planet", Value::from("Earth")),
        (
            "lambda",
            Value::section_lambda(|text: &str| format!("{text}{{{{planet}}}}{text}")),
        ),
    ]);
    assert_eq!(render("<{{#lambda}}-{{/lambda}}>", d).unwrap(), "<-Earth->");
}

#[test]
fn section_uses_section_delimiters() {
    let d = data([
        ("planet", Value::from("Earth")),
        (
            "lambda",
            Value::section_lambda(|text: &str| format!("{text}{{{{planet}}}} => |planet|{text}")),
        ),
    ]);
    assert_eq!(
        render("{{= | | =}}<|#lambda|-|/lambda|>", d).unwrap(),
        "<-{{planet}} => Earth->"
    );
}

#[test]
fn section_multiple_calls() {
    let d = data([(
        "lambda",
        Value::section_lambda(|text: &str| format!("__{text}__")),
    )]);
    assert_eq!(
        render("{{#lambda}}FILE{{/lambda}} != {{#lambda}}LINE{{/lambda}}", d).unwrap(),
        "__FILE__ != __LINE__"
    );
}

#[test]
fn section_receives_raw_body() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let d = data([(
        "lambda",
        Value::section_lambda(move |text: &str| {
            if let Ok(mut log) = log.lock() {
                log.push(text.to_string());
            }
            ""
        }),
    )]);
    render("{{#lambda}}\n  {{#inner}}{{! c }}{{/inner}} {{&x}}\n{{/lambda}}", d).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        ["  {{#inner}}{{! c }}{{/inner}} {{&x}}\n"]
    );
}

#[test]
fn section_output_renders_against_current_frame() {
    let d = data([
        ("items", Value::from(json!([{"name": "a"}, {"name": "b"}]))),
        (
            "bold",
            Value::section_lambda(|text: &str| format!("<b>{text}</b>")),
        ),
    ]);
    assert_eq!(
        render("{{#items}}{{#bold}}{{name}}{{/bold}}{{/items}}", d).unwrap(),
        "<b>a</b><b>b</b>"
    );
}

#[test]
fn inverted_section_does_not_invoke() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let d = data([
        ("static", Value::from("static")),
        (
            "lambda",
            Value::section_lambda(move |_: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        ),
    ]);
    assert_eq!(render("<{{^lambda}}{{static}}{{/lambda}}>", d).unwrap(), "<>");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ==================== Arity ====================

#[test]
fn variable_lambda_as_section_value() {
    let d = data([
        ("yes", Value::lambda(|| true)),
        ("no", Value::lambda(|| false)),
        ("name", Value::lambda(|| "Al")),
    ]);
    assert_eq!(
        render("{{#yes}}Y{{/yes}}{{#no}}N{{/no}}{{#name}}[{{.}}]{{/name}}", d).unwrap(),
        "Y[Al]"
    );
}

#[test]
fn section_lambda_as_variable_fails() {
    let d = data([("lambda", Value::section_lambda(|text: &str| text.to_string()))]);
    assert!(matches!(render("{{lambda}}", d), Err(Error::Render(_))));
}

#[test]
fn compound_results_fail() {
    let d = data([("lambda", Value::lambda(|| json!({"a": 1})))]);
    assert!(matches!(render("{{lambda}}", d), Err(Error::Render(_))));

    let d = data([("lambda", Value::section_lambda(|_: &str| vec!["a"]))]);
    assert!(matches!(render("{{#lambda}}x{{/lambda}}", d), Err(Error::Render(_))));
}
