// tests/parser_tests.rs

mod common;

use common::{parse_arguments, transform_arguments};
use miette::Diagnostic;
use serde_json::json;
use weft::errors::{ErrorCategory, ErrorKind};
use weft::grammars::arguments;
use weft::syntax::{class, literal, rule, Capture, GrammarBuilder};

// ---
// Arguments grammar
// ---

#[test]
fn test_parses_a_comma() {
    let bare = parse_arguments("comma", ",");
    let spaced = parse_arguments("comma", " , ");
    assert_eq!(bare.as_text().map(str::trim), spaced.as_text().map(str::trim));
}

#[test]
fn test_parses_a_string() {
    let tree = parse_arguments("string", r#""hello world""#);
    assert_eq!(serde_json::to_value(&tree).unwrap(), json!({"string": "hello world"}));
}

#[test]
fn test_parses_a_key() {
    let tree = parse_arguments("key", " hello: ");
    assert_eq!(tree, Capture::tagged("key", Capture::atom("hello")));
}

#[test]
fn test_parses_a_key_value_pair() {
    assert_eq!(
        transform_arguments("key_value", r#" hello: "world" "#),
        json!({"key_value": {"key": "hello", "val": "world"}})
    );
}

#[test]
fn test_parses_multiple_key_value_pairs() {
    let tree = parse_arguments("named_args", r#" hello: "world", hi: "there" "#);
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({"named_args": [
            {"key_value": {"key": "hello", "val": {"string": "world"}}},
            {"key_value": {"key": "hi", "val": {"string": "there"}}}
        ]})
    );
}

#[test]
fn test_parses_hash() {
    assert_eq!(
        transform_arguments("hash_obj", r#" { hello: "world", hi: "there" } "#),
        json!({"hi": "there", "hello": "world"})
    );
}

#[test]
fn test_single_pair_hash_is_still_a_record() {
    assert_eq!(
        transform_arguments("hash_obj", "{only: 'one'}"),
        json!({"only": "one"})
    );
}

// ---
// Failure reporting
// ---

#[test]
fn test_trailing_input_is_rejected() {
    let err = arguments::grammar()
        .unwrap()
        .parse_rule("string", r#""a" x"#)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(matches!(err.kind, ErrorKind::UnexpectedInput { ref expected, .. } if expected == "end of input"));
}

#[test]
fn test_failure_reports_deepest_position() {
    let input = r#"{ hello: "world", hi: }"#;
    let err = arguments::grammar().unwrap().parse(input).unwrap_err();
    let offset = err.source_info.as_ref().unwrap().primary_span.offset();
    assert_eq!(offset, input.find('}').unwrap());
    match err.kind {
        ErrorKind::UnexpectedInput { expected, found } => {
            assert!(expected.starts_with("one of"), "{expected}");
            assert!(expected.contains("[0-9]"), "{expected}");
            assert_eq!(found, "'}'");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_parse_error_renders_as_diagnostic() {
    let err = arguments::grammar().unwrap().parse("{ : }").unwrap_err();
    assert_eq!(err.diagnostic_info.error_code, "weft::parse::unexpected_input");
    let labels: Vec<_> = err.labels().into_iter().flatten().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].label(), Some("parsing stopped here"));
    assert_eq!(labels[0].offset(), 2);
}

// ---
// Grammar construction
// ---

#[test]
fn test_mutually_recursive_rules() {
    let grammar = GrammarBuilder::new("parens")
        .rule("group", literal("(") >> rule("items") >> literal(")"))
        .rule("items", (rule("group") | class("[a-z]")).repeat(0))
        .build()
        .unwrap();
    assert!(grammar.parse("(a(b(c))d)").is_ok());
    assert!(grammar.parse("(a(b)").is_err());
}

#[test]
fn test_repeat_one_rejects_empty_input() {
    let grammar = GrammarBuilder::new("digits")
        .rule("digits", class("[0-9]").repeat(1))
        .build()
        .unwrap();
    assert!(grammar.parse("").is_err());
}
