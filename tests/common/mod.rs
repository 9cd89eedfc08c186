// Shared helpers for the integration tests.

#![allow(dead_code)]

use serde_json::Value as Json;
use weft::grammars::arguments;
use weft::syntax::Capture;

/// Parses `input` with one rule of the arguments grammar.
pub fn parse_arguments(rule: &str, input: &str) -> Capture {
    arguments::grammar()
        .unwrap()
        .parse_rule(rule, input)
        .unwrap_or_else(|e| panic!("{rule} failed on {input:?}: {e}"))
}

/// Parses and transforms with the arguments grammar, as JSON.
pub fn transform_arguments(rule: &str, input: &str) -> Json {
    let tree = parse_arguments(rule, input);
    let out = arguments::transform().apply(tree).unwrap();
    serde_json::to_value(&out).unwrap()
}

pub const SAMPLE_DOCUMENT: &str = "welcome\nthere\n:::>> foo(hello_there: 'world')\n  I am inside the block\n:::>> hi('there')\nand i am too\n";
