//! Key/value argument lists and hash objects.
//!
//! ```text
//! { hello: "world", hi: 'there', n: 3 }
//! ```
//!
//! Parsed with the root `hash_obj` rule, this yields
//! `{named_args: [{key_value: {key, val}}, ...]}`; [`transform`] folds that
//! into a record mapping each key to its value.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;

use super::{digits, quoted, whitespace};
use crate::errors::WeftError;
use crate::syntax::{class, literal, rule, Grammar, GrammarBuilder};
use crate::transform::{record, simple, subtree, BindingError, Plain, Transform, Tree};

static GRAMMAR: OnceCell<Grammar> = OnceCell::new();

pub fn grammar() -> Result<&'static Grammar, WeftError> {
    GRAMMAR.get_or_try_init(build)
}

fn build() -> Result<Grammar, WeftError> {
    GrammarBuilder::new("arguments")
        .rule("spaces", whitespace())
        .rule("spaces?", rule("spaces").maybe())
        .rule("comma", rule("spaces?") >> literal(",") >> rule("spaces?"))
        .rule("string", quoted('"') | quoted('\''))
        .rule("integer", digits())
        .rule("value", rule("string") | rule("integer"))
        .rule(
            "key",
            rule("spaces?") >> class(r"[^\s:]").repeat(1).capture("key") >> literal(":") >> rule("spaces?"),
        )
        .rule(
            "key_value",
            (rule("key") >> rule("value").capture("val")).capture("key_value") >> rule("spaces?"),
        )
        .rule(
            "named_args",
            rule("spaces?")
                >> (rule("key_value") >> (rule("comma") >> rule("key_value")).repeat(0)).capture("named_args")
                >> rule("spaces?"),
        )
        .rule(
            "hash_obj",
            rule("spaces?") >> literal("{") >> rule("named_args") >> literal("}") >> rule("spaces?"),
        )
        .root("hash_obj")
        .build()
}

/// Reduces strings and integers to their text and named argument lists to a
/// record. A key given twice is an error.
pub fn transform() -> Transform<Plain> {
    Transform::<Plain>::new()
        .rule("string", record([("string", simple("s"))]), |b| b.take_tree("s"))
        .rule("integer", record([("int", simple("i"))]), |b| b.take_tree("i"))
        .rule("named_args", record([("named_args", subtree("args"))]), |b| {
            let args = match b.take_tree("args")? {
                Tree::List(items) => items,
                single => vec![single],
            };
            let mut map = BTreeMap::new();
            for arg in args {
                let (key, val) = key_value_parts(arg)?;
                if map.contains_key(&key) {
                    return Err(BindingError::Invalid(format!("key '{key}' is given more than once")));
                }
                map.insert(key, val);
            }
            Ok(Tree::Record(map))
        })
}

fn key_value_parts(arg: Tree<Plain>) -> Result<(String, Tree<Plain>), BindingError> {
    let shape = record([(
        "key_value",
        record([("key", simple("key")), ("val", subtree("val"))]),
    )]);
    let found = arg.type_name();
    let mut parts = shape.match_tree(&arg).ok_or(BindingError::Shape {
        name: "args".into(),
        expected: "key_value record",
        found,
    })?;
    let key = parts.text("key")?.to_string();
    Ok((key, parts.take_tree("val")?))
}
