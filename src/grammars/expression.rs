//! Integer sums and function calls: `puts(1, 2, 4 + 5, 'there')`.
//!
//! `+` is right-associative and there is no precedence to speak of; any
//! expression may appear as a call argument, including another call.

use once_cell::sync::OnceCell;

use super::{digits, quoted, whitespace};
use crate::ast::Expr;
use crate::errors::{SourceContext, WeftError};
use crate::syntax::{class, literal, rule, Grammar, GrammarBuilder, DEFAULT_MAX_NESTING};
use crate::transform::{exact, record, sequence, simple, BindingError, Transform, Tree};

static GRAMMAR: OnceCell<Grammar> = OnceCell::new();

pub fn grammar() -> Result<&'static Grammar, WeftError> {
    GRAMMAR.get_or_try_init(build)
}

fn build() -> Result<Grammar, WeftError> {
    GrammarBuilder::new("expression")
        .rule("expression", rule("funcall") | rule("sum") | rule("string") | rule("integer"))
        .rule("space", whitespace())
        .rule("space?", rule("space").maybe())
        .rule("lparen", literal("(") >> rule("space?"))
        .rule("rparen", literal(")") >> rule("space?"))
        .rule("comma", rule("space?") >> literal(",") >> rule("space?"))
        .rule("integer", digits() >> rule("space?"))
        .rule("string", (quoted('\'') | quoted('"')) >> rule("space?"))
        .rule("identifier", class("[a-z_]").repeat(1))
        .rule("operator", literal("+").capture("op") >> rule("space?"))
        .rule(
            "sum",
            rule("integer").capture("left") >> rule("operator") >> rule("expression").capture("right"),
        )
        .rule("arglist", rule("expression") >> (rule("comma") >> rule("expression")).repeat(0))
        .rule(
            "funcall",
            rule("identifier").capture("funcall")
                >> rule("lparen")
                >> rule("arglist").maybe().capture("arglist")
                >> rule("rparen"),
        )
        .root("expression")
        .build()
}

/// Builds [`Expr`] nodes from expression parse trees.
pub fn transform() -> Transform<Expr> {
    Transform::<Expr>::new()
        .rule("int", record([("int", simple("int"))]), |b| {
            let text = b.text("int")?;
            text.parse::<i64>()
                .map(|n| Tree::Value(Expr::IntLiteral(n)))
                .map_err(|e| BindingError::Invalid(format!("'{text}' is not a 64-bit integer: {e}")))
        })
        .rule("string", record([("string", simple("s"))]), |b| {
            Ok(Tree::Value(Expr::StrLiteral(b.text("s")?.to_string())))
        })
        .rule(
            "addition",
            record([
                ("left", simple("left")),
                ("op", exact("+")),
                ("right", simple("right")),
            ]),
            |b| {
                let left = b.take_value("left")?;
                let right = b.take_value("right")?;
                Ok(Tree::Value(Expr::add(left, right)))
            },
        )
        .rule(
            "funcall",
            record([("funcall", simple("name")), ("arglist", sequence("args"))]),
            |b| {
                let name = b.text("name")?.to_string();
                let args = b.take_values("args")?;
                Ok(Tree::Value(Expr::call(name, args)))
            },
        )
}

/// Parses and transforms an expression.
pub fn parse(input: &str) -> Result<Expr, WeftError> {
    parse_source(&SourceContext::from_input(input))
}

pub fn parse_source(source: &SourceContext) -> Result<Expr, WeftError> {
    parse_source_nested(source, DEFAULT_MAX_NESTING)
}

/// Parses with an explicit limit on grammar nesting. Each `+` nests the
/// right operand about five matchers deeper.
pub fn parse_source_nested(source: &SourceContext, max_nesting: usize) -> Result<Expr, WeftError> {
    let tree = grammar()?.parse_source_nested(None, source, max_nesting)?;
    transform().apply_in(tree, source)?.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCategory, ErrorKind};
    use crate::syntax::Capture;

    #[test]
    fn sum_tree_shape() {
        let tree = grammar().unwrap().parse("4 + 5").unwrap();
        let int = |n: &str| Capture::tagged("int", Capture::atom(n));
        assert_eq!(
            tree,
            Capture::record([
                ("left", int("4")),
                ("op", Capture::atom("+")),
                ("right", int("5")),
            ])
        );
    }

    #[test]
    fn sum_is_right_associative() {
        assert_eq!(
            parse("1+2+3").unwrap(),
            Expr::add(Expr::int(1), Expr::add(Expr::int(2), Expr::int(3)))
        );
    }

    #[test]
    fn call_arguments_in_order() {
        assert_eq!(
            parse("puts(1,2,3, 4+5, 10 + 1)").unwrap(),
            Expr::call(
                "puts",
                vec![
                    Expr::int(1),
                    Expr::int(2),
                    Expr::int(3),
                    Expr::add(Expr::int(4), Expr::int(5)),
                    Expr::add(Expr::int(10), Expr::int(1)),
                ]
            )
        );
    }

    #[test]
    fn calls_nest_and_may_be_empty() {
        assert_eq!(
            parse("puts(puts(), 'there')").unwrap(),
            Expr::call("puts", vec![Expr::call("puts", vec![]), Expr::string("there")])
        );
    }

    #[test]
    fn oversized_integer_is_transform_error() {
        let err = parse("99999999999999999999").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transform);
        assert!(matches!(err.kind, ErrorKind::MalformedBinding { ref rule, .. } if rule == "int"));
        assert!(err.source_info.is_some());
    }

    #[test]
    fn unclosed_call_is_parse_error() {
        let err = parse("puts(1, 2").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Parse);
    }
}
