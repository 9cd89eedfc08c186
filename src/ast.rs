// Typed expression nodes produced by the expression transform.
// Each expression exclusively owns its children; there is no sharing.

use serde::Serialize;
use std::fmt;

use crate::builtins::OutputSink;
use crate::engine::{self, EvalConfig, EvaluationContext};
use crate::errors::WeftError;

pub mod value;

pub use value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expr {
    IntLiteral(i64),
    StrLiteral(String),
    Addition { left: Box<Expr>, right: Box<Expr> },
    FunctionCall { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::IntLiteral(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::StrLiteral(value.into())
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Addition {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Evaluates with the standard built-ins and default limits.
    pub fn eval(&self, output: &mut dyn OutputSink) -> Result<Value, WeftError> {
        let builtins = crate::builtins::standard();
        let mut context = EvaluationContext::new(&builtins, output, EvalConfig::default());
        engine::evaluate(self, &mut context)
    }

    // Utility: pretty printing
    pub fn pretty(&self) -> String {
        match self {
            Expr::IntLiteral(n) => n.to_string(),
            Expr::StrLiteral(s) => format!("'{}'", s),
            Expr::Addition { left, right } => format!("{} + {}", left.pretty(), right.pretty()),
            Expr::FunctionCall { name, args } => {
                let inner = args
                    .iter()
                    .map(|e| e.pretty())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", name, inner)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_source_like_text() {
        let e = Expr::call("puts", vec![Expr::int(1), Expr::add(Expr::int(4), Expr::int(5))]);
        assert_eq!(e.pretty(), "puts(1, 4 + 5)");
        assert_eq!(Expr::string("there").to_string(), "'there'");
    }
}
