//! Weft Evaluation Engine
//!
//! Evaluates [`Expr`] trees to [`Value`]s. Evaluation is a read-only walk of
//! the tree; the only side effects are the ones built-ins perform through the
//! context's [`OutputSink`].

use crate::ast::{Expr, Value};
use crate::builtins::{self, BuiltinRegistry, OutputSink};
use crate::errors::{ErrorKind, ErrorReporting, SourceContext, WeftError};
use crate::grammars;
use crate::syntax::{Span, DEFAULT_MAX_NESTING};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Limits applied to a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Deepest expression nesting evaluated before giving up.
    pub max_depth: usize,
    /// Deepest grammar nesting `run` parses before giving up.
    pub max_nesting: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl EvalConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

// ============================================================================
// EVALUATION CONTEXT
// ============================================================================

/// The context for a single evaluation, passed to all evaluation functions.
pub struct EvaluationContext<'a, 'o> {
    pub builtins: &'a BuiltinRegistry,
    pub output: &'o mut dyn OutputSink,
    /// Source text the expression came from, for labeling errors.
    pub source: Option<SourceContext>,
    pub depth: usize,
    pub max_depth: usize,
}

impl<'a, 'o> EvaluationContext<'a, 'o> {
    pub fn new(builtins: &'a BuiltinRegistry, output: &'o mut dyn OutputSink, config: EvalConfig) -> Self {
        Self {
            builtins,
            output,
            source: None,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    pub fn with_source(mut self, source: SourceContext) -> Self {
        self.source = Some(source);
        self
    }
}

impl ErrorReporting for EvaluationContext<'_, '_> {
    fn report(&self, kind: ErrorKind, span: Option<Span>) -> WeftError {
        let help = match &kind {
            ErrorKind::UnknownFunction { .. } => {
                Some(format!("available functions: {}", self.builtins.list().join(", ")))
            }
            _ => None,
        };
        let mut err = WeftError::new(kind);
        if let Some(help) = help {
            err = err.with_help(help);
        }
        match &self.source {
            Some(source) => {
                let span = span.unwrap_or(Span::new(0, source.content.len()));
                err.with_source(source, span)
            }
            None => err,
        }
    }
}

// ============================================================================
// CORE EVALUATION
// ============================================================================

/// Core recursive evaluator.
pub fn evaluate(expr: &Expr, context: &mut EvaluationContext) -> Result<Value, WeftError> {
    if context.depth >= context.max_depth {
        return Err(context.report(
            ErrorKind::RecursionLimit {
                limit: context.max_depth,
            },
            None,
        ));
    }
    context.depth += 1;
    let result = evaluate_node(expr, context);
    context.depth -= 1;
    result
}

fn evaluate_node(expr: &Expr, context: &mut EvaluationContext) -> Result<Value, WeftError> {
    match expr {
        Expr::IntLiteral(n) => Ok(Value::Int(*n)),
        Expr::StrLiteral(s) => Ok(Value::Str(s.clone())),
        Expr::Addition { left, right } => {
            let left = evaluate(left, context)?;
            let right = evaluate(right, context)?;
            match (left, right) {
                (Value::Int(a), Value::Int(b)) => a.checked_add(b).map(Value::Int).ok_or_else(|| {
                    context.report(
                        ErrorKind::Overflow {
                            operation: format!("{a} + {b}"),
                        },
                        None,
                    )
                }),
                (Value::Int(_), other) | (other, _) => Err(context.type_mismatch("integer", other.type_name())),
            }
        }
        Expr::FunctionCall { name, args } => evaluate_call(name, args, context),
    }
}

/// Resolves the built-in before evaluating arguments, so an unknown name
/// fails before any argument has had an effect.
fn evaluate_call(name: &str, args: &[Expr], context: &mut EvaluationContext) -> Result<Value, WeftError> {
    let Some(builtin) = context.builtins.get(name) else {
        return Err(context.unknown_function(name));
    };
    let values = args
        .iter()
        .map(|arg| evaluate(arg, context))
        .collect::<Result<Vec<_>, _>>()?;
    log::trace!("calling {}({} args)", name, values.len());
    builtin(&values, context.output)
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Parses, transforms and evaluates an expression with the standard
/// built-ins.
pub fn run(source: &str, config: EvalConfig, output: &mut dyn OutputSink) -> Result<Value, WeftError> {
    let source = SourceContext::from_input(source);
    let expr = grammars::expression::parse_source_nested(&source, config.max_nesting)?;
    log::debug!("evaluating {}", expr);
    let builtins = builtins::standard();
    let mut context = EvaluationContext::new(&builtins, output, config).with_source(source);
    evaluate(&expr, &mut context)
}
