//! # Weft
//!
//! A hand-built PEG combinator parser with a structural tree transformer and
//! a small evaluator.
//!
//! The pipeline runs leaf-first:
//!
//! 1. grammars are authored with the [`syntax`] DSL and compiled by
//!    [`syntax::GrammarBuilder`];
//! 2. parsing produces a [`Capture`] tree or a [`WeftError`] pointing at the
//!    deepest failure;
//! 3. a [`transform::Transform`] rewrites the tree bottom-up into typed
//!    values;
//! 4. [`engine::evaluate`] computes a [`Value`] from an [`Expr`].
//!
//! ```
//! use weft::{engine, NullSink, EvalConfig, Value};
//!
//! let value = engine::run("4 + 5", EvalConfig::default(), &mut NullSink).unwrap();
//! assert_eq!(value, Value::Int(9));
//! ```

pub mod ast;
pub mod builtins;
pub mod cli;
pub mod document;
pub mod engine;
pub mod errors;
pub mod grammars;
pub mod syntax;
pub mod transform;

pub use ast::{Expr, Value};
pub use builtins::{BuiltinRegistry, NullSink, OutputSink};
pub use document::Document;
pub use engine::{EvalConfig, EvaluationContext};
pub use errors::{ErrorCategory, ErrorKind, SourceContext, WeftError};
pub use syntax::{Capture, Grammar, GrammarBuilder, Span};
pub use transform::{Shape, Transform, Tree};
