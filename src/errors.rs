//! Weft Error Handling
//!
//! Every stage of the pipeline (grammar construction, parsing, transformation,
//! evaluation) reports failures through the single [`WeftError`] type. The
//! error carries a classified [`ErrorKind`], optional source information for
//! labeled diagnostics, and a diagnostic code of the form `weft::<phase>::<kind>`.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::syntax::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named source text used to label diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real input text and a display name.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Source context for text that did not come from a file.
    pub fn from_input(content: impl Into<String>) -> Self {
        Self::from_file("<input>", content)
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type for the whole crate.
#[derive(Debug)]
pub struct WeftError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened, when the failure is tied to source text
    pub source_info: Option<SourceInfo>,
    /// Diagnostic code and optional help
    pub diagnostic_info: DiagnosticInfo,
}

/// All failure modes, grouped by pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Grammar-authoring errors - rejected while building a grammar
    #[error("rule '{rule}' is defined more than once")]
    DuplicateRule { rule: String },
    #[error("rule '{rule}' references undefined rule '{reference}'")]
    UndefinedRule { rule: String, reference: String },
    #[error("grammar has no rule named '{rule}' to use as root")]
    MissingRoot { rule: String },
    #[error("rule '{rule}' has invalid character class '{class}': {reason}")]
    InvalidClass {
        rule: String,
        class: String,
        reason: String,
    },
    #[error("rule '{rule}' combines two captures named '{capture}' in one sequence")]
    DuplicateCapture { rule: String, capture: String },
    #[error("rule '{rule}' is left-recursive through {cycle}")]
    LeftRecursion { rule: String, cycle: String },

    // Parse errors - input does not match the grammar
    #[error("expected {expected}, found {found}")]
    UnexpectedInput { expected: String, found: String },
    #[error("grammar '{grammar}' has no rule named '{rule}'")]
    UnknownRule { grammar: String, rule: String },
    #[error("input nests more than {limit} levels deep")]
    NestingLimit { limit: usize },

    // Transform errors - constructor received a malformed subtree
    #[error("rule '{rule}' cannot build from {subtree}: {reason}")]
    MalformedBinding {
        rule: String,
        subtree: String,
        reason: String,
    },
    #[error("transform left {found} where {expected} was required")]
    IncompleteTransform { expected: String, found: String },
    #[error("tree nests more than {limit} levels deep")]
    TreeDepthLimit { limit: usize },

    // Evaluation errors
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },
    #[error("integer overflow in '{operation}'")]
    Overflow { operation: String },
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimit { limit: usize },

    // Host errors - reading input or writing results
    #[error("cannot use {target}: {reason}")]
    Io { target: String, reason: String },
}

/// Location of an error in a named source.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Grammar,
    Parse,
    Transform,
    Eval,
    Io,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Parse => "parse",
            Self::Transform => "transform",
            Self::Eval => "eval",
            Self::Io => "io",
        }
    }
}

impl ErrorKind {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateRule { .. }
            | Self::UndefinedRule { .. }
            | Self::MissingRoot { .. }
            | Self::InvalidClass { .. }
            | Self::DuplicateCapture { .. }
            | Self::LeftRecursion { .. } => ErrorCategory::Grammar,

            Self::UnexpectedInput { .. } | Self::UnknownRule { .. } | Self::NestingLimit { .. } => {
                ErrorCategory::Parse
            }

            Self::MalformedBinding { .. }
            | Self::IncompleteTransform { .. }
            | Self::TreeDepthLimit { .. } => ErrorCategory::Transform,

            Self::TypeMismatch { .. }
            | Self::UnknownFunction { .. }
            | Self::Overflow { .. }
            | Self::RecursionLimit { .. } => ErrorCategory::Eval,

            Self::Io { .. } => ErrorCategory::Io,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::DuplicateRule { .. } => "duplicate_rule",
            Self::UndefinedRule { .. } => "undefined_rule",
            Self::MissingRoot { .. } => "missing_root",
            Self::InvalidClass { .. } => "invalid_class",
            Self::DuplicateCapture { .. } => "duplicate_capture",
            Self::LeftRecursion { .. } => "left_recursion",
            Self::UnexpectedInput { .. } => "unexpected_input",
            Self::UnknownRule { .. } => "unknown_rule",
            Self::NestingLimit { .. } => "nesting_limit",
            Self::MalformedBinding { .. } => "malformed_binding",
            Self::IncompleteTransform { .. } => "incomplete_transform",
            Self::TreeDepthLimit { .. } => "tree_depth_limit",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::UnknownFunction { .. } => "unknown_function",
            Self::Overflow { .. } => "overflow",
            Self::RecursionLimit { .. } => "recursion_limit",
            Self::Io { .. } => "io",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Grammar => "in this grammar",
            ErrorCategory::Parse => "parsing stopped here",
            ErrorCategory::Transform => "while transforming this",
            ErrorCategory::Eval => "while evaluating this",
            ErrorCategory::Io => "here",
        }
    }
}

impl WeftError {
    /// Error with no source attached, coded by its category.
    pub fn new(kind: ErrorKind) -> Self {
        let error_code = format!("weft::{}::{}", kind.category().as_str(), kind.code_suffix());
        Self {
            kind,
            source_info: None,
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Attach a labeled span in the given source.
    pub fn with_source(mut self, source: &SourceContext, span: Span) -> Self {
        self.source_info = Some(SourceInfo {
            source: source.to_named_source(),
            primary_span: to_source_span(span),
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

impl std::error::Error for WeftError {}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.category() {
            ErrorCategory::Grammar => "Grammar error",
            ErrorCategory::Parse => "Parse error",
            ErrorCategory::Transform => "Transform error",
            ErrorCategory::Eval => "Evaluation error",
            ErrorCategory::Io => "I/O error",
        };
        write!(f, "{}: {}", phase, self.kind)
    }
}

impl Diagnostic for WeftError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let info = self.source_info.as_ref()?;
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_info
            .as_ref()
            .map(|info| &*info.source as &dyn miette::SourceCode)
    }
}

// ============================================================================
// CONTEXT-AWARE ERROR CREATION
// ============================================================================

/// Context-aware error creation - each context knows how to label its errors
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: Option<Span>) -> WeftError;

    fn type_mismatch(&self, expected: &str, actual: &str) -> WeftError {
        self.report(
            ErrorKind::TypeMismatch {
                expected: expected.into(),
                actual: actual.into(),
            },
            None,
        )
    }

    fn unknown_function(&self, name: &str) -> WeftError {
        self.report(ErrorKind::UnknownFunction { name: name.into() }, None)
    }
}

/// Converts a crate Span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a WeftError with full miette diagnostics
pub fn print_error(error: WeftError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_category_and_kind() {
        let err = WeftError::new(ErrorKind::UnknownFunction { name: "nope".into() });
        assert_eq!(err.diagnostic_info.error_code, "weft::eval::unknown_function");
        assert_eq!(err.to_string(), "Evaluation error: unknown function 'nope'");
    }

    #[test]
    fn source_attaches_label() {
        let source = SourceContext::from_input("abc");
        let err = WeftError::new(ErrorKind::UnexpectedInput {
            expected: "'x'".into(),
            found: "'b'".into(),
        })
        .with_source(&source, Span { start: 1, end: 2 });
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 1);
        assert!(err.source_code().is_some());
    }

    #[test]
    fn unsourced_error_has_no_labels() {
        let err = WeftError::new(ErrorKind::RecursionLimit { limit: 3 });
        assert!(err.labels().is_none());
        assert_eq!(err.category(), ErrorCategory::Eval);
    }
}
