//! Syntax module for Weft
//!
//! A hand-built PEG combinator layer: grammars are authored with the
//! [`matcher`] DSL, checked and compiled by [`grammar::GrammarBuilder`], and
//! run by the recursive-descent engine in [`parser`]. Successful parses
//! produce [`Capture`] trees.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod capture;
pub mod cursor;
pub mod grammar;
pub mod matcher;
pub mod parser;
pub mod validator;

pub use capture::Capture;
pub use cursor::Cursor;
pub use grammar::{Grammar, GrammarBuilder, RuleId, DEFAULT_MAX_NESTING};
pub use matcher::{any, character, choice, class, literal, rule, seq, Matcher};

/// Represents a byte range in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// Matched text together with where it was matched.
///
/// Two slices compare equal when their text is equal; the span records
/// provenance only. This lets hand-built expectations such as
/// `Slice::from("hello")` compare against parsed output.
#[derive(Debug, Clone, Eq, Default)]
pub struct Slice {
    pub text: String,
    pub span: Span,
}

impl Slice {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Slice {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl From<&str> for Slice {
    fn from(text: &str) -> Self {
        Slice::new(text, Span::new(0, text.len()))
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Slice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
