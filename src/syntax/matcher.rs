//! Grammar authoring DSL.
//!
//! A [`Matcher`] is an uncompiled description of what to match. Matchers are
//! plain values: they can be built up with functions and operators, cloned,
//! and compared. Rule references are by name and only resolved when the
//! surrounding [`GrammarBuilder`](super::GrammarBuilder) is built, so rules
//! may refer to each other in any order.
//!
//! ```
//! use weft::syntax::{class, literal, rule};
//!
//! let spaces = class(r"\s").repeat(1);
//! let comma = rule("spaces?") >> literal(",") >> rule("spaces?");
//! let integer = class("[0-9]").repeat(1).capture("int");
//! # let _ = (spaces, comma, integer);
//! ```

use std::ops::{BitOr, Shr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// An exact string.
    Literal(String),
    /// A single exact character.
    Char(char),
    /// A single character matching a regex character class, e.g. `[0-9]`.
    Class(String),
    /// Any single character.
    Any,
    /// Each matcher in turn.
    Sequence(Vec<Matcher>),
    /// The first matcher that succeeds, in declaration order.
    Choice(Vec<Matcher>),
    /// Between `min` and `max` (unbounded when `None`) applications.
    Repeat {
        inner: Box<Matcher>,
        min: usize,
        max: Option<usize>,
    },
    /// Succeeds without consuming iff `inner` fails here.
    Absent(Box<Matcher>),
    /// Tags the result of `inner` with a name.
    Capture { name: String, inner: Box<Matcher> },
    /// Reference to a named rule.
    Rule(String),
}

pub fn literal(text: impl Into<String>) -> Matcher {
    Matcher::Literal(text.into())
}

pub fn character(c: char) -> Matcher {
    Matcher::Char(c)
}

pub fn class(class: impl Into<String>) -> Matcher {
    Matcher::Class(class.into())
}

pub fn any() -> Matcher {
    Matcher::Any
}

pub fn rule(name: impl Into<String>) -> Matcher {
    Matcher::Rule(name.into())
}

pub fn seq(parts: impl IntoIterator<Item = Matcher>) -> Matcher {
    parts
        .into_iter()
        .reduce(|acc, next| acc >> next)
        .unwrap_or_else(|| Matcher::Sequence(Vec::new()))
}

pub fn choice(branches: impl IntoIterator<Item = Matcher>) -> Matcher {
    branches
        .into_iter()
        .reduce(|acc, next| acc | next)
        .unwrap_or_else(|| Matcher::Choice(Vec::new()))
}

impl Matcher {
    /// At least `min` applications, no upper bound.
    pub fn repeat(self, min: usize) -> Matcher {
        Matcher::Repeat {
            inner: Box::new(self),
            min,
            max: None,
        }
    }

    pub fn repeat_between(self, min: usize, max: usize) -> Matcher {
        Matcher::Repeat {
            inner: Box::new(self),
            min,
            max: Some(max),
        }
    }

    /// Zero or one application.
    pub fn maybe(self) -> Matcher {
        self.repeat_between(0, 1)
    }

    /// Negative lookahead.
    pub fn absent(self) -> Matcher {
        Matcher::Absent(Box::new(self))
    }

    pub fn capture(self, name: impl Into<String>) -> Matcher {
        Matcher::Capture {
            name: name.into(),
            inner: Box::new(self),
        }
    }
}

impl Shr for Matcher {
    type Output = Matcher;

    fn shr(self, next: Matcher) -> Matcher {
        let mut parts = match self {
            Matcher::Sequence(parts) => parts,
            other => vec![other],
        };
        match next {
            Matcher::Sequence(more) => parts.extend(more),
            other => parts.push(other),
        }
        Matcher::Sequence(parts)
    }
}

impl BitOr for Matcher {
    type Output = Matcher;

    fn bitor(self, next: Matcher) -> Matcher {
        let mut branches = match self {
            Matcher::Choice(branches) => branches,
            other => vec![other],
        };
        match next {
            Matcher::Choice(more) => branches.extend(more),
            other => branches.push(other),
        }
        Matcher::Choice(branches)
    }
}
