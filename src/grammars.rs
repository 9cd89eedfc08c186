//! Concrete grammars built with the [`syntax`](crate::syntax) DSL.
//!
//! Each grammar is compiled once on first use and shared afterwards. A
//! grammar module exposes `grammar()` and, where its trees have a typed
//! reading, a `transform()` ruleset for them.

use crate::syntax::{class, Matcher};

pub mod arguments;
pub mod directive;
pub mod expression;

/// One or more whitespace characters.
pub(crate) fn whitespace() -> Matcher {
    class(r"\s").repeat(1)
}

/// Text between `quote` characters, captured as `:string`.
pub(crate) fn quoted(quote: char) -> Matcher {
    let delimiter = crate::syntax::character(quote);
    delimiter.clone()
        >> (delimiter.clone().absent() >> crate::syntax::any())
            .repeat(0)
            .capture("string")
        >> delimiter
}

/// A run of decimal digits, captured as `:int`.
pub(crate) fn digits() -> Matcher {
    class("[0-9]").repeat(1).capture("int")
}
