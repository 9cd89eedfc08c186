//! Immutable input position.

use super::Span;

/// A position in the input. Matchers never mutate a cursor; every successful
/// match hands back a new one, so backtracking is just reusing an older value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'i> {
    input: &'i str,
    offset: usize,
}

impl<'i> Cursor<'i> {
    pub fn new(input: &'i str) -> Self {
        Self { input, offset: 0 }
    }

    /// Byte offset into the input. Always on a char boundary.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn input(&self) -> &'i str {
        self.input
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'i str {
        &self.input[self.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Cursor moved forward by `bytes`, which must end on a char boundary.
    pub fn advance(&self, bytes: usize) -> Cursor<'i> {
        debug_assert!(self.input.is_char_boundary(self.offset + bytes));
        Cursor {
            input: self.input,
            offset: self.offset + bytes,
        }
    }

    /// Span from this cursor up to a later one.
    pub fn span_to(&self, later: &Cursor<'i>) -> Span {
        Span::new(self.offset, later.offset)
    }

    /// Short human-readable description of what sits at the cursor.
    pub fn describe(&self) -> String {
        match self.peek() {
            Some(c) => format!("{c:?}"),
            None => "end of input".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_leaves_original_untouched() {
        let start = Cursor::new("héllo");
        let next = start.advance('h'.len_utf8());
        let after = next.advance('é'.len_utf8());
        assert_eq!(start.offset(), 0);
        assert_eq!(after.rest(), "llo");
        assert_eq!(start.span_to(&after), Span::new(0, 3));
    }

    #[test]
    fn describes_end_of_input() {
        let c = Cursor::new("a").advance(1);
        assert!(c.is_at_end());
        assert_eq!(c.describe(), "end of input");
        assert_eq!(Cursor::new("a").describe(), "'a'");
    }
}
