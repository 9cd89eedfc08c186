//! Weft Parser - recursive-descent evaluation of a compiled grammar.
//!
//! Every node returns either a success carrying an [`Output`] and the
//! advanced [`Cursor`], or a [`Failure`]. Failures are ordinary values:
//! ordered choice absorbs them by trying the next branch, and since cursors
//! are immutable, backtracking needs no undo.
//!
//! The state threaded through a parse records the deepest failure seen,
//! which is what the final diagnostic reports, and the current nesting
//! depth. Input that nests past the grammar's limit ends the parse with
//! [`ErrorKind::NestingLimit`] instead of exhausting the stack.

use std::collections::{BTreeMap, BTreeSet};

use super::grammar::{Grammar, Node, RuleId};
use super::{Capture, Cursor, Slice, Span};
use crate::errors::{ErrorKind, SourceContext, WeftError};

// ============================================================================
// CORE TYPES
// ============================================================================

/// A failed match at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub position: usize,
    pub expected: String,
}

/// Intermediate result of a successful match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Output {
    /// Unstructured matched text.
    Text(Span),
    /// Named captures, to be merged with sibling captures.
    Fields(BTreeMap<String, Capture>),
    /// Results of a structured repetition.
    List(Vec<Capture>),
}

pub(crate) type MatchResult<'i> = Result<(Output, Cursor<'i>), Failure>;

impl Output {
    pub(crate) fn into_capture(self, input: &str) -> Capture {
        match self {
            Output::Text(span) => Capture::Atom(Slice::new(&input[span.start..span.end], span)),
            Output::Fields(mut fields) if fields.len() == 1 => match fields.pop_first() {
                Some((name, value)) => Capture::Tagged(name, Box::new(value)),
                None => Capture::Record(fields),
            },
            Output::Fields(fields) => Capture::Record(fields),
            Output::List(items) => Capture::List(items),
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse the entire source with rule `id`. Trailing input is a failure.
pub(crate) fn parse(
    grammar: &Grammar,
    id: RuleId,
    source: &SourceContext,
    max_nesting: usize,
) -> Result<Capture, WeftError> {
    let input = source.content.as_str();
    let rule = grammar.compiled(id);
    log::debug!(
        "parsing {} bytes with {}::{}",
        input.len(),
        grammar.name(),
        rule.name
    );

    let mut state = ParseState::new(grammar, max_nesting);
    let start = Cursor::new(input);
    let result = state.run(&rule.node, start);
    if let Some(position) = state.nesting_exceeded {
        log::debug!("parse of {}::{} exceeded nesting limit at {}", grammar.name(), rule.name, position);
        let width = Cursor::new(input).advance(position).peek().map_or(0, char::len_utf8);
        return Err(WeftError::new(ErrorKind::NestingLimit { limit: max_nesting })
            .with_source(source, Span::new(position, position + width))
            .with_help("split the input or raise the nesting limit"));
    }
    match result {
        Ok((output, end)) if end.is_at_end() => {
            log::debug!("parse of {}::{} succeeded", grammar.name(), rule.name);
            Ok(output.into_capture(input))
        }
        Ok((_, end)) => {
            state.record_failure(end, "end of input".to_string());
            Err(state.into_error(source))
        }
        Err(_) => Err(state.into_error(source)),
    }
}

// ============================================================================
// ENGINE
// ============================================================================

struct ParseState<'g> {
    grammar: &'g Grammar,
    furthest: usize,
    expected: BTreeSet<String>,
    /// Nesting depth of negative lookaheads; failures inside them are
    /// expected outcomes and are not recorded.
    lookahead: usize,
    depth: usize,
    max_nesting: usize,
    /// Where the nesting limit was first exceeded. Once set, every match
    /// fails so the parse unwinds.
    nesting_exceeded: Option<usize>,
}

impl<'g> ParseState<'g> {
    fn new(grammar: &'g Grammar, max_nesting: usize) -> Self {
        Self {
            grammar,
            furthest: 0,
            expected: BTreeSet::new(),
            lookahead: 0,
            depth: 0,
            max_nesting,
            nesting_exceeded: None,
        }
    }

    fn record_failure(&mut self, at: Cursor<'_>, expected: String) -> Failure {
        let position = at.offset();
        if self.lookahead == 0 {
            if position > self.furthest {
                self.furthest = position;
                self.expected.clear();
            }
            if position == self.furthest {
                self.expected.insert(expected.clone());
            }
        }
        Failure { position, expected }
    }

    fn run<'i>(&mut self, node: &'g Node, cursor: Cursor<'i>) -> MatchResult<'i> {
        if self.nesting_exceeded.is_some() || self.depth >= self.max_nesting {
            let position = *self.nesting_exceeded.get_or_insert(cursor.offset());
            return Err(Failure {
                position,
                expected: "shallower nesting".to_string(),
            });
        }
        self.depth += 1;
        let result = self.run_node(node, cursor);
        self.depth -= 1;
        result
    }

    fn run_node<'i>(&mut self, node: &'g Node, cursor: Cursor<'i>) -> MatchResult<'i> {
        match node {
            Node::Literal(text) => {
                if cursor.rest().starts_with(text.as_str()) {
                    Ok(consume(cursor, text.len()))
                } else {
                    Err(self.record_failure(cursor, format!("{text:?}")))
                }
            }
            Node::Char(c) => match cursor.peek() {
                Some(next) if next == *c => Ok(consume(cursor, c.len_utf8())),
                _ => Err(self.record_failure(cursor, format!("{c:?}"))),
            },
            Node::Class { source, regex } => match cursor.peek() {
                Some(c) if regex.is_match(&cursor.rest()[..c.len_utf8()]) => {
                    Ok(consume(cursor, c.len_utf8()))
                }
                _ => Err(self.record_failure(cursor, source.clone())),
            },
            Node::Any => match cursor.peek() {
                Some(c) => Ok(consume(cursor, c.len_utf8())),
                None => Err(self.record_failure(cursor, "any character".to_string())),
            },
            Node::Sequence(items) => self.run_sequence(items, cursor),
            Node::Choice(items) => self.run_choice(items, cursor),
            Node::Repeat {
                inner,
                min,
                max,
                structured,
            } => self.run_repeat(inner, *min, *max, *structured, cursor),
            Node::Absent(inner) => {
                self.lookahead += 1;
                let probe = self.run(inner, cursor);
                self.lookahead -= 1;
                match probe {
                    Ok(_) => {
                        let expected = format!("not {}", self.describe(inner));
                        Err(self.record_failure(cursor, expected))
                    }
                    Err(_) => Ok((Output::Text(cursor.span_to(&cursor)), cursor)),
                }
            }
            Node::Capture { name, inner } => {
                let (output, next) = self.run(inner, cursor)?;
                let value = output.into_capture(cursor.input());
                Ok((Output::Fields(BTreeMap::from([(name.clone(), value)])), next))
            }
            Node::Rule(id) => {
                let rule = self.grammar.compiled(*id);
                let (output, next) = self.run(&rule.node, cursor)?;
                log::trace!("rule {} matched {}..{}", rule.name, cursor.offset(), next.offset());
                Ok((output, next))
            }
        }
    }

    fn run_sequence<'i>(&mut self, items: &'g [Node], cursor: Cursor<'i>) -> MatchResult<'i> {
        let mut current = cursor;
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let (output, next) = self.run(item, current)?;
            parts.push(output);
            current = next;
        }
        match fold_sequence(parts, cursor.span_to(&current), cursor.input()) {
            Ok(output) => Ok((output, current)),
            Err(name) => Err(self.record_failure(cursor, format!("a single capture named '{name}'"))),
        }
    }

    fn run_choice<'i>(&mut self, items: &'g [Node], cursor: Cursor<'i>) -> MatchResult<'i> {
        let mut deepest: Option<Failure> = None;
        for item in items {
            match self.run(item, cursor) {
                Ok(success) => return Ok(success),
                Err(failure) => {
                    if deepest.as_ref().map_or(true, |d| failure.position > d.position) {
                        deepest = Some(failure);
                    }
                }
            }
        }
        Err(deepest.unwrap_or_else(|| self.record_failure(cursor, "an alternative".to_string())))
    }

    fn run_repeat<'i>(
        &mut self,
        inner: &'g Node,
        min: usize,
        max: Option<usize>,
        structured: bool,
        cursor: Cursor<'i>,
    ) -> MatchResult<'i> {
        let mut current = cursor;
        let mut items = Vec::new();
        let mut last_failure = None;
        while max.map_or(true, |max| items.len() < max) {
            match self.run(inner, current) {
                Ok((output, next)) => {
                    items.push(output);
                    let zero_width = next.offset() == current.offset();
                    current = next;
                    // A zero-width success would repeat forever; count it once.
                    if zero_width {
                        break;
                    }
                }
                Err(failure) => {
                    last_failure = Some(failure);
                    break;
                }
            }
        }

        if items.len() < min {
            return Err(last_failure.unwrap_or_else(|| {
                self.record_failure(current, format!("{} more of {}", min - items.len(), self.describe(inner)))
            }));
        }
        Ok((fold_repetition(items, structured, cursor.span_to(&current), cursor.input()), current))
    }

    fn describe(&self, node: &Node) -> String {
        match node {
            Node::Literal(text) => format!("{text:?}"),
            Node::Char(c) => format!("{c:?}"),
            Node::Class { source, .. } => source.clone(),
            Node::Any => "any character".to_string(),
            Node::Rule(id) => self.grammar.compiled(*id).name.clone(),
            Node::Capture { name, .. } => name.clone(),
            Node::Absent(inner) | Node::Repeat { inner, .. } => self.describe(inner),
            Node::Sequence(items) | Node::Choice(items) => match items.first() {
                Some(first) => self.describe(first),
                None => "nothing".to_string(),
            },
        }
    }

    fn into_error(self, source: &SourceContext) -> WeftError {
        let input = source.content.as_str();
        let at = Cursor::new(input).advance(self.furthest);
        let expected = match self.expected.len() {
            0 => "valid input".to_string(),
            1 => self.expected.into_iter().collect(),
            _ => format!(
                "one of {}",
                self.expected.into_iter().collect::<Vec<_>>().join(", ")
            ),
        };
        let width = at.peek().map_or(0, char::len_utf8);
        WeftError::new(ErrorKind::UnexpectedInput {
            expected,
            found: at.describe(),
        })
        .with_source(source, Span::new(self.furthest, self.furthest + width))
    }
}

fn consume(cursor: Cursor<'_>, bytes: usize) -> (Output, Cursor<'_>) {
    let next = cursor.advance(bytes);
    (Output::Text(cursor.span_to(&next)), next)
}

// ============================================================================
// FOLDING
// ============================================================================

/// Combine the outputs of a sequence. Plain text survives only when nothing
/// was captured; captures merge left to right. A duplicate capture name is
/// returned as the error.
fn fold_sequence(parts: Vec<Output>, span: Span, input: &str) -> Result<Output, String> {
    let mut acc: Option<Output> = None;
    for part in parts {
        if let Output::Text(_) = part {
            continue;
        }
        acc = Some(match acc {
            None => part,
            Some(prev) => merge(prev, part, input)?,
        });
    }
    Ok(acc.unwrap_or(Output::Text(span)))
}

fn merge(left: Output, right: Output, input: &str) -> Result<Output, String> {
    Ok(match (left, right) {
        (Output::Fields(mut l), Output::Fields(r)) => {
            for (name, value) in r {
                if l.contains_key(&name) {
                    return Err(name);
                }
                l.insert(name, value);
            }
            Output::Fields(l)
        }
        (Output::List(mut l), Output::List(r)) => {
            l.extend(r);
            Output::List(l)
        }
        (Output::List(mut l), fields) => {
            l.push(fields.into_capture(input));
            Output::List(l)
        }
        (fields, Output::List(mut r)) => {
            r.insert(0, fields.into_capture(input));
            Output::List(r)
        }
        (Output::Text(_), other) | (other, Output::Text(_)) => other,
    })
}

/// Combine the outputs of a repetition: joined text for plain matchers, a
/// list for capturing ones (nested lists are spliced in).
fn fold_repetition(items: Vec<Output>, structured: bool, span: Span, input: &str) -> Output {
    if !structured && items.iter().all(|item| matches!(item, Output::Text(_))) {
        return Output::Text(span);
    }
    let mut list = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Output::Text(_) => {}
            Output::List(inner) => list.extend(inner),
            fields => list.push(fields.into_capture(input)),
        }
    }
    Output::List(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use crate::syntax::{any, class, literal, rule, GrammarBuilder};

    fn grammar(root: crate::syntax::Matcher) -> Grammar {
        GrammarBuilder::new("test").rule("root", root).build().unwrap()
    }

    #[test]
    fn plain_sequence_yields_text() {
        let g = grammar(literal("ab") >> class("[0-9]").repeat(1));
        assert_eq!(g.parse("ab12").unwrap(), Capture::atom("ab12"));
    }

    #[test]
    fn captures_merge_into_record() {
        let g = grammar(class("[a-z]").capture("l") >> literal("=") >> class("[0-9]").capture("r"));
        assert_eq!(
            g.parse("x=1").unwrap(),
            Capture::record([("l", Capture::atom("x")), ("r", Capture::atom("1"))])
        );
    }

    #[test]
    fn choice_backtracks_to_original_cursor() {
        let g = grammar((literal("a") >> literal("b")).capture("ab") | (literal("a") >> literal("c")).capture("ac"));
        assert_eq!(
            g.parse("ac").unwrap(),
            Capture::tagged("ac", Capture::atom("ac"))
        );
    }

    #[test]
    fn repeat_one_fails_on_empty_input() {
        let g = grammar(class("[0-9]").repeat(1));
        assert!(g.parse("").is_err());
        assert!(g.parse("7").is_ok());
    }

    #[test]
    fn repeat_respects_upper_bound() {
        let g = grammar(literal("a").repeat_between(1, 2));
        assert!(g.parse("aa").is_ok());
        let err = g.parse("aaa").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedInput { ref expected, .. } if expected == "end of input"));
    }

    #[test]
    fn zero_width_repetition_terminates() {
        let g = grammar(literal("x").absent().repeat(0) >> any().repeat(0));
        assert_eq!(g.parse("abc").unwrap(), Capture::atom("abc"));
    }

    #[test]
    fn empty_structured_repeat_is_empty_list() {
        let g = grammar(any().capture("c").repeat(0));
        assert_eq!(g.parse("").unwrap(), Capture::list([]));
        assert_eq!(
            g.parse("ab").unwrap(),
            Capture::list([
                Capture::tagged("c", Capture::atom("a")),
                Capture::tagged("c", Capture::atom("b"))
            ])
        );
    }

    #[test]
    fn record_followed_by_list_becomes_one_list() {
        let g = GrammarBuilder::new("test")
            .rule("items", rule("item") >> (literal(",") >> rule("item")).repeat(0))
            .rule("item", class("[a-z]").capture("item"))
            .build()
            .unwrap();
        let tree = g.parse("a,b,c").unwrap();
        assert_eq!(tree.as_list().map(|l| l.len()), Some(3));
        let single = g.parse("a").unwrap();
        assert_eq!(single, Capture::list([Capture::tagged("item", Capture::atom("a"))]));
    }

    #[test]
    fn negative_lookahead_consumes_nothing() {
        let g = grammar((literal("\"").absent() >> any()).repeat(0).capture("s") >> literal("\""));
        assert_eq!(
            g.parse("abc\"").unwrap(),
            Capture::tagged("s", Capture::atom("abc"))
        );
    }

    #[test]
    fn failure_reports_deepest_position() {
        let g = grammar(
            (literal("ab") >> literal("cd")) | (literal("a") >> literal("x")),
        );
        let err = g.parse("abce").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Parse);
        assert!(matches!(
            err.kind,
            ErrorKind::UnexpectedInput { ref expected, ref found } if expected == "\"cd\"" && found == "'c'"
        ));
        let info = err.source_info.unwrap();
        assert_eq!(info.primary_span.offset(), 2);
    }

    #[test]
    fn trailing_input_is_failure() {
        let g = grammar(literal("a"));
        let err = g.parse("ab").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::UnexpectedInput { ref found, .. } if found == "'b'"
        ));
    }

    #[test]
    fn lookahead_failures_do_not_mislead_diagnostics() {
        let g = grammar(literal("zzz").absent() >> literal("a"));
        let err = g.parse("b").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedInput { ref expected, .. } if expected == "\"a\""));
    }

    #[test]
    fn atoms_carry_spans() {
        let g = grammar(literal("--") >> class("[a-z]").repeat(1).capture("w"));
        let tree = g.parse("--hey").unwrap();
        match tree.get("w") {
            Some(Capture::Atom(slice)) => assert_eq!(slice.span, Span::new(2, 5)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_stops_at_limit() {
        let g = GrammarBuilder::new("parens")
            .rule("group", literal("(") >> rule("group").maybe() >> literal(")"))
            .max_nesting(40)
            .build()
            .unwrap();
        assert!(g.parse("(())").is_ok());

        let deep = format!("{}{}", "(".repeat(200), ")".repeat(200));
        let err = g.parse(&deep).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingLimit { limit: 40 });
        assert_eq!(err.category(), ErrorCategory::Parse);
        assert!(err.source_info.is_some());
    }
}
