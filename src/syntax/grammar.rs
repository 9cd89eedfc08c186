//! Grammar construction.
//!
//! [`GrammarBuilder`] collects named [`Matcher`]s, validates them, and
//! compiles them into a [`Grammar`]: a rule table in which every rule
//! reference has been resolved to a [`RuleId`] and every character class has
//! been compiled to a regex.

use regex::Regex;
use std::collections::HashMap;

use super::matcher::Matcher;
use super::parser;
use super::validator::{GrammarAnalysis, GrammarValidators};
use super::Capture;
use crate::errors::{ErrorKind, SourceContext, WeftError};

/// Deepest matcher nesting a parse may reach unless configured otherwise.
pub const DEFAULT_MAX_NESTING: usize = 256;

/// Index of a rule in its grammar's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

/// Compiled matcher. Mirrors [`Matcher`] with references resolved.
#[derive(Debug)]
pub(crate) enum Node {
    Literal(String),
    Char(char),
    Class { source: String, regex: Regex },
    Any,
    Sequence(Vec<Node>),
    Choice(Vec<Node>),
    Repeat {
        inner: Box<Node>,
        min: usize,
        max: Option<usize>,
        /// Whether `inner` may produce captures; decides the shape of an
        /// empty repetition.
        structured: bool,
    },
    Absent(Box<Node>),
    Capture { name: String, inner: Box<Node> },
    Rule(RuleId),
}

#[derive(Debug)]
pub(crate) struct CompiledRule {
    pub name: String,
    pub node: Node,
}

/// A validated, compiled set of mutually recursive rules.
#[derive(Debug)]
pub struct Grammar {
    name: String,
    rules: Vec<CompiledRule>,
    index: HashMap<String, RuleId>,
    root: RuleId,
    max_nesting: usize,
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects rule definitions for a [`Grammar`].
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    name: String,
    rules: Vec<(String, Matcher)>,
    root: Option<String>,
    max_nesting: usize,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            root: None,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn rule(mut self, name: impl Into<String>, matcher: Matcher) -> Self {
        self.rules.push((name.into(), matcher));
        self
    }

    /// The rule `parse` starts from. Defaults to the first rule defined.
    pub fn root(mut self, name: impl Into<String>) -> Self {
        self.root = Some(name.into());
        self
    }

    /// Parses nesting matchers deeper than this fail with `NestingLimit`.
    pub fn max_nesting(mut self, depth: usize) -> Self {
        self.max_nesting = depth;
        self
    }

    pub fn build(self) -> Result<Grammar, WeftError> {
        log::debug!("building grammar '{}' ({} rules)", self.name, self.rules.len());

        GrammarValidators::check_duplicate_rules(&self.rules)?;
        GrammarValidators::check_rule_references(&self.rules)?;

        let index: HashMap<String, RuleId> = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), RuleId(i)))
            .collect();

        let root_name = match self.root {
            Some(root) => root,
            None => self
                .rules
                .first()
                .map(|(name, _)| name.clone())
                .ok_or_else(|| {
                    WeftError::new(ErrorKind::MissingRoot {
                        rule: String::new(),
                    })
                    .with_help("define at least one rule")
                })?,
        };
        let root = *index
            .get(&root_name)
            .ok_or_else(|| WeftError::new(ErrorKind::MissingRoot { rule: root_name }))?;

        let mut rules = self
            .rules
            .iter()
            .map(|(name, matcher)| {
                Ok(CompiledRule {
                    name: name.clone(),
                    node: compile(name, matcher, &index)?,
                })
            })
            .collect::<Result<Vec<_>, WeftError>>()?;

        let analysis = GrammarAnalysis::run(&rules);
        for rule in &mut rules {
            mark_structured_repeats(&mut rule.node, &analysis);
        }
        GrammarValidators::check_duplicate_captures(&rules, &analysis)?;
        GrammarValidators::check_left_recursion(&rules, &analysis)?;

        Ok(Grammar {
            name: self.name,
            rules,
            index,
            root,
            max_nesting: self.max_nesting,
        })
    }
}

fn compile(rule: &str, matcher: &Matcher, index: &HashMap<String, RuleId>) -> Result<Node, WeftError> {
    let compile_all = |items: &[Matcher]| {
        items
            .iter()
            .map(|m| compile(rule, m, index))
            .collect::<Result<Vec<_>, WeftError>>()
    };

    Ok(match matcher {
        Matcher::Literal(text) => Node::Literal(text.clone()),
        Matcher::Char(c) => Node::Char(*c),
        Matcher::Class(source) => {
            let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
                WeftError::new(ErrorKind::InvalidClass {
                    rule: rule.to_string(),
                    class: source.clone(),
                    reason: e.to_string(),
                })
            })?;
            Node::Class {
                source: source.clone(),
                regex,
            }
        }
        Matcher::Any => Node::Any,
        Matcher::Sequence(parts) => Node::Sequence(compile_all(parts)?),
        Matcher::Choice(branches) => Node::Choice(compile_all(branches)?),
        Matcher::Repeat { inner, min, max } => Node::Repeat {
            inner: Box::new(compile(rule, inner, index)?),
            min: *min,
            max: *max,
            structured: false,
        },
        Matcher::Absent(inner) => Node::Absent(Box::new(compile(rule, inner, index)?)),
        Matcher::Capture { name, inner } => Node::Capture {
            name: name.clone(),
            inner: Box::new(compile(rule, inner, index)?),
        },
        Matcher::Rule(name) => Node::Rule(*index.get(name).ok_or_else(|| {
            WeftError::new(ErrorKind::UndefinedRule {
                rule: rule.to_string(),
                reference: name.clone(),
            })
        })?),
    })
}

fn mark_structured_repeats(node: &mut Node, analysis: &GrammarAnalysis) {
    match node {
        Node::Repeat {
            inner, structured, ..
        } => {
            *structured = analysis.is_structured(inner);
            mark_structured_repeats(inner, analysis);
        }
        Node::Sequence(items) | Node::Choice(items) => {
            for item in items {
                mark_structured_repeats(item, analysis);
            }
        }
        Node::Absent(inner) | Node::Capture { inner, .. } => mark_structured_repeats(inner, analysis),
        Node::Literal(_) | Node::Char(_) | Node::Class { .. } | Node::Any | Node::Rule(_) => {}
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_name(&self) -> &str {
        &self.rules[self.root.0].name
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn max_nesting(&self) -> usize {
        self.max_nesting
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    pub(crate) fn compiled(&self, id: RuleId) -> &CompiledRule {
        &self.rules[id.0]
    }

    /// Parse the whole input with the root rule.
    pub fn parse(&self, input: &str) -> Result<Capture, WeftError> {
        self.parse_source(None, &SourceContext::from_input(input))
    }

    /// Parse the whole input with a named rule.
    pub fn parse_rule(&self, rule: &str, input: &str) -> Result<Capture, WeftError> {
        self.parse_source(Some(rule), &SourceContext::from_input(input))
    }

    /// Parse named source text; failures are labeled against it.
    pub fn parse_source(&self, rule: Option<&str>, source: &SourceContext) -> Result<Capture, WeftError> {
        self.parse_source_nested(rule, source, self.max_nesting)
    }

    /// Like [`Grammar::parse_source`] with a nesting limit for this parse only.
    pub fn parse_source_nested(
        &self,
        rule: Option<&str>,
        source: &SourceContext,
        max_nesting: usize,
    ) -> Result<Capture, WeftError> {
        let id = match rule {
            None => self.root,
            Some(name) => self.rule_id(name).ok_or_else(|| {
                WeftError::new(ErrorKind::UnknownRule {
                    grammar: self.name.clone(),
                    rule: name.to_string(),
                })
            })?,
        };
        parser::parse(self, id, source, max_nesting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use crate::syntax::{any, class, literal, rule};

    #[test]
    fn forward_references_resolve() {
        let grammar = GrammarBuilder::new("test")
            .rule("pair", rule("digit") >> rule("digit"))
            .rule("digit", class("[0-9]"))
            .build()
            .unwrap();
        assert_eq!(grammar.root_name(), "pair");
        assert!(grammar.parse("42").is_ok());
    }

    #[test]
    fn rejects_undefined_reference() {
        let err = GrammarBuilder::new("test")
            .rule("start", rule("missing"))
            .build()
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UndefinedRule {
                rule: "start".into(),
                reference: "missing".into()
            }
        );
        assert_eq!(err.category(), ErrorCategory::Grammar);
    }

    #[test]
    fn rejects_duplicate_rule() {
        let err = GrammarBuilder::new("test")
            .rule("a", any())
            .rule("a", literal("x"))
            .build()
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateRule { ref rule } if rule == "a"));
    }

    #[test]
    fn rejects_bad_class() {
        let err = GrammarBuilder::new("test")
            .rule("a", class("[0-"))
            .build()
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidClass { .. }));
    }

    #[test]
    fn rejects_unknown_root() {
        let err = GrammarBuilder::new("test")
            .rule("a", any())
            .root("b")
            .build()
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingRoot { ref rule } if rule == "b"));
    }

    #[test]
    fn unknown_rule_at_parse_time() {
        let grammar = GrammarBuilder::new("test").rule("a", any()).build().unwrap();
        let err = grammar.parse_rule("nope", "x").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownRule { .. }));
    }
}
