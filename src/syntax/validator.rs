//! Build-time grammar checks.
//!
//! Properties of a rule depend on the rules it references, and rules may be
//! mutually recursive, so each property is computed as a fixpoint over the
//! whole rule table before any check runs.

use std::collections::{BTreeSet, HashSet};

use super::grammar::{CompiledRule, Node, RuleId};
use super::matcher::Matcher;
use crate::errors::{ErrorKind, WeftError};

// ============================================================================
// ANALYSIS
// ============================================================================

/// Per-rule facts derived from the compiled rule table.
#[derive(Debug)]
pub(crate) struct GrammarAnalysis {
    /// Rule may produce captures.
    structured: Vec<bool>,
    /// Rule always produces a list.
    list: Vec<bool>,
    /// Capture names the rule contributes to an enclosing record.
    keys: Vec<BTreeSet<String>>,
    /// Rule may succeed without consuming input.
    nullable: Vec<bool>,
}

impl GrammarAnalysis {
    pub(crate) fn run(rules: &[CompiledRule]) -> Self {
        let n = rules.len();
        let mut analysis = Self {
            structured: vec![false; n],
            list: vec![false; n],
            keys: vec![BTreeSet::new(); n],
            nullable: vec![false; n],
        };

        // Every property below is monotone in the per-rule facts, so
        // iterating from the bottom element terminates.
        loop {
            let mut changed = false;
            for (i, rule) in rules.iter().enumerate() {
                let structured = analysis.is_structured(&rule.node);
                let list = analysis.is_list(&rule.node);
                let keys = analysis.keys(&rule.node);
                let nullable = analysis.is_nullable(&rule.node);
                if structured != analysis.structured[i]
                    || list != analysis.list[i]
                    || keys != analysis.keys[i]
                    || nullable != analysis.nullable[i]
                {
                    analysis.structured[i] = structured;
                    analysis.list[i] = list;
                    analysis.keys[i] = keys;
                    analysis.nullable[i] = nullable;
                    changed = true;
                }
            }
            if !changed {
                return analysis;
            }
        }
    }

    pub(crate) fn is_structured(&self, node: &Node) -> bool {
        match node {
            Node::Literal(_) | Node::Char(_) | Node::Class { .. } | Node::Any | Node::Absent(_) => false,
            Node::Sequence(items) | Node::Choice(items) => items.iter().any(|n| self.is_structured(n)),
            Node::Repeat { inner, .. } => self.is_structured(inner),
            Node::Capture { .. } => true,
            Node::Rule(id) => self.structured[id.0],
        }
    }

    fn is_list(&self, node: &Node) -> bool {
        match node {
            Node::Repeat { inner, .. } => self.is_structured(inner),
            Node::Sequence(items) => items.iter().any(|n| self.is_list(n)),
            Node::Choice(items) => !items.is_empty() && items.iter().all(|n| self.is_list(n)),
            Node::Rule(id) => self.list[id.0],
            _ => false,
        }
    }

    fn keys(&self, node: &Node) -> BTreeSet<String> {
        match node {
            Node::Capture { name, .. } => BTreeSet::from([name.clone()]),
            Node::Sequence(items) if items.iter().any(|n| self.is_list(n)) => BTreeSet::new(),
            Node::Sequence(items) | Node::Choice(items) => {
                items.iter().flat_map(|n| self.keys(n)).collect()
            }
            Node::Rule(id) => self.keys[id.0].clone(),
            _ => BTreeSet::new(),
        }
    }

    fn is_nullable(&self, node: &Node) -> bool {
        match node {
            Node::Literal(text) => text.is_empty(),
            Node::Char(_) | Node::Class { .. } | Node::Any => false,
            Node::Sequence(items) => items.iter().all(|n| self.is_nullable(n)),
            Node::Choice(items) => items.iter().any(|n| self.is_nullable(n)),
            Node::Repeat { inner, min, .. } => *min == 0 || self.is_nullable(inner),
            Node::Absent(_) => true,
            Node::Capture { inner, .. } => self.is_nullable(inner),
            Node::Rule(id) => self.nullable[id.0],
        }
    }

    /// Rules that may be entered at the position where `node` starts.
    fn left_calls(&self, node: &Node, out: &mut BTreeSet<RuleId>) {
        match node {
            Node::Sequence(items) => {
                for item in items {
                    self.left_calls(item, out);
                    if !self.is_nullable(item) {
                        break;
                    }
                }
            }
            Node::Choice(items) => {
                for item in items {
                    self.left_calls(item, out);
                }
            }
            Node::Repeat { inner, .. } | Node::Absent(inner) | Node::Capture { inner, .. } => {
                self.left_calls(inner, out)
            }
            Node::Rule(id) => {
                out.insert(*id);
            }
            Node::Literal(_) | Node::Char(_) | Node::Class { .. } | Node::Any => {}
        }
    }
}

// ============================================================================
// VALIDATORS
// ============================================================================

/// Validates grammar rules for authoring errors.
/// Each validator focuses on a single validation concern.
pub(crate) struct GrammarValidators;

impl GrammarValidators {
    pub(crate) fn check_duplicate_rules(rules: &[(String, Matcher)]) -> Result<(), WeftError> {
        let mut seen = HashSet::new();
        for (name, _) in rules {
            if !seen.insert(name.as_str()) {
                return Err(WeftError::new(ErrorKind::DuplicateRule { rule: name.clone() }));
            }
        }
        Ok(())
    }

    pub(crate) fn check_rule_references(rules: &[(String, Matcher)]) -> Result<(), WeftError> {
        let names: HashSet<&str> = rules.iter().map(|(name, _)| name.as_str()).collect();
        for (name, matcher) in rules {
            let mut references = Vec::new();
            collect_references(matcher, &mut references);
            if let Some(missing) = references.into_iter().find(|r| !names.contains(r)) {
                return Err(WeftError::new(ErrorKind::UndefinedRule {
                    rule: name.clone(),
                    reference: missing.to_string(),
                }));
            }
        }
        Ok(())
    }

    /// Two parts of one sequence may not contribute the same capture name.
    pub(crate) fn check_duplicate_captures(
        rules: &[CompiledRule],
        analysis: &GrammarAnalysis,
    ) -> Result<(), WeftError> {
        for rule in rules {
            if let Some(capture) = find_duplicate_capture(&rule.node, analysis) {
                return Err(WeftError::new(ErrorKind::DuplicateCapture {
                    rule: rule.name.clone(),
                    capture,
                })
                .with_help("give each capture in a sequence a distinct name"));
            }
        }
        Ok(())
    }

    pub(crate) fn check_left_recursion(
        rules: &[CompiledRule],
        analysis: &GrammarAnalysis,
    ) -> Result<(), WeftError> {
        let edges: Vec<BTreeSet<RuleId>> = rules
            .iter()
            .map(|rule| {
                let mut out = BTreeSet::new();
                analysis.left_calls(&rule.node, &mut out);
                out
            })
            .collect();

        for start in 0..rules.len() {
            let mut path = vec![RuleId(start)];
            let mut visited = HashSet::new();
            if reaches(RuleId(start), RuleId(start), &edges, &mut visited, &mut path) {
                let cycle = path
                    .iter()
                    .map(|id| rules[id.0].name.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(WeftError::new(ErrorKind::LeftRecursion {
                    rule: rules[start].name.clone(),
                    cycle,
                }));
            }
        }
        Ok(())
    }
}

fn collect_references<'m>(matcher: &'m Matcher, out: &mut Vec<&'m str>) {
    match matcher {
        Matcher::Rule(name) => out.push(name),
        Matcher::Sequence(items) | Matcher::Choice(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Matcher::Repeat { inner, .. } | Matcher::Absent(inner) | Matcher::Capture { inner, .. } => {
            collect_references(inner, out)
        }
        Matcher::Literal(_) | Matcher::Char(_) | Matcher::Class(_) | Matcher::Any => {}
    }
}

fn find_duplicate_capture(node: &Node, analysis: &GrammarAnalysis) -> Option<String> {
    match node {
        Node::Sequence(items) => {
            let mut seen = BTreeSet::new();
            for item in items {
                for key in analysis.keys(item) {
                    if !seen.insert(key.clone()) {
                        return Some(key);
                    }
                }
            }
            items.iter().find_map(|n| find_duplicate_capture(n, analysis))
        }
        Node::Choice(items) => items.iter().find_map(|n| find_duplicate_capture(n, analysis)),
        Node::Repeat { inner, .. } | Node::Absent(inner) | Node::Capture { inner, .. } => {
            find_duplicate_capture(inner, analysis)
        }
        Node::Literal(_) | Node::Char(_) | Node::Class { .. } | Node::Any | Node::Rule(_) => None,
    }
}

/// Depth-first search for `target` along left-call edges, recording the path.
fn reaches(
    from: RuleId,
    target: RuleId,
    edges: &[BTreeSet<RuleId>],
    visited: &mut HashSet<RuleId>,
    path: &mut Vec<RuleId>,
) -> bool {
    for &next in &edges[from.0] {
        if next == target {
            path.push(next);
            return true;
        }
        if visited.insert(next) {
            path.push(next);
            if reaches(next, target, edges, visited, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}
