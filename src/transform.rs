//! Weft Tree Transformer
//!
//! Rewrites a parse tree into typed values by structural pattern matching.
//! A [`Transform`] is an ordered list of rules, each pairing a [`Shape`] with
//! a constructor. Application walks the tree bottom-up: children are rewritten
//! first, then the first rule whose shape matches the rebuilt node replaces
//! it. Nodes no rule matches are left in place, so a ruleset may cover only
//! part of a grammar.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{ErrorKind, SourceContext, WeftError};
use crate::syntax::{Capture, Slice, Span};

pub mod bindings;
pub mod pattern;

pub use bindings::{BindingError, Bindings};
pub use pattern::{exact, list, record, sequence, simple, subtree, Shape};

// ============================================================================
// TREES
// ============================================================================

/// A parse tree part-way through transformation.
///
/// `Value` holds whatever the ruleset's constructors produce. Named captures
/// appear as records; a single capture `{n: v}` is a one-entry record.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<T> {
    Atom(Slice),
    Record(BTreeMap<String, Tree<T>>),
    List(Vec<Tree<T>>),
    Value(T),
}

/// Value type for rulesets that only reshape trees and never construct
/// anything of their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Plain {}

impl fmt::Display for Plain {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl<T> Tree<T> {
    pub fn atom(text: impl Into<String>) -> Self {
        Tree::Atom(Slice::from(text.into().as_str()))
    }

    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Tree<T>)>) -> Self {
        Tree::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = Tree<T>>) -> Self {
        Tree::List(items.into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&Tree<T>> {
        match self {
            Tree::Record(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Tree::Atom(slice) => Some(slice.as_str()),
            _ => None,
        }
    }

    /// Atom or constructed value: the things `simple` placeholders accept.
    pub fn is_simple(&self) -> bool {
        matches!(self, Tree::Atom(_) | Tree::Value(_))
    }

    /// Covering span of the atoms in this tree.
    pub fn span(&self) -> Option<Span> {
        match self {
            Tree::Atom(slice) => Some(slice.span),
            Tree::Record(map) => map.values().filter_map(Tree::span).reduce(Span::join),
            Tree::List(items) => items.iter().filter_map(Tree::span).reduce(Span::join),
            Tree::Value(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Tree::Atom(_) => "atom",
            Tree::Record(_) => "record",
            Tree::List(_) => "list",
            Tree::Value(_) => "value",
        }
    }

    /// The constructed value at the root, if transformation got that far.
    pub fn into_value(self) -> Result<T, WeftError> {
        match self {
            Tree::Value(value) => Ok(value),
            other => Err(WeftError::new(ErrorKind::IncompleteTransform {
                expected: "a constructed value".into(),
                found: other.type_name().into(),
            })),
        }
    }
}

impl<T> From<Capture> for Tree<T> {
    fn from(capture: Capture) -> Self {
        match capture {
            Capture::Atom(slice) => Tree::Atom(slice),
            Capture::Tagged(name, value) => Tree::Record(BTreeMap::from([(name, Tree::from(*value))])),
            Capture::Record(map) => Tree::Record(map.into_iter().map(|(k, v)| (k, Tree::from(v))).collect()),
            Capture::List(items) => Tree::List(items.into_iter().map(Tree::from).collect()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Atom(slice) => write!(f, "{:?}", slice.as_str()),
            Tree::Value(value) => write!(f, "{value}"),
            Tree::Record(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Tree::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<T: Serialize> Serialize for Tree<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Atom(slice) => slice.serialize(serializer),
            Tree::Value(value) => value.serialize(serializer),
            Tree::Record(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Tree::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

// ============================================================================
// RULESETS
// ============================================================================

/// Builds the replacement for a matched subtree from its bindings.
pub type Constructor<T> = Box<dyn Fn(&mut Bindings<T>) -> Result<Tree<T>, BindingError>>;

struct TransformRule<T> {
    name: String,
    shape: Shape,
    build: Constructor<T>,
}

/// Deepest tree a [`Transform`] rewrites unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// An ordered set of (shape, constructor) rules.
pub struct Transform<T> {
    rules: Vec<TransformRule<T>>,
    max_depth: usize,
}

impl<T> Default for Transform<T> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<T> fmt::Debug for Transform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl<T> Transform<T> {
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Trees nested deeper than `max_depth` are rejected instead of rewritten.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl<T> Transform<T>
where
    T: Clone + PartialEq + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. Rules are tried in the order they were added.
    pub fn rule<F>(mut self, name: impl Into<String>, shape: Shape, build: F) -> Self
    where
        F: Fn(&mut Bindings<T>) -> Result<Tree<T>, BindingError> + 'static,
    {
        self.rules.push(TransformRule {
            name: name.into(),
            shape,
            build: Box::new(build),
        });
        self
    }

    /// Transforms a parse tree.
    pub fn apply(&self, capture: Capture) -> Result<Tree<T>, WeftError> {
        self.apply_tree(Tree::from(capture))
    }

    /// Transforms a parse tree; constructor failures are labeled in `source`.
    pub fn apply_in(&self, capture: Capture, source: &SourceContext) -> Result<Tree<T>, WeftError> {
        log::debug!("applying {} transform rules", self.rules.len());
        self.rewrite(Tree::from(capture), Some(source), 0)
    }

    /// Transforms a tree that may already be partly rewritten.
    pub fn apply_tree(&self, tree: Tree<T>) -> Result<Tree<T>, WeftError> {
        log::debug!("applying {} transform rules", self.rules.len());
        self.rewrite(tree, None, 0)
    }

    fn rewrite(&self, tree: Tree<T>, source: Option<&SourceContext>, depth: usize) -> Result<Tree<T>, WeftError> {
        if depth >= self.max_depth {
            let err = WeftError::new(ErrorKind::TreeDepthLimit {
                limit: self.max_depth,
            });
            return Err(match (source, tree.span()) {
                (Some(source), Some(span)) => err.with_source(source, span),
                _ => err,
            });
        }
        let tree = match tree {
            Tree::Record(map) => Tree::Record(
                map.into_iter()
                    .map(|(k, v)| Ok((k, self.rewrite(v, source, depth + 1)?)))
                    .collect::<Result<_, WeftError>>()?,
            ),
            Tree::List(items) => Tree::List(
                items
                    .into_iter()
                    .map(|v| self.rewrite(v, source, depth + 1))
                    .collect::<Result<_, WeftError>>()?,
            ),
            leaf => leaf,
        };

        for rule in &self.rules {
            let Some(mut bindings) = rule.shape.match_tree(&tree) else {
                continue;
            };
            log::trace!("transform rule '{}' matched a {}", rule.name, tree.type_name());
            return (rule.build)(&mut bindings).map_err(|e| {
                let err = WeftError::new(ErrorKind::MalformedBinding {
                    rule: rule.name.clone(),
                    subtree: tree.to_string(),
                    reason: e.to_string(),
                });
                match (source, tree.span()) {
                    (Some(source), Some(span)) => err.with_source(source, span),
                    _ => err,
                }
            });
        }
        Ok(tree)
    }
}
