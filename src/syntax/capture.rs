//! Parse trees.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::{Slice, Span};

/// A captured value in a parse tree.
///
/// Records are keyed by capture name; key order carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    /// Raw matched text.
    Atom(Slice),
    /// A single named capture, `{name: value}`.
    Tagged(String, Box<Capture>),
    /// Several named captures combined by a sequence.
    Record(BTreeMap<String, Capture>),
    /// Results of a repetition.
    List(Vec<Capture>),
}

impl Capture {
    pub fn atom(text: impl Into<String>) -> Self {
        let text = text.into();
        let span = Span::new(0, text.len());
        Capture::Atom(Slice::new(text, span))
    }

    pub fn tagged(name: impl Into<String>, value: Capture) -> Self {
        Capture::Tagged(name.into(), Box::new(value))
    }

    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Capture)>) -> Self {
        Capture::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = Capture>) -> Self {
        Capture::List(items.into_iter().collect())
    }

    /// Looks up a named capture in a tagged value or record.
    pub fn get(&self, name: &str) -> Option<&Capture> {
        match self {
            Capture::Tagged(tag, value) if tag == name => Some(value),
            Capture::Record(map) => map.get(name),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Capture::Atom(slice) => Some(slice.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Capture]> {
        match self {
            Capture::List(items) => Some(items),
            _ => None,
        }
    }

    /// Covering span of all matched text, if any text was captured.
    pub fn span(&self) -> Option<Span> {
        match self {
            Capture::Atom(slice) => Some(slice.span),
            Capture::Tagged(_, value) => value.span(),
            Capture::Record(map) => join_spans(map.values()),
            Capture::List(items) => join_spans(items.iter()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Capture::Atom(_) => "atom",
            Capture::Tagged(..) => "tagged",
            Capture::Record(_) => "record",
            Capture::List(_) => "list",
        }
    }
}

fn join_spans<'a>(captures: impl Iterator<Item = &'a Capture>) -> Option<Span> {
    captures.filter_map(Capture::span).reduce(Span::join)
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capture::Atom(slice) => write!(f, "{:?}", slice.as_str()),
            Capture::Tagged(name, value) => write!(f, "{{{name}: {value}}}"),
            Capture::Record(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Capture::List(items) => {
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

impl Serialize for Capture {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Capture::Atom(slice) => slice.serialize(serializer),
            Capture::Tagged(name, value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, value)?;
                map.end()
            }
            Capture::Record(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Capture::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reads_like_a_hash() {
        let tree = Capture::tagged(
            "key_value",
            Capture::record([("key", Capture::atom("a")), ("val", Capture::atom("b"))]),
        );
        assert_eq!(tree.to_string(), r#"{key_value: {key: "a", val: "b"}}"#);
    }

    #[test]
    fn span_covers_children() {
        let a = Capture::Atom(Slice::new("a", Span::new(2, 3)));
        let b = Capture::Atom(Slice::new("bc", Span::new(7, 9)));
        let tree = Capture::record([("x", a), ("y", Capture::list([b]))]);
        assert_eq!(tree.span(), Some(Span::new(2, 9)));
        assert_eq!(Capture::list([]).span(), None);
    }

    #[test]
    fn serializes_as_plain_json() {
        let tree = Capture::tagged("string", Capture::atom("hello world"));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json, serde_json::json!({"string": "hello world"}));
    }
}
