//! Tree shapes matched by transform rules.

use super::{Bindings, Tree};

/// A structural pattern over a [`Tree`].
///
/// Placeholders (`simple`, `sequence`, `subtree`) bind whatever they match
/// under a name; `exact`, `record` and `list` must match structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// An atom or a constructed value.
    Simple(String),
    /// A list whose items are all simple.
    Sequence(String),
    /// Anything at all.
    Subtree(String),
    /// An atom with exactly this text.
    Exact(String),
    /// A record with exactly these keys.
    Record(Vec<(String, Shape)>),
    /// A list with exactly these items.
    List(Vec<Shape>),
}

pub fn simple(name: impl Into<String>) -> Shape {
    Shape::Simple(name.into())
}

pub fn sequence(name: impl Into<String>) -> Shape {
    Shape::Sequence(name.into())
}

pub fn subtree(name: impl Into<String>) -> Shape {
    Shape::Subtree(name.into())
}

pub fn exact(text: impl Into<String>) -> Shape {
    Shape::Exact(text.into())
}

pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Shape)>) -> Shape {
    Shape::Record(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
}

pub fn list(items: impl IntoIterator<Item = Shape>) -> Shape {
    Shape::List(items.into_iter().collect())
}

impl Shape {
    /// Bindings for `tree` if it has this shape.
    pub fn match_tree<T: Clone + PartialEq>(&self, tree: &Tree<T>) -> Option<Bindings<T>> {
        let mut bindings = Bindings::new();
        self.bind(tree, &mut bindings).then_some(bindings)
    }

    fn bind<T: Clone + PartialEq>(&self, tree: &Tree<T>, bindings: &mut Bindings<T>) -> bool {
        match (self, tree) {
            (Shape::Simple(name), t) if t.is_simple() => bindings.bind(name, t),
            (Shape::Sequence(name), Tree::List(items)) if items.iter().all(Tree::is_simple) => {
                bindings.bind(name, tree)
            }
            (Shape::Subtree(name), t) => bindings.bind(name, t),
            (Shape::Exact(text), Tree::Atom(slice)) => slice.as_str() == text,
            (Shape::Record(fields), Tree::Record(map)) => {
                fields.len() == map.len()
                    && fields
                        .iter()
                        .all(|(key, shape)| map.get(key).is_some_and(|v| shape.bind(v, bindings)))
            }
            (Shape::List(shapes), Tree::List(items)) => {
                shapes.len() == items.len()
                    && shapes.iter().zip(items).all(|(s, item)| s.bind(item, bindings))
            }
            _ => false,
        }
    }
}
