//! Placeholder bindings handed to transform constructors.

use std::collections::BTreeMap;
use thiserror::Error;

use super::Tree;
use crate::syntax::Slice;

/// Why a constructor could not build from its bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("no binding named '{0}'")]
    Unbound(String),
    #[error("binding '{name}' is {found}, expected {expected}")]
    Shape {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Subtrees bound by a shape's placeholders, keyed by placeholder name.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings<T> {
    values: BTreeMap<String, Tree<T>>,
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<T: Clone + PartialEq> Bindings<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, or checks that an existing binding is equal.
    pub(crate) fn bind(&mut self, name: &str, tree: &Tree<T>) -> bool {
        match self.values.get(name) {
            Some(existing) => existing == tree,
            None => {
                self.values.insert(name.to_string(), tree.clone());
                true
            }
        }
    }
}

impl<T> Bindings<T> {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&Tree<T>, BindingError> {
        self.values
            .get(name)
            .ok_or_else(|| BindingError::Unbound(name.to_string()))
    }

    pub fn slice(&self, name: &str) -> Result<&Slice, BindingError> {
        match self.get(name)? {
            Tree::Atom(slice) => Ok(slice),
            other => Err(shape_error(name, "atom", other)),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, BindingError> {
        self.slice(name).map(Slice::as_str)
    }

    /// Removes and returns a bound subtree, whatever its shape.
    pub fn take_tree(&mut self, name: &str) -> Result<Tree<T>, BindingError> {
        self.values
            .remove(name)
            .ok_or_else(|| BindingError::Unbound(name.to_string()))
    }

    /// Removes and returns a bound constructed value.
    pub fn take_value(&mut self, name: &str) -> Result<T, BindingError> {
        match self.take_tree(name)? {
            Tree::Value(value) => Ok(value),
            other => Err(shape_error(name, "value", &other)),
        }
    }

    /// Removes and returns a bound list of constructed values.
    pub fn take_values(&mut self, name: &str) -> Result<Vec<T>, BindingError> {
        match self.take_tree(name)? {
            Tree::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Tree::Value(value) => Ok(value),
                    other => Err(shape_error(name, "list of values", &other)),
                })
                .collect(),
            other => Err(shape_error(name, "list of values", &other)),
        }
    }
}

fn shape_error<T>(name: &str, expected: &'static str, found: &Tree<T>) -> BindingError {
    BindingError::Shape {
        name: name.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_check_shape() {
        let mut b: Bindings<i64> = Bindings::new();
        assert!(b.bind("s", &Tree::atom("hi")));
        assert!(b.bind("n", &Tree::Value(4)));
        assert!(b.bind("ns", &Tree::list([Tree::Value(1), Tree::Value(2)])));

        assert_eq!(b.text("s").unwrap(), "hi");
        assert_eq!(
            b.text("n").unwrap_err(),
            BindingError::Shape {
                name: "n".into(),
                expected: "atom",
                found: "value"
            }
        );
        assert_eq!(b.take_value("n").unwrap(), 4);
        assert_eq!(b.take_values("ns").unwrap(), vec![1, 2]);
        assert_eq!(b.take_value("n").unwrap_err(), BindingError::Unbound("n".into()));
    }

    #[test]
    fn mixed_list_is_not_a_list_of_values() {
        let mut b: Bindings<i64> = Bindings::new();
        b.bind("xs", &Tree::list([Tree::Value(1), Tree::atom("two")]));
        assert!(matches!(b.take_values("xs"), Err(BindingError::Shape { found: "atom", .. })));
    }
}
