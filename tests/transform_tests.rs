// tests/transform_tests.rs

use std::fmt;

use weft::syntax::Capture;
use weft::transform::{exact, list, record, sequence, simple, subtree, Plain, Transform, Tree};

#[derive(Debug, Clone, PartialEq)]
enum Pet {
    Dog(String),
    Cat(String),
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pet::Dog(name) => write!(f, "dog {name}"),
            Pet::Cat(name) => write!(f, "cat {name}"),
        }
    }
}

fn pets() -> Transform<Pet> {
    Transform::<Pet>::new()
        .rule("dog", record([("dog", simple("name"))]), |b| {
            Ok(Tree::Value(Pet::Dog(b.text("name")?.to_string())))
        })
        .rule("cat", record([("cat", simple("name"))]), |b| {
            Ok(Tree::Value(Pet::Cat(b.text("name")?.to_string())))
        })
}

#[test]
fn test_each_pet_is_rewritten() {
    let input = Capture::list([
        Capture::tagged("dog", Capture::atom("rex")),
        Capture::tagged("cat", Capture::atom("tom")),
    ]);
    assert_eq!(
        pets().apply(input).unwrap(),
        Tree::list([
            Tree::Value(Pet::Dog("rex".into())),
            Tree::Value(Pet::Cat("tom".into())),
        ])
    );
}

#[test]
fn test_unknown_nodes_are_left_alone() {
    let input = Capture::record([
        ("owner", Capture::atom("ann")),
        ("pet", Capture::tagged("dog", Capture::atom("rex"))),
    ]);
    assert_eq!(
        pets().apply(input).unwrap(),
        Tree::record([
            ("owner", Tree::atom("ann")),
            ("pet", Tree::Value(Pet::Dog("rex".into()))),
        ])
    );
}

#[test]
fn test_constructor_output_is_not_matched_again() {
    let transform = Transform::<Plain>::new()
        .rule("wrap", record([("a", simple("x"))]), |b| {
            Ok(Tree::record([("a", b.take_tree("x")?)]))
        });
    let out = transform.apply(Capture::tagged("a", Capture::atom("1"))).unwrap();
    assert_eq!(out, Tree::record([("a", Tree::atom("1"))]));
}

#[test]
fn test_sequence_only_matches_flat_lists() {
    let flat = Capture::tagged("items", Capture::list([Capture::atom("a"), Capture::atom("b")]));
    let nested = Capture::tagged(
        "items",
        Capture::list([Capture::atom("a"), Capture::list([Capture::atom("b")])]),
    );
    let transform = Transform::<Plain>::new()
        .rule("flat", record([("items", sequence("xs"))]), |_| Ok(Tree::atom("flat")))
        .rule("any", record([("items", subtree("xs"))]), |_| Ok(Tree::atom("any")));

    assert_eq!(transform.apply(flat).unwrap(), Tree::atom("flat"));
    assert_eq!(transform.apply(nested).unwrap(), Tree::atom("any"));
}

#[test]
fn test_repeated_name_must_bind_equal_values() {
    let transform = Transform::<Plain>::new()
        .rule("pair", list([simple("x"), simple("x")]), |_| Ok(Tree::atom("same")));

    let same = Capture::list([Capture::atom("a"), Capture::atom("a")]);
    let different = Capture::list([Capture::atom("a"), Capture::atom("b")]);
    assert_eq!(transform.apply(same).unwrap(), Tree::atom("same"));
    assert_eq!(
        transform.apply(different).unwrap(),
        Tree::list([Tree::atom("a"), Tree::atom("b")])
    );
}

#[test]
fn test_exact_matches_text() {
    let transform = Transform::<Plain>::new()
        .rule("plus", record([("op", exact("+"))]), |_| Ok(Tree::atom("add")));
    assert_eq!(
        transform.apply(Capture::tagged("op", Capture::atom("+"))).unwrap(),
        Tree::atom("add")
    );
    assert_eq!(
        transform.apply(Capture::tagged("op", Capture::atom("-"))).unwrap(),
        Tree::record([("op", Tree::atom("-"))])
    );
}

#[test]
fn test_record_shape_needs_exact_keys() {
    let input = Capture::record([("dog", Capture::atom("rex")), ("age", Capture::atom("3"))]);
    let out = pets().apply(input.clone()).unwrap();
    assert_eq!(out, Tree::from(input));
}
