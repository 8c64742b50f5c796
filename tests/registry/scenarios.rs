//! Integration tests for end-to-end registry scenarios
//!
//! Tests whole annotate-then-read flows across the registry and reflection layers.

use marginalia_foundation::{ErrorKind, Record, Target, Token, Value};
use marginalia_reflect::{Constructor, Filter, Reflected};
use marginalia_registry::{Attachment, IdentifierOptions, Registry};
use proptest::prelude::*;

use crate::init_tracing;

fn parent() -> Constructor {
    Constructor::builder("shapes.Parent")
        .field("a")
        .field("shared")
        .method("m", 0)
        .build()
}

fn child(parent: &Constructor) -> Constructor {
    Constructor::builder("shapes.Child")
        .extends(parent)
        .field("b")
        .field("shared")
        .build()
}

// =============================================================================
// Value Storage
// =============================================================================

#[test]
fn not_multiple_keeps_newest() {
    init_tracing();
    let mut reg = Registry::new();
    let i = Token::new("test.I");
    reg.identify(
        &i,
        IdentifierOptions::new().with_single("n").with_not_multiple(true),
    );
    let cls = Constructor::builder("test.Cls").build();

    reg.fork(&i, Attachment::class(&cls))
        .unwrap()
        .set(Record::new().with("n", 5))
        .unwrap();
    reg.fork(&i, Attachment::class(&cls))
        .unwrap()
        .set(Record::new().with("n", 9))
        .unwrap();

    let query = reg.query(&i).unwrap();
    assert_eq!(query.single_by_class(&cls, Filter::new()), Some(Value::from(9)));
    assert_eq!(query.values_by_class(&cls, Filter::new()).len(), 1);
}

#[test]
fn single_without_key_is_none() {
    let mut reg = Registry::new();
    let i = Token::new("test.Plain");
    reg.identify(&i, IdentifierOptions::new());
    let cls = Constructor::builder("test.Cls").build();
    reg.fork(&i, Attachment::class(&cls))
        .unwrap()
        .set(Record::new().with("n", 1))
        .unwrap();

    let query = reg.query(&i).unwrap();
    assert_eq!(query.single_by_class(&cls, Filter::new()), None);
    assert!(query.singles_by_class(&cls, Filter::new()).is_empty());
}

#[test]
fn element_singles_require_key() {
    let mut reg = Registry::new();
    let i = Token::new("test.Plain");
    let id = reg.identify(&i, IdentifierOptions::new());
    let cls = Constructor::builder("test.Cls").build();
    reg.fork(&i, Attachment::class(&cls)).unwrap();

    let err = reg.get_class(&cls).unwrap().list_singles(id, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SingleNotSupported { .. }));
}

#[test]
fn field_value_not_visible_on_class() {
    let mut reg = Registry::new();
    let i = Token::new("test.I");
    let id = reg.identify(&i, IdentifierOptions::new());
    let cls = Constructor::builder("test.Point").field("x").build();

    reg.fork(&i, Attachment::field(&cls, "x"))
        .unwrap()
        .set(Record::new().with("v", 1))
        .unwrap();

    let class = reg.get_class(&cls).unwrap();
    assert_eq!(class.get_value(id, None), None);
    let x = class.get_instance_property("x", Filter::new()).unwrap();
    assert_eq!(x.get_value(id, None), Some(Record::new().with("v", 1)));
}

// =============================================================================
// Parameter Targets
// =============================================================================

#[test]
fn parameter_target_gate() {
    let mut reg = Registry::new();
    let cls = Constructor::builder("test.Api").method("call", 2).build();

    let closed = Token::new("test.Closed");
    reg.identify(
        &closed,
        IdentifierOptions::new().with_targets(&[Target::Class, Target::Method, Target::Field]),
    );
    let err = reg
        .fork(&closed, Attachment::parameter(&cls, "call", 1))
        .unwrap_err();
    assert!(err.is(&ErrorKind::TargetNotAllowed {
        target: Target::Parameter,
        class: String::new(),
    }));

    let open = Token::new("test.Open");
    let id = reg.identify(&open, IdentifierOptions::new().with_target(Target::Parameter));
    reg.fork(&open, Attachment::parameter(&cls, "call", 1))
        .unwrap()
        .set(Record::new().with("ok", true))
        .unwrap();

    let param = reg
        .get_class(&cls)
        .unwrap()
        .get_any_property("call", Filter::new())
        .unwrap()
        .get_parameter(1)
        .unwrap();
    assert_eq!(param.index(), 1);
    assert!(param.has_decorator(id, None));
}

// =============================================================================
// Inheritance
// =============================================================================

#[test]
fn inherited_method_has_no_proto() {
    let mut reg = Registry::new();
    let p = parent();
    let c = child(&p);
    reg.class(&c, None).unwrap();

    let child_view = reg.get_class(&c).unwrap();
    assert!(child_view.has_instance_property("m", Filter::new()));
    let m = child_view.get_instance_property("m", Filter::new()).unwrap();
    assert!(m.proto().is_none());
    assert_eq!(m.class().name(), "shapes.Parent");
}

#[test]
fn owned_and_merged_listings() {
    let mut reg = Registry::new();
    let p = parent();
    let c = child(&p);
    reg.class(&c, None).unwrap();
    let view = reg.get_class(&c).unwrap();

    let owned: Vec<String> = view
        .list_instance_property_names(Filter::new().owned())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(!owned.contains(&"a".to_string()));
    assert!(!owned.contains(&"m".to_string()));

    let merged = view.list_instance_properties(Filter::new());
    let names: Vec<&str> = merged.iter().map(|p| p.name()).collect();
    for expected in ["a", "b", "m", "shared"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    assert_eq!(names.iter().filter(|n| **n == "shared").count(), 1);
    let shared = merged.iter().find(|p| p.name() == "shared").unwrap();
    assert_eq!(shared.class().name(), "shapes.Child");
}

#[test]
fn registry_info_lists_everything() {
    let mut reg = Registry::new();
    let i = Token::new("test.I");
    reg.identify(&i, IdentifierOptions::new());
    reg.alias(&Token::new("test.J"), &i, None).unwrap();
    let p = parent();
    reg.fork(&i, Attachment::method(&p, "m")).unwrap();

    let info = reg.info(false);
    let count = |key: &str| match info.get(key) {
        Some(Value::Vec(v)) => v.len(),
        _ => 0,
    };
    assert_eq!(count("classes"), 1);
    assert_eq!(count("identifiers"), 1);
    assert_eq!(count("aliases"), 1);
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn repeated_sets_append_in_order(ns in prop::collection::vec(0i64..1000, 1..12)) {
        let mut reg = Registry::new();
        let i = Token::new("test.Seq");
        reg.identify(&i, IdentifierOptions::new().with_single("n"));
        let cls = Constructor::builder("test.Cls").field("f").build();

        for n in &ns {
            reg.fork(&i, Attachment::field(&cls, "f"))
                .unwrap()
                .set(Record::new().with("n", *n))
                .unwrap();
        }

        let expected: Vec<Value> = ns.iter().map(|n| Value::from(*n)).collect();
        let query = reg.query(&i).unwrap();
        prop_assert_eq!(query.singles_by_property(&cls, "f", Filter::new()), expected);
    }
}
