//! Integration tests for forking identifiers onto elements
//!
//! Tests validation order, reflect creation, instance views, and fluent writes.

use marginalia_foundation::{ErrorKind, Record, Target, Token, Type, Value};
use marginalia_reflect::{
    Body, Callable, Constructor, ElementRef, Filter, Kind, Object, Reflected,
};
use marginalia_registry::{Attachment, IdentifierOptions, Registry};

use crate::init_tracing;

fn service() -> Constructor {
    Constructor::builder("app.Service")
        .field("repo")
        .method("handle", 2)
        .static_field("instances")
        .static_method("boot", 0)
        .build()
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn disallowed_parameter_target() {
    let mut reg = Registry::new();
    let route = Token::new("web.Route");
    reg.identify(
        &route,
        IdentifierOptions::new().with_targets(&[Target::Class, Target::Method]),
    );

    let err = reg
        .fork(&route, Attachment::parameter(&service(), "handle", 0))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TargetNotAllowed {
            target: Target::Parameter,
            ..
        }
    ));
    assert!(!reg.has_class(&service()));
}

#[test]
fn target_check_precedes_name_check() {
    let mut reg = Registry::new();
    let table = Token::new("orm.Table");
    reg.identify(&table, IdentifierOptions::new().with_target(Target::Class));

    let err = reg
        .fork(&table, Attachment::field(&service(), ""))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TargetNotAllowed { .. }));
}

#[test]
fn keyword_rules_skip_parameters() {
    let mut reg = Registry::new();
    let inject = Token::new("di.Inject");
    reg.identify(&inject, IdentifierOptions::new().with_not_static(true));

    let forked = reg.fork(&inject, Attachment::parameter(&service(), "boot", 0).statics());
    assert!(forked.is_ok());
}

#[test]
fn static_field_rejected_for_not_static() {
    let mut reg = Registry::new();
    let column = Token::new("orm.Column");
    reg.identify(&column, IdentifierOptions::new().with_not_static(true));

    let err = reg
        .fork(&column, Attachment::field(&service(), "instances").statics())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotUsedForStaticMember { .. }));
    let ctx = err.context.unwrap();
    assert_eq!(ctx.source.as_deref(), Some("<identifier>orm.Column"));
}

// =============================================================================
// Reflect Creation
// =============================================================================

#[test]
fn allowed_parameter_reachable_through_class() {
    init_tracing();
    let mut reg = Registry::new();
    let inject = Token::new("di.Inject");
    let id = reg.identify(&inject, IdentifierOptions::new().with_target(Target::Parameter));
    let c = service();

    let instance = reg
        .fork(&inject, Attachment::parameter(&c, "handle", 1))
        .unwrap()
        .finish();
    assert!(instance.is_of_parameter());

    let class = reg.get_class(&c).unwrap();
    let param = class
        .get_any_property("handle", Filter::new())
        .unwrap()
        .get_parameter(1)
        .unwrap();
    assert_eq!(param.current_identifier(), Some(id));
    let view = reg.instance(instance.id()).unwrap();
    assert_eq!(view.as_parameter().unwrap().id(), param.id());
}

#[test]
fn parameter_past_declared_arity_is_rejected() {
    let mut reg = Registry::new();
    let inject = Token::new("di.Inject");
    reg.identify(&inject, IdentifierOptions::new());
    let c = service();

    let err = reg
        .fork(&inject, Attachment::parameter(&c, "handle", 4))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ParameterOutOfRange {
            index: 4,
            arity: 2,
            ..
        }
    ));
    let handle = reg
        .get_class(&c)
        .unwrap()
        .get_instance_property("handle", Filter::new())
        .unwrap();
    assert_eq!(handle.list_parameters().len(), 2);
    assert_eq!(reg.instances().count(), 0);
}

#[test]
fn parameter_of_unknown_arity_fills_indices() {
    let mut reg = Registry::new();
    let inject = Token::new("di.Inject");
    let id = reg.identify(&inject, IdentifierOptions::new());
    let c = service();

    reg.fork(&inject, Attachment::parameter(&c, "dispatch", 2))
        .unwrap()
        .set(Record::new())
        .unwrap();
    let dispatch = reg
        .get_class(&c)
        .unwrap()
        .get_instance_property("dispatch", Filter::new())
        .unwrap();
    assert_eq!(dispatch.list_parameters().len(), 3);
    assert!(dispatch.get_parameter(2).unwrap().has_decorator(id, None));
    assert!(!dispatch.get_parameter(0).unwrap().has_decorator(id, None));
}

#[test]
fn method_fork_onto_field_is_rejected() {
    let mut reg = Registry::new();
    let route = Token::new("web.Route");
    reg.identify(&route, IdentifierOptions::new());
    let c = service();

    let err = reg
        .fork(
            &route,
            Attachment::method(&c, "repo").with_callable(Callable::new("repo", 0)),
        )
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidTarget {
            target: Target::Field,
            expected: Target::Method,
            ..
        }
    ));
    let err = reg
        .fork(&route, Attachment::field(&c, "handle"))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidTarget {
            target: Target::Method,
            expected: Target::Field,
            ..
        }
    ));
    let repo = reg
        .get_class(&c)
        .unwrap()
        .get_instance_property("repo", Filter::new())
        .unwrap();
    assert_eq!(repo.kind(), Kind::Field);
}

#[test]
fn member_fork_touches_new_class() {
    let mut reg = Registry::new();
    let route = Token::new("web.Route");
    let id = reg.identify(&route, IdentifierOptions::new());
    let c = service();

    let instance = reg
        .fork(&route, Attachment::method(&c, "handle"))
        .unwrap()
        .finish();
    let class = reg.get_class(&c).unwrap().id();
    reg.set_last(ElementRef::Class(class), Record::new().with("path", "/"))
        .unwrap();

    let view = reg.get_class(&c).unwrap();
    assert_eq!(view.current_identifier(), Some(id));
    assert_eq!(view.get_value(id, None), Some(Record::new().with("path", "/")));
    let repo = view.get_instance_property("repo", Filter::new()).unwrap();
    assert_eq!(repo.current_instance(), Some(instance.id()));
}

#[test]
fn late_members_are_registered() {
    let mut reg = Registry::new();
    let column = Token::new("orm.Column");
    reg.identify(&column, IdentifierOptions::new());
    let c = service();

    reg.fork(&column, Attachment::field(&c, "late")).unwrap();
    reg.fork(
        &column,
        Attachment::method(&c, "dynamic").with_callable(Callable::new("dynamic", 1)),
    )
    .unwrap();

    let class = reg.get_class(&c).unwrap();
    assert!(class.has_instance_property("late", Filter::new().owned()));
    let dynamic = class.get_instance_property("dynamic", Filter::new()).unwrap();
    assert_eq!(dynamic.list_parameters().len(), 1);
}

#[test]
fn object_attachment_supplies_body_types() {
    let mut reg = Registry::new();
    let column = Token::new("orm.Column");
    reg.identify(&column, IdentifierOptions::new());
    let c = service();
    let object = Object::new(&c).with_body(Body::new().field("repo", Type::class("app.Repo")));

    reg.fork(&column, Attachment::field(&c, "repo").with_object(&object))
        .unwrap();
    let repo = reg
        .get_class(&object)
        .unwrap()
        .get_instance_property("repo", Filter::new())
        .unwrap();
    assert_eq!(repo.ty(), Some(&Type::class("app.Repo")));
}

// =============================================================================
// Instance Views and Writes
// =============================================================================

#[test]
fn forked_views_by_target() {
    let mut reg = Registry::new();
    let doc = Token::new("meta.Doc");
    reg.identify(&doc, IdentifierOptions::new());
    let c = service();

    let forked = reg.fork(&doc, Attachment::field(&c, "repo")).unwrap();
    assert_eq!(forked.as_field().unwrap().name(), "repo");
    let err = forked.as_method().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidTarget {
            target: Target::Field,
            expected: Target::Method,
            ..
        }
    ));
    assert!(forked.as_class().is_err());
    assert!(forked.as_parameter().is_err());
}

#[test]
fn set_returns_element_for_chaining() {
    let mut reg = Registry::new();
    let doc = Token::new("meta.Doc");
    let id = reg.identify(&doc, IdentifierOptions::new());
    let c = service();

    let element = reg
        .fork(&doc, Attachment::method(&c, "boot").statics())
        .unwrap()
        .set(Record::new().with("text", "starts the app"))
        .unwrap();
    assert!(matches!(element, ElementRef::Property(_)));
    reg.set_last(element, Record::new().with("text", "again")).unwrap();

    let boot = reg
        .get_class(&c)
        .unwrap()
        .get_static_property("boot", Filter::new())
        .unwrap();
    let texts: Vec<Value> = boot
        .list_values(id, None)
        .iter()
        .filter_map(|r| r.get("text").cloned())
        .collect();
    assert_eq!(texts, vec![Value::from("starts the app"), Value::from("again")]);
}

#[test]
fn instance_values_follow_element() {
    let mut reg = Registry::new();
    let doc = Token::new("meta.Doc");
    reg.identify(&doc, IdentifierOptions::new());
    let c = service();

    let first = reg
        .fork(&doc, Attachment::class(&c))
        .unwrap()
        .finish();
    reg.fork(&doc, Attachment::class(&c))
        .unwrap()
        .set(Record::new().with("n", 1))
        .unwrap();

    let view = reg.instance(first.id()).unwrap();
    assert_eq!(view.values().len(), 1);
    assert_eq!(reg.instances().count(), 2);
}
