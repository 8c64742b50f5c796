//! Integration tests for property and parameter reflects
//!
//! Tests proto links, scope filters, type discovery, and parameter creation.

use std::sync::Arc;

use marginalia_foundation::Type;
use marginalia_reflect::{
    Body, Constructor, Filter, Keyword, Kind, MemberType, NoTypes, ReflectStore, Reflected,
    TypeIntrospector,
};

/// Reports every member as an integer field or a one-argument string method.
#[derive(Debug)]
struct FixedTypes;

impl TypeIntrospector for FixedTypes {
    fn type_of(&self, _body: &Body, member: &str) -> Option<MemberType> {
        if member.starts_with("get") {
            Some(MemberType::Method {
                params: vec![Type::String],
                returns: Some(Type::Bool),
            })
        } else {
            Some(MemberType::Field(Type::Int))
        }
    }
}

fn parent_child() -> (Constructor, Constructor) {
    let parent = Constructor::builder("shop.Item")
        .method("m", 2)
        .method("price", 0)
        .build();
    let child = Constructor::builder("shop.Book")
        .extends(&parent)
        .method("price", 0)
        .build();
    (parent, child)
}

// =============================================================================
// Proto Links
// =============================================================================

#[test]
fn inherited_member_without_grandparent_has_no_proto() {
    let mut store = ReflectStore::new();
    let (_, child) = parent_child();
    let id = store.register_class(&child, None, None);
    let view = store.class(id).unwrap();

    assert!(view.has_instance_property("m", Filter::new()));
    let m = view.get_instance_property("m", Filter::new()).unwrap();
    assert!(m.proto().is_none());
}

#[test]
fn overriding_member_links_proto() {
    let mut store = ReflectStore::new();
    let (parent, child) = parent_child();
    let id = store.register_class(&child, None, None);
    let parent_id = store.class_id(&parent).unwrap();

    let price = store
        .class(id)
        .unwrap()
        .get_instance_property("price", Filter::new())
        .unwrap();
    assert_eq!(price.class().id(), id);
    assert_eq!(price.proto().unwrap().class().id(), parent_id);
    assert!(price.info(false).contains("proto"));
}

#[test]
fn proto_sees_members_registered_later() {
    let mut store = ReflectStore::new();
    let (parent, child) = parent_child();
    let child_id = store.register_class(&child, None, None);
    let parent_id = store.class_id(&parent).unwrap();
    let late = store
        .register_property(child_id, "late", Keyword::Instance, Kind::Field, None)
        .unwrap();
    assert!(!store.property(late).unwrap().has_proto());

    store
        .register_property(parent_id, "late", Keyword::Instance, Kind::Field, None)
        .unwrap();
    assert!(store.property(late).unwrap().has_proto());
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn scope_filter_compares_owner_identity() {
    let mut store = ReflectStore::new();
    let (_, child) = parent_child();
    let id = store.register_class(&child, None, None);
    let view = store.class(id).unwrap();
    let m = view.get_instance_property("m", Filter::new()).unwrap();
    let price = view.get_instance_property("price", Filter::new()).unwrap();

    assert!(m.filter_by_scope(id, Filter::new().inherited()));
    assert!(!m.filter_by_scope(id, Filter::new().owned()));
    assert!(price.filter_by_scope(id, Filter::new().owned()));
    assert!(price.filter_by_scope(id, Filter::new()));
}

#[test]
fn keyword_and_kind_filters_are_ternary() {
    let mut store = ReflectStore::new();
    let (parent, _) = parent_child();
    let id = store.register_class(&parent, None, None);
    let m = store
        .class(id)
        .unwrap()
        .get_instance_property("m", Filter::new())
        .unwrap();

    assert!(m.filter_by_keyword(Filter::new()));
    assert!(m.filter_by_keyword(Filter::new().instance()));
    assert!(!m.filter_by_keyword(Filter::new().statics()));
    assert!(m.filter_by_kind(Filter::new().methods()));
    assert!(!m.filter_by_kind(Filter::new().fields()));
}

// =============================================================================
// Types and Parameters
// =============================================================================

#[test]
fn custom_introspector_supplies_types() {
    let mut store = ReflectStore::new().with_introspector(Arc::new(FixedTypes));
    let c = Constructor::builder("shop.Cart")
        .field("count")
        .method("get_total", 0)
        .build();
    let id = store.register_class(&c, Some(Arc::new(Body::new())), None);
    let view = store.class(id).unwrap();

    let count = view.get_instance_property("count", Filter::new()).unwrap();
    assert_eq!(count.ty(), Some(&Type::Int));
    let total = view.get_instance_property("get_total", Filter::new()).unwrap();
    assert_eq!(total.ty(), Some(&Type::Bool));
    assert_eq!(total.list_parameters().len(), 1);
    assert_eq!(total.get_parameter(0).unwrap().ty(), Some(&Type::String));
}

#[test]
fn untyped_store_falls_back_to_arity() {
    let mut store = ReflectStore::new().with_introspector(Arc::new(NoTypes));
    let c = Constructor::builder("shop.Cart").method("add", 3).build();
    let body = Body::new().method("add", vec![Type::Int], None);
    let id = store.register_class(&c, Some(Arc::new(body)), None);

    let add = store
        .class(id)
        .unwrap()
        .get_instance_property("add", Filter::new())
        .unwrap();
    assert_eq!(add.list_parameters().len(), 3);
    assert!(add.list_parameters().iter().all(|p| p.ty().is_none()));
}

#[test]
fn parameter_description_and_info() {
    let mut store = ReflectStore::new();
    let (parent, _) = parent_child();
    let id = store.register_class(&parent, None, None);
    let m = store
        .class(id)
        .unwrap()
        .get_instance_property("m", Filter::new())
        .unwrap();
    let second = m.get_parameter(1).unwrap();

    assert_eq!(second.description(), "<parameter>shop.Item.m#1 [instance]");
    assert_eq!(second.property().id(), m.id());
    assert!(!second.info(false).contains("property"));
    assert!(second.info(true).contains("property"));
    assert!(!m.has_parameter(2));
}
