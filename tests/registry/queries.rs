//! Integration tests for identifier queries
//!
//! Tests value reads by class, property, and parameter, with inheritance.

use marginalia_foundation::{ErrorKind, Record, Token, Value};
use marginalia_reflect::{Constructor, Filter};
use marginalia_registry::{Attachment, IdentifierOptions, Registry};

fn base() -> Constructor {
    Constructor::builder("app.Base")
        .field("id")
        .method("save", 1)
        .static_method("find", 1)
        .build()
}

fn user(base: &Constructor) -> Constructor {
    Constructor::builder("app.User")
        .extends(base)
        .field("email")
        .build()
}

fn table(reg: &mut Registry) -> Token {
    let token = Token::new("orm.Table");
    reg.identify(&token, IdentifierOptions::new().with_single("name"));
    token
}

// =============================================================================
// Class Reads
// =============================================================================

#[test]
fn child_inherits_class_values() {
    let mut reg = Registry::new();
    let table = table(&mut reg);
    let b = base();
    let u = user(&b);

    reg.fork(&table, Attachment::class(&b))
        .unwrap()
        .set(Record::new().with("name", "base"))
        .unwrap();
    reg.class(&u, None).unwrap();

    let query = reg.query(&table).unwrap();
    assert_eq!(
        query.single_by_class(&u, Filter::new()),
        Some(Value::from("base"))
    );
    assert_eq!(query.single_by_class(&u, Filter::new().own()), None);
    assert_eq!(query.values_by_class(&u, Filter::new().parent()).len(), 1);
}

#[test]
fn child_values_shadow_parent() {
    let mut reg = Registry::new();
    let table = table(&mut reg);
    let b = base();
    let u = user(&b);

    reg.fork(&table, Attachment::class(&b))
        .unwrap()
        .set(Record::new().with("name", "bases"))
        .unwrap();
    reg.fork(&table, Attachment::class(&u))
        .unwrap()
        .set(Record::new().with("name", "users"))
        .unwrap();

    let query = reg.query(&table).unwrap();
    assert_eq!(
        query.singles_by_class(&u, Filter::new()),
        vec![Value::from("users")]
    );
    assert_eq!(
        query.single_by_class(&u, Filter::new().parent()),
        Some(Value::from("bases"))
    );
}

#[test]
fn not_inheritor_stays_on_parent() {
    let mut reg = Registry::new();
    let sealed = Token::new("meta.Sealed");
    reg.identify(&sealed, IdentifierOptions::new().with_not_inheritor(true));
    let b = base();
    let u = user(&b);

    reg.fork(&sealed, Attachment::class(&b))
        .unwrap()
        .set(Record::new())
        .unwrap();
    reg.class(&u, None).unwrap();

    let query = reg.query(&sealed).unwrap();
    assert_eq!(query.values_by_class(&b, Filter::new()).len(), 1);
    assert!(query.values_by_class(&u, Filter::new()).is_empty());
}

#[test]
fn classes_by_follows_inheritance() {
    let mut reg = Registry::new();
    let table = table(&mut reg);
    let b = base();
    let u = user(&b);

    reg.fork(&table, Attachment::class(&b))
        .unwrap()
        .set(Record::new())
        .unwrap();
    reg.class(&u, None).unwrap();

    let merged: Vec<String> = reg
        .classes_by(&table, Filter::new())
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(merged, vec!["app.Base".to_string(), "app.User".to_string()]);

    let own = reg.classes_by(&table, Filter::new().own()).unwrap();
    assert_eq!(own.len(), 1);

    let assigned = reg.query(&table).unwrap().assigned_classes(Filter::new());
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].name(), "app.Base");
}

#[test]
fn class_query_by_name() {
    let mut reg = Registry::new();
    let table = table(&mut reg);
    let b = base();
    reg.fork(&table, Attachment::class(&b))
        .unwrap()
        .set(Record::new().with("name", "bases"))
        .unwrap();

    let query = reg.query(&table).unwrap();
    assert_eq!(
        query.single_by_class("app.Base", Filter::new()),
        Some(Value::from("bases"))
    );
    assert_eq!(query.single_by_class("app.Missing", Filter::new()), None);
}

// =============================================================================
// Property Reads
// =============================================================================

#[test]
fn inherited_method_is_parent_property() {
    let mut reg = Registry::new();
    let tx = Token::new("db.Transactional");
    reg.identify(&tx, IdentifierOptions::new().with_single("level"));
    let b = base();
    let u = user(&b);

    reg.fork(&tx, Attachment::method(&b, "save"))
        .unwrap()
        .set(Record::new().with("level", "serializable"))
        .unwrap();
    reg.class(&u, None).unwrap();

    let query = reg.query(&tx).unwrap();
    assert_eq!(
        query.single_by_property(&u, "save", Filter::new().own()),
        Some(Value::from("serializable"))
    );
    assert_eq!(query.single_by_property(&u, "save", Filter::new().owned()), None);
    assert_eq!(query.assigned_properties(Filter::new()).len(), 1);
    assert!(query.assigned_properties(Filter::new().fields()).is_empty());
}

#[test]
fn overriding_method_reads_through_proto() {
    let mut reg = Registry::new();
    let tx = Token::new("db.Transactional");
    reg.identify(&tx, IdentifierOptions::new().with_single("level"));
    let b = base();
    let admin = Constructor::builder("app.Admin")
        .extends(&b)
        .method("save", 1)
        .build();

    reg.fork(&tx, Attachment::method(&b, "save"))
        .unwrap()
        .set(Record::new().with("level", "serializable"))
        .unwrap();
    reg.class(&admin, None).unwrap();

    let query = reg.query(&tx).unwrap();
    assert_eq!(
        query.single_by_property(&admin, "save", Filter::new()),
        Some(Value::from("serializable"))
    );
    assert_eq!(query.single_by_property(&admin, "save", Filter::new().own()), None);
    assert_eq!(
        query.single_by_property(&admin, "save", Filter::new().parent()),
        Some(Value::from("serializable"))
    );
}

#[test]
fn static_and_instance_reads() {
    let mut reg = Registry::new();
    let cache = Token::new("perf.Cache");
    reg.identify(&cache, IdentifierOptions::new().with_single("ttl"));
    let b = base();

    reg.fork(&cache, Attachment::method(&b, "find").statics())
        .unwrap()
        .set(Record::new().with("ttl", 60))
        .unwrap();

    let query = reg.query(&cache).unwrap();
    assert_eq!(
        query.single_by_property(&b, "find", Filter::new()),
        Some(Value::from(60))
    );
    assert_eq!(
        query.single_by_property(&b, "find", Filter::new().instance()),
        None
    );
}

#[test]
fn plural_singles_skip_missing_keys() {
    let mut reg = Registry::new();
    let column = Token::new("orm.Column");
    reg.identify(&column, IdentifierOptions::new().with_single("name"));
    let b = base();

    for rec in [
        Record::new().with("name", "pk"),
        Record::new().with("nullable", false),
        Record::new().with("name", "primary"),
    ] {
        reg.fork(&column, Attachment::field(&b, "id"))
            .unwrap()
            .set(rec)
            .unwrap();
    }

    let query = reg.query(&column).unwrap();
    assert_eq!(query.values_by_property(&b, "id", Filter::new()).len(), 3);
    assert_eq!(
        query.singles_by_property(&b, "id", Filter::new()),
        vec![Value::from("pk"), Value::from("primary")]
    );
}

// =============================================================================
// Parameter Reads
// =============================================================================

#[test]
fn parameter_values_by_index() {
    let mut reg = Registry::new();
    let inject = Token::new("di.Inject");
    reg.identify(&inject, IdentifierOptions::new().with_single("token"));
    let b = base();

    reg.fork(&inject, Attachment::parameter(&b, "save", 0))
        .unwrap()
        .set(Record::new().with("token", "Db"))
        .unwrap();

    let query = reg.query(&inject).unwrap();
    assert_eq!(
        query.single_by_parameter(&b, "save", 0, Filter::new()),
        Some(Value::from("Db"))
    );
    assert_eq!(query.single_by_parameter(&b, "save", 3, Filter::new()), None);
    assert_eq!(query.single_by_parameter(&b, "id", 0, Filter::new()), None);
    assert_eq!(query.assigned_parameters(Filter::new()).len(), 1);
}

// =============================================================================
// Lookup Errors
// =============================================================================

#[test]
fn query_of_unknown_identifier() {
    let reg = Registry::new();
    let err = reg.query(&Token::new("nope.Missing")).unwrap_err();
    assert!(err.is(&ErrorKind::IdentifierNotFound(String::new())));
}

#[test]
fn query_through_alias() {
    let mut reg = Registry::new();
    let table = table(&mut reg);
    let entity = Token::new("orm.Entity");
    reg.alias(&entity, &table, None).unwrap();
    let b = base();

    reg.fork(&entity, Attachment::class(&b))
        .unwrap()
        .set(Record::new().with("name", "via alias"))
        .unwrap();

    assert_eq!(
        reg.query(&table).unwrap().single_by_class(&b, Filter::new()),
        Some(Value::from("via alias"))
    );
    assert_eq!(
        reg.query(&entity).unwrap().identifier().name(),
        "orm.Table"
    );
}
