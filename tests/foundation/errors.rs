//! Integration tests for Error types
//!
//! Tests error construction, display, context, and kind matching.

use marginalia_foundation::{Error, ErrorContext, ErrorKind, Target};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_target_not_allowed() {
    let err = Error::target_not_allowed(Target::Parameter, "sample.User");
    assert!(matches!(
        err.kind,
        ErrorKind::TargetNotAllowed {
            target: Target::Parameter,
            ..
        }
    ));
    let msg = format!("{err}");
    assert!(msg.contains("parameter"));
    assert!(msg.contains("sample.User"));
}

#[test]
fn error_identifier_not_found() {
    let err = Error::identifier_not_found("orm.Missing");
    assert!(matches!(err.kind, ErrorKind::IdentifierNotFound(_)));
    assert!(format!("{err}").contains("orm.Missing"));
}

#[test]
fn error_alias_not_found() {
    let err = Error::alias_not_found("orm.Col");
    assert!(matches!(err.kind, ErrorKind::AliasNotFound(_)));
}

#[test]
fn error_single_not_supported() {
    let err = Error::single_not_supported("orm.Column", "<class>sample.User");
    let msg = format!("{err}");
    assert!(msg.contains("orm.Column"));
    assert!(msg.contains("<class>sample.User"));
}

#[test]
fn error_invalid_target() {
    let err = Error::invalid_target(Target::Class, Target::Method, "<class>sample.User");
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidTarget {
            target: Target::Class,
            expected: Target::Method,
            ..
        }
    ));
}

#[test]
fn error_parameter_out_of_range() {
    let err = Error::new(ErrorKind::ParameterOutOfRange {
        property: "<method>sample.User.greet".into(),
        index: 3,
        arity: 1,
    });
    let msg = format!("{err}");
    assert!(msg.contains("sample.User.greet"));
    assert!(msg.contains("index 3"));
}

// =============================================================================
// Kind Matching
// =============================================================================

#[test]
fn is_ignores_payload() {
    let err = Error::new(ErrorKind::ClassNotFound("sample.User".into()));
    assert!(err.is(&ErrorKind::ClassNotFound(String::new())));
    assert!(!err.is(&ErrorKind::InvalidClassReference(String::new())));
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn context_details() {
    let ctx = ErrorContext::new()
        .with_source("<identifier>orm.Column")
        .with_detail("usage", "orm.Column.fork on <class>sample.User");
    let err = Error::target_not_allowed(Target::Class, "sample.User").with_context(ctx);

    let ctx = err.context.as_ref().unwrap();
    assert_eq!(ctx.source.as_deref(), Some("<identifier>orm.Column"));
    assert_eq!(
        ctx.detail("usage"),
        Some("orm.Column.fork on <class>sample.User")
    );
    assert_eq!(ctx.detail("missing"), None);
}

#[test]
fn context_display() {
    let ctx = ErrorContext::new().with_source("here").with_detail("k", 1);
    assert_eq!(ctx.to_string(), "at here k=1");
}
