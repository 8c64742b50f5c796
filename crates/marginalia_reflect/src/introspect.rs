//! Type introspection provider.

use std::fmt;

use marginalia_foundation::Type;

use crate::model::Body;

/// Declared type information of one member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberType {
    /// A field of the given type.
    Field(Type),
    /// A method with the given parameter types and optional return type.
    Method {
        /// Declared parameter types, in order.
        params: Vec<Type>,
        /// Declared return type.
        returns: Option<Type>,
    },
}

/// Reports declared member types for a class body.
///
/// Queried per field and per method when a literal body is available.
pub trait TypeIntrospector: fmt::Debug + Send + Sync {
    /// Returns the declared type of `member` in `body`, if known.
    fn type_of(&self, body: &Body, member: &str) -> Option<MemberType>;
}

/// Introspector that reads the types declared on the body itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredTypes;

impl TypeIntrospector for DeclaredTypes {
    fn type_of(&self, body: &Body, member: &str) -> Option<MemberType> {
        body.member(member).cloned()
    }
}

/// Introspector that never knows anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTypes;

impl TypeIntrospector for NoTypes {
    fn type_of(&self, _body: &Body, _member: &str) -> Option<MemberType> {
        None
    }
}
