//! Error types for the Marginalia system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! failure here is a configuration-time mistake by the caller; none is
//! retried or recovered from.

use std::fmt;

use thiserror::Error;

use crate::target::Target;

/// The main error type for Marginalia operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a target-not-allowed error.
    #[must_use]
    pub fn target_not_allowed(target: Target, class: impl Into<String>) -> Self {
        Self::new(ErrorKind::TargetNotAllowed {
            target,
            class: class.into(),
        })
    }

    /// Creates an identifier-not-found error.
    #[must_use]
    pub fn identifier_not_found(reference: impl Into<String>) -> Self {
        Self::new(ErrorKind::IdentifierNotFound(reference.into()))
    }

    /// Creates an alias-not-found error.
    #[must_use]
    pub fn alias_not_found(reference: impl Into<String>) -> Self {
        Self::new(ErrorKind::AliasNotFound(reference.into()))
    }

    /// Creates a single-not-supported error.
    #[must_use]
    pub fn single_not_supported(identifier: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::new(ErrorKind::SingleNotSupported {
            identifier: identifier.into(),
            owner: owner.into(),
        })
    }

    /// Creates an invalid-target error for a mismatched instance view.
    #[must_use]
    pub fn invalid_target(target: Target, expected: Target, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTarget {
            target,
            expected,
            description: description.into(),
        })
    }

    /// Returns true if this error is of the given kind, ignoring payloads.
    #[must_use]
    pub fn is(&self, other: &ErrorKind) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(other)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A reference is neither a known identifier token nor an identifier of this registry.
    #[error("invalid decorator reference: {0}")]
    InvalidDecoratorReference(String),

    /// A class reference has an unsupported shape or does not resolve.
    #[error("invalid class reference: {0}")]
    InvalidClassReference(String),

    /// Strict class lookup missed.
    #[error("class not found: {0}")]
    ClassNotFound(String),

    /// The identifier's target flags forbid this attachment site.
    #[error("target not allowed: {target} on {class}")]
    TargetNotAllowed {
        /// The resolved target kind.
        target: Target,
        /// The class being attached to.
        class: String,
    },

    /// A member-level attachment has no member name.
    #[error("property name empty: {target} on {class}")]
    PropertyNameEmpty {
        /// The resolved target kind.
        target: Target,
        /// The class being attached to.
        class: String,
    },

    /// A method attachment carries no callable.
    #[error("method body empty: {target} on {class}")]
    MethodBodyEmpty {
        /// The resolved target kind.
        target: Target,
        /// The class being attached to.
        class: String,
    },

    /// The identifier is `not_static` but was attached to a static member.
    #[error("not used for static member: {target} on {class}")]
    NotUsedForStaticMember {
        /// The resolved target kind.
        target: Target,
        /// The class being attached to.
        class: String,
    },

    /// The identifier is `not_instance` but was attached to an instance member.
    #[error("not used for instance member: {target} on {class}")]
    NotUsedForInstanceMember {
        /// The resolved target kind.
        target: Target,
        /// The class being attached to.
        class: String,
    },

    /// Scalar extraction was requested on an identifier without a `single` key.
    #[error("single not supported: {identifier} on {owner}")]
    SingleNotSupported {
        /// The identifier name.
        identifier: String,
        /// Description of the element being read.
        owner: String,
    },

    /// Strict identifier lookup missed or found an alias.
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    /// Strict alias lookup missed or found an identifier.
    #[error("alias not found: {0}")]
    AliasNotFound(String),

    /// An identifier must be declared by a token.
    #[error("identifier should be function: {0}")]
    IdentifierShouldBeFunction(String),

    /// An alias must be declared by a token.
    #[error("alias should be function: {0}")]
    AliasShouldBeFunction(String),

    /// An alias condition must be callable.
    #[error("condition should be function: {0}")]
    ConditionShouldBeFunction(String),

    /// An alias must reference a token that is already an identifier.
    #[error("referenced function should be decorator: {0}")]
    ReferencedFunctionShouldBeDecorator(String),

    /// An instance was viewed as a target kind it is not.
    #[error("invalid target: {target}, expected {expected} for {description}")]
    InvalidTarget {
        /// The instance's actual target kind.
        target: Target,
        /// The target kind that was asked for.
        expected: Target,
        /// Description of the element the instance was applied to.
        description: String,
    },

    /// A property keyword was neither instance nor static.
    #[error("invalid keyword: {class}.{property}")]
    InvalidKeyword {
        /// The owning class.
        class: String,
        /// The property name.
        property: String,
    },

    /// A parameter index lies beyond the method's known arity.
    #[error("parameter out of range: {property} has {arity} parameters, got index {index}")]
    ParameterOutOfRange {
        /// Description of the method.
        property: String,
        /// The requested index.
        index: usize,
        /// The method's declared arity.
        arity: usize,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Description of the element or entity that raised the error.
    pub source: Option<String>,
    /// Extra named details.
    pub details: Vec<(String, String)>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source description.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a named detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.details.push((key.into(), value.to_string()));
        self
    }

    /// Looks up a detail by name.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        for (key, value) in &self.details {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}
