//! Filter dimensions for reflection queries.
//!
//! Every dimension is optional. An unset dimension always passes; a set one
//! must match exactly.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selects which decorator values of an element are visible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Belongs {
    /// Only values stored on the element itself.
    Own,
    /// Only values resolved from the parent (class parent or property proto).
    Parent,
}

/// Selects owned or inherited properties of a class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scope {
    /// Declared by the class itself.
    Owned,
    /// Declared by an ancestor.
    Inherited,
}

/// Static or instance membership of a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Keyword {
    /// Member of each instance.
    Instance,
    /// Member of the class itself.
    Static,
}

/// Field or method classification of a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kind {
    /// Holds data.
    Field,
    /// Holds a callable.
    Method,
}

impl Keyword {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Static => "static",
        }
    }
}

impl Kind {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A combined query filter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Filter {
    /// Decorator visibility.
    pub belongs: Option<Belongs>,
    /// Property ownership.
    pub scope: Option<Scope>,
    /// Property membership.
    pub keyword: Option<Keyword>,
    /// Property classification.
    pub kind: Option<Kind>,
}

impl Filter {
    /// Creates a filter with every dimension unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            belongs: None,
            scope: None,
            keyword: None,
            kind: None,
        }
    }

    /// Sets the belongs dimension.
    #[must_use]
    pub const fn with_belongs(mut self, belongs: Belongs) -> Self {
        self.belongs = Some(belongs);
        self
    }

    /// Sets the scope dimension.
    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the keyword dimension.
    #[must_use]
    pub const fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    /// Sets the kind dimension.
    #[must_use]
    pub const fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Only values stored on the element itself.
    #[must_use]
    pub const fn own(self) -> Self {
        self.with_belongs(Belongs::Own)
    }

    /// Only values resolved from the parent.
    #[must_use]
    pub const fn parent(self) -> Self {
        self.with_belongs(Belongs::Parent)
    }

    /// Only properties declared by the class itself.
    #[must_use]
    pub const fn owned(self) -> Self {
        self.with_scope(Scope::Owned)
    }

    /// Only properties declared by an ancestor.
    #[must_use]
    pub const fn inherited(self) -> Self {
        self.with_scope(Scope::Inherited)
    }

    /// Only instance members.
    #[must_use]
    pub const fn instance(self) -> Self {
        self.with_keyword(Keyword::Instance)
    }

    /// Only static members.
    #[must_use]
    pub const fn statics(self) -> Self {
        self.with_keyword(Keyword::Static)
    }

    /// Only fields.
    #[must_use]
    pub const fn fields(self) -> Self {
        self.with_kind(Kind::Field)
    }

    /// Only methods.
    #[must_use]
    pub const fn methods(self) -> Self {
        self.with_kind(Kind::Method)
    }

    /// Returns this filter with the scope dimension cleared.
    #[must_use]
    pub const fn without_scope(mut self) -> Self {
        self.scope = None;
        self
    }
}
