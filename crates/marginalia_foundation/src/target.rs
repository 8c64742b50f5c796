//! Structural sites an annotation can be attached to.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Target kind of an attachment or a reflected element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Target {
    /// Target is a class.
    Class,
    /// Target is a method (the member holds a callable).
    Method,
    /// Target is a field (the member does not hold a callable).
    Field,
    /// Target is a formal parameter of a method.
    Parameter,
}

impl Target {
    /// All four target kinds, in declaration order.
    pub const ALL: [Target; 4] = [Self::Class, Self::Method, Self::Field, Self::Parameter];

    /// Returns the lowercase name of this target.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Field => "field",
            Self::Parameter => "parameter",
        }
    }

    /// Returns true for the member-level targets (method or field).
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::Method | Self::Field)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
