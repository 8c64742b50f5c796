//! Arena identifiers.
//!
//! Every reflected element, identifier, alias, and instance lives in a
//! registry-owned arena and is referred to by a small `Copy` index. Parent
//! links (class parent, property proto) are stored as these indices, so the
//! reflection graph never holds owning pointers back into itself.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Creates an id from a raw arena index.
            #[must_use]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Creates the id for the next slot of an arena holding `len` items.
            ///
            /// # Panics
            ///
            /// Panics if the arena grows past `u32::MAX` entries.
            #[must_use]
            pub fn next(len: usize) -> Self {
                Self(u32::try_from(len).expect(concat!("too many ", $tag, " entries")))
            }

            /// Returns the raw arena index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $tag, self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a class reflect.
    ClassId,
    "class"
);
arena_id!(
    /// Index of a property (method or field) reflect.
    PropertyId,
    "property"
);
arena_id!(
    /// Index of a parameter reflect.
    ParameterId,
    "parameter"
);
arena_id!(
    /// Index of an annotation identifier.
    IdentifierId,
    "identifier"
);
arena_id!(
    /// Index of an annotation alias.
    AliasId,
    "alias"
);
arena_id!(
    /// Index of an annotation instance (one attachment event).
    InstanceId,
    "instance"
);
