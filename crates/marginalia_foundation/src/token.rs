//! Declaring tokens.
//!
//! A [`Token`] stands in for the function that declares an annotation
//! identifier or alias. Two tokens are the same token only if they come from
//! the same allocation; the name is a label and may collide.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug)]
struct TokenInner {
    name: Arc<str>,
    arity: usize,
}

/// Identity of a declaring function.
///
/// Cloning is O(1) and preserves identity.
#[derive(Clone)]
pub struct Token(Arc<TokenInner>);

impl Token {
    /// Creates a new token with the given fully-qualified name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_arity(name, 0)
    }

    /// Creates a new token for a declaring function taking `arity` arguments.
    #[must_use]
    pub fn with_arity(name: impl Into<Arc<str>>, arity: usize) -> Self {
        Self(Arc::new(TokenInner {
            name: name.into(),
            arity,
        }))
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the declared arity of the declaring function.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.arity
    }

    /// Returns the name, optionally decorated with the call signature.
    #[must_use]
    pub fn signed(&self, with_signature: bool) -> String {
        if with_signature {
            format!("{}/{}", self.0.name, self.0.arity)
        } else {
            self.0.name.to_string()
        }
    }

    /// Returns true if both tokens come from the same allocation.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0.name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
