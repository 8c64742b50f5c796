//! Attachment descriptors.
//!
//! An attachment names the site an identifier is applied to. The target kind
//! is part of the descriptor rather than inferred from its shape.

use std::sync::Arc;

use marginalia_foundation::Target;
use marginalia_reflect::{Body, Callable, Constructor, Keyword, Object};

/// The site an attachment points at, within its class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Site {
    /// The class itself.
    Class,
    /// A method, with its callable when the caller has one.
    Method {
        /// Member name.
        name: Arc<str>,
        /// Explicit callable; otherwise looked up from the class declaration.
        callable: Option<Callable>,
    },
    /// A field.
    Field {
        /// Member name.
        name: Arc<str>,
    },
    /// A formal parameter of a method.
    Parameter {
        /// Method name.
        name: Arc<str>,
        /// Zero-based parameter position.
        index: usize,
    },
}

impl Site {
    /// Returns the target kind of this site.
    #[must_use]
    pub fn target(&self) -> Target {
        match self {
            Self::Class => Target::Class,
            Self::Method { .. } => Target::Method,
            Self::Field { .. } => Target::Field,
            Self::Parameter { .. } => Target::Parameter,
        }
    }

    /// Returns the member name for member and parameter sites.
    #[must_use]
    pub fn member(&self) -> Option<&str> {
        match self {
            Self::Class => None,
            Self::Method { name, .. } | Self::Field { name } | Self::Parameter { name, .. } => {
                Some(&**name)
            }
        }
    }
}

/// Where and how an identifier is applied.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub(crate) class: Constructor,
    pub(crate) keyword: Keyword,
    pub(crate) body: Option<Arc<Body>>,
    pub(crate) site: Site,
}

impl Attachment {
    fn on(class: &Constructor, site: Site) -> Self {
        Self {
            class: class.clone(),
            keyword: Keyword::Instance,
            body: None,
            site,
        }
    }

    /// Attaches to the class itself.
    #[must_use]
    pub fn class(class: &Constructor) -> Self {
        Self::on(class, Site::Class).with_keyword(Keyword::Static)
    }

    /// Attaches to an instance method.
    ///
    /// The callable is taken from the class declaration unless one is given
    /// with [`Attachment::with_callable`].
    #[must_use]
    pub fn method(class: &Constructor, name: impl Into<Arc<str>>) -> Self {
        Self::on(
            class,
            Site::Method {
                name: name.into(),
                callable: None,
            },
        )
    }

    /// Attaches to an instance field.
    #[must_use]
    pub fn field(class: &Constructor, name: impl Into<Arc<str>>) -> Self {
        Self::on(class, Site::Field { name: name.into() })
    }

    /// Attaches to a parameter of an instance method.
    #[must_use]
    pub fn parameter(class: &Constructor, name: impl Into<Arc<str>>, index: usize) -> Self {
        Self::on(
            class,
            Site::Parameter {
                name: name.into(),
                index,
            },
        )
    }

    /// Re-targets the attachment at a static member.
    #[must_use]
    pub fn statics(self) -> Self {
        self.with_keyword(Keyword::Static)
    }

    /// Sets the member keyword.
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = keyword;
        self
    }

    /// Supplies the method's callable.
    #[must_use]
    pub fn with_callable(mut self, callable: Callable) -> Self {
        if let Site::Method { callable: slot, .. } = &mut self.site {
            *slot = Some(callable);
        }
        self
    }

    /// Supplies the literal class body used for type discovery.
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    /// Takes the class and body from an instance.
    #[must_use]
    pub fn with_object(mut self, object: &Object) -> Self {
        self.class = object.constructor().clone();
        self.body = object.body().cloned();
        self
    }

    /// Returns the class being attached to.
    #[must_use]
    pub fn constructor(&self) -> &Constructor {
        &self.class
    }

    /// Returns the member keyword.
    #[must_use]
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    /// Returns the site.
    #[must_use]
    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Returns the target kind.
    #[must_use]
    pub fn target(&self) -> Target {
        self.site.target()
    }

    /// Resolves the method callable: explicit, then declared, then from the body.
    pub(crate) fn callable(&self) -> Option<Callable> {
        let name = match &self.site {
            Site::Method {
                callable: Some(c), ..
            } => return Some(c.clone()),
            Site::Method { name, .. } | Site::Parameter { name, .. } => name,
            Site::Class | Site::Field { .. } => return None,
        };
        let declared = match self.keyword {
            Keyword::Instance => self.class.instance_members(),
            Keyword::Static => self.class.static_members(),
        };
        declared
            .iter()
            .find(|m| m.name == *name)
            .and_then(|m| m.callable().cloned())
            .or_else(|| self.body.as_deref().and_then(|b| b.callable(name)))
    }
}
