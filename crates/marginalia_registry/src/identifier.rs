//! Annotation identifiers and aliases.

use std::fmt;
use std::sync::Arc;

use marginalia_foundation::{AliasId, IdentifierId, InstanceId, Record, Target, Token, Value};
use marginalia_reflect::{DecoratorRule, ReflectStore};

use crate::attachment::{Attachment, Site};
use crate::options::IdentifierOptions;

/// A declared kind of annotation.
///
/// Identity is the declaring [`Token`]. Everything but the instance list is
/// fixed at creation.
#[derive(Clone, Debug)]
pub struct Identifier {
    pub(crate) id: IdentifierId,
    pub(crate) token: Token,
    pub(crate) options: IdentifierOptions,
    pub(crate) instances: Vec<InstanceId>,
}

impl Identifier {
    pub(crate) fn new(id: IdentifierId, token: Token, options: IdentifierOptions) -> Self {
        Self {
            id,
            token,
            options: options.normalized(),
            instances: Vec::new(),
        }
    }

    /// Returns the arena id.
    #[must_use]
    pub fn id(&self) -> IdentifierId {
        self.id
    }

    /// Returns the declaring token.
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.token.name()
    }

    /// Returns `<identifier>{name}`.
    #[must_use]
    pub fn description(&self) -> String {
        format!("<identifier>{}", self.name())
    }

    /// Returns the normalized options.
    #[must_use]
    pub fn options(&self) -> &IdentifierOptions {
        &self.options
    }

    /// Returns true if the identifier may be attached to `target`.
    #[must_use]
    pub fn allows(&self, target: Target) -> bool {
        self.options.allows(target)
    }

    /// Returns the scalar extraction key.
    #[must_use]
    pub fn single(&self) -> Option<&str> {
        self.options.single.as_deref()
    }

    /// Returns every instance forked from this identifier, oldest first.
    #[must_use]
    pub fn instances(&self) -> &[InstanceId] {
        &self.instances
    }

    pub(crate) fn rule(&self) -> DecoratorRule {
        DecoratorRule {
            name: Arc::from(self.name()),
            not_multiple: self.options.not_multiple,
            not_inheritor: self.options.not_inheritor,
            single: self.options.single.clone(),
        }
    }

    /// Describes a use of this identifier's `field` at an attachment site.
    #[must_use]
    pub fn usage_name(&self, field: &str, attachment: &Attachment) -> String {
        let class = attachment.constructor().name();
        let keyword = attachment.keyword();
        match attachment.site() {
            Site::Class => format!("{}.{field} on <class>{class}", self.name()),
            Site::Method { name, .. } => {
                format!("{}.{field} on <method>{class}::{name}[{keyword}]", self.name())
            }
            Site::Field { name } => {
                format!("{}.{field} on <field>{class}::{name}[{keyword}]", self.name())
            }
            Site::Parameter { name, index } => format!(
                "{}.{field} on <parameter>{class}::{name}[{keyword}] #{index}",
                self.name()
            ),
        }
    }

    /// Exports the identifier as a record.
    #[must_use]
    pub fn info(&self, detailed: bool) -> Record {
        let rec = Record::new().with("name", self.name());
        if detailed {
            rec.with("options", self.options.to_record())
                .with("instances", self.instances.len())
        } else {
            rec
        }
    }
}

/// Predicate over a stored value, kept for discriminating aliases.
pub type AliasCondition = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// A secondary token forwarding to an existing identifier.
#[derive(Clone)]
pub struct Alias {
    pub(crate) id: AliasId,
    pub(crate) token: Token,
    pub(crate) identifier: IdentifierId,
    pub(crate) condition: Option<AliasCondition>,
}

impl Alias {
    /// Returns the arena id.
    #[must_use]
    pub fn id(&self) -> AliasId {
        self.id
    }

    /// Returns the declaring token.
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.token.name()
    }

    /// Returns `<alias>{name}`.
    #[must_use]
    pub fn description(&self) -> String {
        format!("<alias>{}", self.name())
    }

    /// Returns the identifier this alias forwards to.
    #[must_use]
    pub fn identifier(&self) -> IdentifierId {
        self.identifier
    }

    /// Returns the stored discriminating predicate.
    ///
    /// No read path consults it.
    #[must_use]
    pub fn condition(&self) -> Option<&AliasCondition> {
        self.condition.as_ref()
    }

    /// Exports the alias as a record linking its identifier.
    #[must_use]
    pub fn info(&self, identifier: &Identifier) -> Record {
        Record::new()
            .with("name", self.name())
            .with(
                "identifier",
                Value::from(ReflectStore::reference(identifier.description())),
            )
    }
}

impl fmt::Debug for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alias")
            .field("id", &self.id)
            .field("token", &self.token)
            .field("identifier", &self.identifier)
            .field("condition", &self.condition.as_ref().map(|_| ".."))
            .finish()
    }
}
