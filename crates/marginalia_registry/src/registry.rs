//! The registry: identifier directory plus the reflection graph.
//!
//! A [`Registry`] is an explicitly constructed context. Annotation happens in
//! a build phase of ordinary calls ([`Registry::identify`],
//! [`Registry::fork`], [`Forked::set`]); the read phase goes through
//! [`Registry::query`] and the reflect views.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use marginalia_foundation::{
    AliasId, ClassId, Error, ErrorContext, ErrorKind, IdentifierId, InstanceId, Record, Result,
    Target, Token, Value,
};
use marginalia_reflect::{
    Body, ClassRef, ClassView, ElementRef, Filter, Keyword, Kind, ReflectStore, Reflected, Touch,
};
use tracing::{debug, info, warn};

use crate::attachment::{Attachment, Site};
use crate::config::RegistryConfig;
use crate::identifier::{Alias, AliasCondition, Identifier};
use crate::instance::{Forked, Instance, InstanceView};
use crate::options::IdentifierOptions;
use crate::query::IdentifierQuery;

/// Any of the shapes an identifier can be referred to by.
#[derive(Copy, Clone, Debug)]
pub enum DecoRef<'a> {
    /// The declaring token of an identifier or alias.
    Token(&'a Token),
    /// A registered identifier or alias name.
    Name(&'a str),
    /// An identifier id.
    Id(IdentifierId),
}

impl<'a> From<&'a Token> for DecoRef<'a> {
    fn from(token: &'a Token) -> Self {
        Self::Token(token)
    }
}

impl<'a> From<&'a str> for DecoRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<IdentifierId> for DecoRef<'_> {
    fn from(id: IdentifierId) -> Self {
        Self::Id(id)
    }
}

impl std::fmt::Display for DecoRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(t) => write!(f, "{t}"),
            Self::Name(n) => f.write_str(n),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// What a directory name currently points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum NameEntry {
    Identifier(IdentifierId),
    Alias(AliasId),
}

/// Owner of identifiers, aliases, instances, and reflects.
#[derive(Debug)]
pub struct Registry {
    config: RegistryConfig,
    store: ReflectStore,
    identifiers: Vec<Identifier>,
    aliases: Vec<Alias>,
    instances: Vec<Instance>,
    identifier_tokens: HashMap<Token, IdentifierId>,
    alias_tokens: HashMap<Token, AliasId>,
    names: BTreeMap<Arc<str>, NameEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            store: config.store(),
            config,
            identifiers: Vec::new(),
            aliases: Vec::new(),
            instances: Vec::new(),
            identifier_tokens: HashMap::new(),
            alias_tokens: HashMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the reflect store.
    #[must_use]
    pub fn store(&self) -> &ReflectStore {
        &self.store
    }

    fn claim_name(&mut self, name: &str, entry: NameEntry) {
        let previous = self.names.insert(Arc::from(name), entry);
        if self.config.warn_on_name_collision && previous.is_some_and(|p| p != entry) {
            warn!(
                target: "marginalia::registry",
                name,
                "name already registered, last registration wins"
            );
        }
    }

    // =========================================================================
    // Identifiers and aliases
    // =========================================================================

    /// Declares `token` as an identifier.
    ///
    /// Idempotent: a token that already declares an identifier returns it
    /// unchanged, and an alias token returns the identifier it forwards to.
    pub fn identify(&mut self, token: &Token, options: IdentifierOptions) -> IdentifierId {
        if let Some(&id) = self.identifier_tokens.get(token) {
            return id;
        }
        if let Some(&alias) = self.alias_tokens.get(token) {
            return self.aliases[alias.index()].identifier;
        }

        let id = IdentifierId::next(self.identifiers.len());
        let identifier = Identifier::new(id, token.clone(), options);
        self.store.declare(id, identifier.rule());
        self.identifiers.push(identifier);
        self.identifier_tokens.insert(token.clone(), id);
        self.claim_name(token.name(), NameEntry::Identifier(id));
        info!(
            target: "marginalia::registry",
            identifier = token.name(),
            "identifier registered"
        );
        id
    }

    /// Declares `token` as an alias of an existing identifier.
    ///
    /// The condition is stored but not consulted by any read.
    ///
    /// # Errors
    ///
    /// - `IdentifierShouldBeFunction` if `identifier` is a bare name
    /// - `ReferencedFunctionShouldBeDecorator` if the token is not an identifier
    /// - `InvalidDecoratorReference` if the id is not in this registry
    pub fn alias<'a>(
        &mut self,
        token: &Token,
        identifier: impl Into<DecoRef<'a>>,
        condition: Option<AliasCondition>,
    ) -> Result<IdentifierId> {
        let target = match identifier.into() {
            DecoRef::Name(name) => {
                return Err(Error::new(ErrorKind::IdentifierShouldBeFunction(
                    name.to_string(),
                )));
            }
            DecoRef::Token(t) => self.identifier_tokens.get(t).copied().ok_or_else(|| {
                Error::new(ErrorKind::ReferencedFunctionShouldBeDecorator(
                    t.name().to_string(),
                ))
            })?,
            DecoRef::Id(id) => self.checked(id)?,
        };

        if let Some(&alias) = self.alias_tokens.get(token) {
            return Ok(self.aliases[alias.index()].identifier);
        }
        if let Some(&id) = self.identifier_tokens.get(token) {
            return Ok(id);
        }

        let id = AliasId::next(self.aliases.len());
        self.aliases.push(Alias {
            id,
            token: token.clone(),
            identifier: target,
            condition,
        });
        self.alias_tokens.insert(token.clone(), id);
        self.claim_name(token.name(), NameEntry::Alias(id));
        info!(
            target: "marginalia::registry",
            alias = token.name(),
            identifier = self.identifiers[target.index()].name(),
            "alias registered"
        );
        Ok(target)
    }

    fn checked(&self, id: IdentifierId) -> Result<IdentifierId> {
        if id.index() < self.identifiers.len() {
            Ok(id)
        } else {
            Err(Error::new(ErrorKind::InvalidDecoratorReference(id.to_string())))
        }
    }

    /// Resolves a reference to an identifier, following aliases.
    #[must_use]
    pub fn lookup<'a>(&self, reference: impl Into<DecoRef<'a>>) -> Option<IdentifierId> {
        match reference.into() {
            DecoRef::Token(t) => self.identifier_tokens.get(t).copied().or_else(|| {
                self.alias_tokens
                    .get(t)
                    .map(|a| self.aliases[a.index()].identifier)
            }),
            DecoRef::Name(n) => self.names.get(n).map(|entry| match *entry {
                NameEntry::Identifier(id) => id,
                NameEntry::Alias(a) => self.aliases[a.index()].identifier,
            }),
            DecoRef::Id(id) => self.checked(id).ok(),
        }
    }

    /// Resolves a reference to an identifier, following aliases.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDecoratorReference` for an id outside this registry
    /// and `IdentifierNotFound` for an unknown token or name.
    pub fn get<'a>(&self, reference: impl Into<DecoRef<'a>>) -> Result<IdentifierId> {
        let reference = reference.into();
        match reference {
            DecoRef::Id(id) => self.checked(id),
            _ => self
                .lookup(reference)
                .ok_or_else(|| Error::identifier_not_found(reference.to_string())),
        }
    }

    /// Returns the identifier a reference names directly.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierNotFound` if the reference is unknown or names an alias.
    pub fn get_identifier<'a>(&self, reference: impl Into<DecoRef<'a>>) -> Result<&Identifier> {
        let reference = reference.into();
        let id = match reference {
            DecoRef::Token(t) => self.identifier_tokens.get(t).copied(),
            DecoRef::Name(n) => match self.names.get(n) {
                Some(NameEntry::Identifier(id)) => Some(*id),
                _ => None,
            },
            DecoRef::Id(id) => self.checked(id).ok(),
        };
        id.map(|id| &self.identifiers[id.index()])
            .ok_or_else(|| Error::identifier_not_found(reference.to_string()))
    }

    /// Returns the alias a reference names directly.
    ///
    /// # Errors
    ///
    /// Returns `AliasNotFound` if the reference is unknown or names an identifier.
    pub fn get_alias<'a>(&self, reference: impl Into<DecoRef<'a>>) -> Result<&Alias> {
        let reference = reference.into();
        let id = match reference {
            DecoRef::Token(t) => self.alias_tokens.get(t).copied(),
            DecoRef::Name(n) => match self.names.get(n) {
                Some(NameEntry::Alias(a)) => Some(*a),
                _ => None,
            },
            DecoRef::Id(_) => None,
        };
        id.map(|a| &self.aliases[a.index()])
            .ok_or_else(|| Error::alias_not_found(reference.to_string()))
    }

    /// Returns true if the reference names an identifier or an alias.
    #[must_use]
    pub fn is<'a>(&self, reference: impl Into<DecoRef<'a>>) -> bool {
        self.lookup(reference).is_some()
    }

    /// Returns true if the reference names an identifier.
    #[must_use]
    pub fn is_identifier<'a>(&self, reference: impl Into<DecoRef<'a>>) -> bool {
        self.get_identifier(reference).is_ok()
    }

    /// Returns true if the reference names an alias.
    #[must_use]
    pub fn is_alias<'a>(&self, reference: impl Into<DecoRef<'a>>) -> bool {
        self.get_alias(reference).is_ok()
    }

    /// Returns an identifier by id.
    #[must_use]
    pub fn identifier(&self, id: IdentifierId) -> Option<&Identifier> {
        self.identifiers.get(id.index())
    }

    /// Iterates identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.identifiers.iter()
    }

    /// Iterates aliases in registration order.
    pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter()
    }

    /// Describes a use of an identifier's `field` at an attachment site.
    ///
    /// # Errors
    ///
    /// Fails as [`Registry::get`] does.
    pub fn usage_name<'a>(
        &self,
        reference: impl Into<DecoRef<'a>>,
        field: &str,
        attachment: &Attachment,
    ) -> Result<String> {
        let id = self.get(reference)?;
        Ok(self.identifiers[id.index()].usage_name(field, attachment))
    }

    // =========================================================================
    // Attachment
    // =========================================================================

    /// Applies an identifier at `attachment`, creating any missing reflects.
    ///
    /// The returned handle stores the instance's value with [`Forked::set`].
    ///
    /// # Errors
    ///
    /// Checked in order:
    /// - `TargetNotAllowed` if the identifier forbids the target kind
    /// - `PropertyNameEmpty` if a member site has no name
    /// - `MethodBodyEmpty` if a method site has no callable
    /// - `NotUsedForStaticMember` / `NotUsedForInstanceMember` if the member
    ///   keyword is excluded
    ///
    /// A class reflect created here, along with its declared members, starts
    /// out touched by this instance. Registration then fails with
    /// `InvalidTarget` if the member exists with the other kind, or
    /// `ParameterOutOfRange` if a parameter index is past the method's known
    /// arity.
    ///
    /// Reference errors are those of [`Registry::get`].
    pub fn fork<'a>(
        &mut self,
        reference: impl Into<DecoRef<'a>>,
        attachment: Attachment,
    ) -> Result<Forked<'_>> {
        let identifier = self.get(reference)?;
        self.validate(identifier, &attachment)?;

        let instance = InstanceId::next(self.instances.len());
        let touch = Touch {
            instance,
            identifier,
        };
        let class = self.store.register_class(
            &attachment.class,
            attachment.body.clone(),
            Some(touch),
        );
        let element = match &attachment.site {
            Site::Class => ElementRef::Class(class),
            Site::Method { name, .. } => ElementRef::Property(self.store.register_property(
                class,
                Arc::clone(name),
                attachment.keyword,
                Kind::Method,
                attachment.callable(),
            )?),
            Site::Field { name } => ElementRef::Property(self.store.register_property(
                class,
                Arc::clone(name),
                attachment.keyword,
                Kind::Field,
                None,
            )?),
            Site::Parameter { name, index } => {
                let method = self.store.register_property(
                    class,
                    Arc::clone(name),
                    attachment.keyword,
                    Kind::Method,
                    attachment.callable(),
                )?;
                ElementRef::Parameter(self.store.ensure_parameter(method, *index)?)
            }
        };
        self.store.touch(element, touch)?;

        let record = Instance {
            id: instance,
            identifier,
            target: attachment.target(),
            element,
        };
        self.instances.push(record);
        self.identifiers[identifier.index()].instances.push(instance);
        debug!(
            target: "marginalia::registry",
            identifier = self.identifiers[identifier.index()].name(),
            element = %self.store.describe(element),
            "instance forked"
        );
        Ok(Forked::new(self, record))
    }

    fn validate(&self, id: IdentifierId, attachment: &Attachment) -> Result<()> {
        let identifier = &self.identifiers[id.index()];
        let options = identifier.options();
        let target = attachment.target();
        let class = attachment.constructor().name().to_string();
        let context = || {
            ErrorContext::new()
                .with_source(identifier.description())
                .with_detail("usage", identifier.usage_name("fork", attachment))
        };

        if !options.allows(target) {
            return Err(Error::target_not_allowed(target, class).with_context(context()));
        }
        if target != Target::Class && attachment.site().member().is_none_or(str::is_empty) {
            return Err(
                Error::new(ErrorKind::PropertyNameEmpty { target, class }).with_context(context())
            );
        }
        if target == Target::Method && attachment.callable().is_none() {
            return Err(
                Error::new(ErrorKind::MethodBodyEmpty { target, class }).with_context(context())
            );
        }
        if target.is_member() {
            match attachment.keyword() {
                Keyword::Static if options.not_static => {
                    return Err(Error::new(ErrorKind::NotUsedForStaticMember { target, class })
                        .with_context(context()));
                }
                Keyword::Instance if options.not_instance => {
                    return Err(Error::new(ErrorKind::NotUsedForInstanceMember {
                        target,
                        class,
                    })
                    .with_context(context()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns an instance by id.
    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<InstanceView<'_>> {
        self.instances
            .get(id.index())
            .map(|i| InstanceView::new(self, *i))
    }

    /// Iterates every instance in fork order.
    pub fn instances(&self) -> impl Iterator<Item = InstanceView<'_>> {
        self.instances.iter().map(|i| InstanceView::new(self, *i))
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Stores `value` on `element` under an identifier.
    ///
    /// # Errors
    ///
    /// Fails as [`Registry::get`] does, or if `element` is not in this registry.
    pub fn set_value<'a>(
        &mut self,
        element: ElementRef,
        reference: impl Into<DecoRef<'a>>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let id = self.get(reference)?;
        self.store.set_value(element, id, value)
    }

    /// Stores `value` on `element` under the identifier that last touched it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDecoratorReference` if nothing has touched `element`.
    pub fn set_last(&mut self, element: ElementRef, value: impl Into<Value>) -> Result<()> {
        let touch = self.store.touch_of(element).ok_or_else(|| {
            Error::new(ErrorKind::InvalidDecoratorReference(
                self.store.describe(element),
            ))
        })?;
        self.store.set_value(element, touch.identifier, value)
    }

    /// Returns the read-side query family for an identifier.
    ///
    /// # Errors
    ///
    /// Fails as [`Registry::get`] does.
    pub fn query<'a>(&self, reference: impl Into<DecoRef<'a>>) -> Result<IdentifierQuery<'_>> {
        let id = self.get(reference)?;
        Ok(IdentifierQuery::new(self, &self.identifiers[id.index()]))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Returns the class reflect for `class`, creating it for a constructor
    /// or instance on first use.
    ///
    /// `body` only applies when the reflect is created here.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClassReference` for a name or id that is not registered.
    pub fn class<'a>(
        &mut self,
        class: impl Into<ClassRef<'a>>,
        body: Option<Body>,
    ) -> Result<ClassId> {
        let body = body.map(Arc::new);
        match class.into() {
            ClassRef::Constructor(c) => Ok(self.store.register_class(c, body, None)),
            ClassRef::Object(o) => {
                let body = body.or_else(|| o.body().cloned());
                Ok(self.store.register_class(o.constructor(), body, None))
            }
            reference @ (ClassRef::Name(_) | ClassRef::Id(_)) => self
                .find_class(reference)
                .ok_or_else(|| Error::new(ErrorKind::InvalidClassReference(reference.to_string()))),
        }
    }

    /// Returns the class reflect for `class` without creating one.
    #[must_use]
    pub fn find_class<'a>(&self, class: impl Into<ClassRef<'a>>) -> Option<ClassId> {
        match class.into() {
            ClassRef::Constructor(c) => self.store.class_id(c),
            ClassRef::Object(o) => self.store.class_id(o.constructor()),
            ClassRef::Name(n) => self.store.class_id_by_name(n),
            ClassRef::Id(id) => self.store.contains(ElementRef::Class(id)).then_some(id),
        }
    }

    /// Returns a view of a registered class.
    ///
    /// # Errors
    ///
    /// Returns `ClassNotFound` if `class` has not been reflected.
    pub fn get_class<'a>(&self, class: impl Into<ClassRef<'a>>) -> Result<ClassView<'_>> {
        let class = class.into();
        self.find_class(class)
            .and_then(|id| self.store.class(id))
            .ok_or_else(|| Error::new(ErrorKind::ClassNotFound(class.to_string())))
    }

    /// Returns true if `class` has been reflected.
    #[must_use]
    pub fn has_class<'a>(&self, class: impl Into<ClassRef<'a>>) -> bool {
        self.find_class(class).is_some()
    }

    /// Iterates every class reflect in registration order.
    pub fn classes(&self) -> impl Iterator<Item = ClassView<'_>> {
        self.store.classes()
    }

    /// Returns every class carrying an identifier under the filter's belongs.
    ///
    /// # Errors
    ///
    /// Fails as [`Registry::get`] does.
    pub fn classes_by<'a>(
        &self,
        reference: impl Into<DecoRef<'a>>,
        filter: Filter,
    ) -> Result<Vec<ClassView<'_>>> {
        let id = self.get(reference)?;
        Ok(self
            .store
            .classes()
            .filter(|c| c.filter_by_belongs(id, filter.belongs))
            .collect())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Exports the whole registry as a record tree.
    #[must_use]
    pub fn info(&self, detailed: bool) -> Record {
        let classes: Vec<Value> = self
            .store
            .classes()
            .map(|c| Value::from(c.info(detailed)))
            .collect();
        let identifiers: Vec<Value> = self
            .identifiers
            .iter()
            .map(|i| Value::from(i.info(detailed)))
            .collect();
        let aliases: Vec<Value> = self
            .aliases
            .iter()
            .map(|a| Value::from(a.info(&self.identifiers[a.identifier.index()])))
            .collect();
        Record::new()
            .with("classes", classes)
            .with("identifiers", identifiers)
            .with("aliases", aliases)
    }
}
