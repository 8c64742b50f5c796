//! Arena storage for the reflection graph.
//!
//! The store owns every class, property, and parameter reflect. Links between
//! them (class parent, property proto, parameter owner) are arena ids, so the
//! graph holds no owning back-pointers.
//!
//! Registration is create-or-fetch throughout:
//! - a constructor maps to exactly one class reflect
//! - a class holds at most one property per (name, keyword)
//! - a method holds at most one parameter per index
//!
//! Property listings are memoized per (keyword, scope, kind). Each class or
//! property registration clears every class's memo once, since a late member
//! on a parent changes what its children inherit.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use marginalia_foundation::{
    ClassId, Error, ErrorKind, IdentifierId, LtVec, ParameterId, PropertyId, Record, Result,
    Target, Type, Value,
};
use tracing::{debug, trace};

use crate::class::{ClassReflect, ClassView};
use crate::decorator::{DecoratorMap, DecoratorRule, Touch};
use crate::element::ElementRef;
use crate::filter::{Belongs, Keyword, Kind, Scope};
use crate::introspect::{DeclaredTypes, MemberType, TypeIntrospector};
use crate::model::{Body, Callable, Constructor};
use crate::parameter::{ParameterReflect, ParameterView};
use crate::property::{PropertyReflect, PropertyView};

/// Class names treated as language roots when no configuration says otherwise.
pub const DEFAULT_BUILTIN_ROOTS: &[&str] = &["Object", "Function", "Error"];

/// Owner of every reflect in one registry.
#[derive(Debug)]
pub struct ReflectStore {
    classes: Vec<ClassReflect>,
    properties: Vec<PropertyReflect>,
    parameters: Vec<ParameterReflect>,
    by_constructor: HashMap<Constructor, ClassId>,
    by_name: HashMap<Arc<str>, ClassId>,
    rules: HashMap<IdentifierId, DecoratorRule>,
    builtin_roots: HashSet<Arc<str>>,
    memoize: bool,
    introspector: Arc<dyn TypeIntrospector>,
}

impl Default for ReflectStore {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            properties: Vec::new(),
            parameters: Vec::new(),
            by_constructor: HashMap::new(),
            by_name: HashMap::new(),
            rules: HashMap::new(),
            builtin_roots: DEFAULT_BUILTIN_ROOTS.iter().map(|s| Arc::from(*s)).collect(),
            memoize: true,
            introspector: Arc::new(DeclaredTypes),
        }
    }
}

impl ReflectStore {
    /// Creates an empty store reading types declared on bodies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the type introspection provider.
    #[must_use]
    pub fn with_introspector(mut self, introspector: Arc<dyn TypeIntrospector>) -> Self {
        self.introspector = introspector;
        self
    }

    /// Replaces the set of class names never recorded as a parent.
    #[must_use]
    pub fn with_builtin_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.builtin_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables memoization of property listings.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    // =========================================================================
    // Identifier rules
    // =========================================================================

    /// Declares the rule governing values stored under `id`.
    pub fn declare(&mut self, id: IdentifierId, rule: DecoratorRule) {
        self.rules.insert(id, rule);
    }

    /// Returns the rule declared for `id`.
    #[must_use]
    pub fn rule(&self, id: IdentifierId) -> Option<&DecoratorRule> {
        self.rules.get(&id)
    }

    fn inheritable(&self, id: IdentifierId) -> bool {
        self.rules.get(&id).is_none_or(|r| !r.not_inheritor)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    fn is_root(&self, constructor: &Constructor) -> bool {
        constructor.is_builtin()
            || constructor.name().is_empty()
            || self.builtin_roots.contains(constructor.name())
    }

    /// Returns the reflect for `constructor`, creating it on first use.
    ///
    /// A new reflect registers its parent first (unless the parent is a
    /// builtin root), then every declared instance and static member. The
    /// `body` and `touch` only apply when the reflect is created here.
    pub fn register_class(
        &mut self,
        constructor: &Constructor,
        body: Option<Arc<Body>>,
        touch: Option<Touch>,
    ) -> ClassId {
        if let Some(&id) = self.by_constructor.get(constructor) {
            return id;
        }

        let parent_constructor = constructor.parent().filter(|p| !self.is_root(p)).cloned();
        let parent = parent_constructor.map(|p| self.register_class(&p, None, None));

        let id = ClassId::next(self.classes.len());
        self.classes
            .push(ClassReflect::new(constructor.clone(), body, parent, touch));
        self.by_constructor.insert(constructor.clone(), id);
        self.by_name.insert(Arc::from(constructor.name()), id);
        debug!(
            target: "marginalia::reflect",
            class = constructor.name(),
            parent = ?parent,
            "class registered"
        );

        for member in constructor.instance_members() {
            self.insert_property(
                id,
                member.name.clone(),
                Keyword::Instance,
                member.kind(),
                member.callable().cloned(),
            );
        }
        for member in constructor.static_members() {
            self.insert_property(
                id,
                member.name.clone(),
                Keyword::Static,
                member.kind(),
                member.callable().cloned(),
            );
        }
        self.invalidate();
        id
    }

    /// Returns the property `name` of `class`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClassReference` if `class` is not in this store, or
    /// `InvalidTarget` if `name` already exists under `keyword` with the
    /// other kind.
    pub fn register_property(
        &mut self,
        class: ClassId,
        name: impl Into<Arc<str>>,
        keyword: Keyword,
        kind: Kind,
        callable: Option<Callable>,
    ) -> Result<PropertyId> {
        let Some(owner) = self.classes.get(class.index()) else {
            return Err(Error::new(ErrorKind::InvalidClassReference(class.to_string())));
        };
        let name: Arc<str> = name.into();
        if let Some(existing) = owner.members(keyword).get(&name) {
            let found = self.properties[existing.index()].kind;
            if found != kind {
                return Err(Error::invalid_target(
                    Self::kind_target(found),
                    Self::kind_target(kind),
                    self.describe(ElementRef::Property(existing)),
                ));
            }
            return Ok(existing);
        }
        let id = self.insert_property(class, name, keyword, kind, callable);
        self.invalidate();
        Ok(id)
    }

    const fn kind_target(kind: Kind) -> Target {
        match kind {
            Kind::Field => Target::Field,
            Kind::Method => Target::Method,
        }
    }

    fn insert_property(
        &mut self,
        class: ClassId,
        name: Arc<str>,
        keyword: Keyword,
        kind: Kind,
        callable: Option<Callable>,
    ) -> PropertyId {
        let owner = &self.classes[class.index()];
        if let Some(id) = owner.members(keyword).get(&name) {
            return id;
        }
        let body = owner.body.clone();
        let current = owner.current;

        let (callable, ty, param_types, arity) = match kind {
            Kind::Field => {
                let ty = body
                    .as_deref()
                    .and_then(|b| match self.introspector.type_of(b, &name) {
                        Some(MemberType::Field(t)) => Some(t),
                        _ => None,
                    });
                (None, ty, Vec::new(), None)
            }
            Kind::Method => {
                let callable = callable.or_else(|| body.as_deref().and_then(|b| b.callable(&name)));
                match body.as_deref().and_then(|b| self.introspector.type_of(b, &name)) {
                    Some(MemberType::Method { params, returns }) => {
                        let arity = Some(params.len());
                        (callable, returns, params.into_iter().map(Some).collect(), arity)
                    }
                    _ => {
                        let arity = callable.as_ref().map(|c| c.arity);
                        (callable, None, vec![None; arity.unwrap_or(0)], arity)
                    }
                }
            }
        };

        let id = PropertyId::next(self.properties.len());
        let parameters: Vec<ParameterId> = param_types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| self.push_parameter(id, index, ty, current))
            .collect();
        trace!(
            target: "marginalia::reflect",
            class = self.classes[class.index()].name(),
            property = %name,
            %keyword,
            %kind,
            parameters = parameters.len(),
            "property registered"
        );
        self.properties.push(PropertyReflect {
            class,
            name: name.clone(),
            keyword,
            kind,
            callable,
            ty,
            parameters,
            arity,
            decorators: DecoratorMap::new(),
            current,
        });
        self.classes[class.index()]
            .members_mut(keyword)
            .insert(name, id);
        id
    }

    fn push_parameter(
        &mut self,
        property: PropertyId,
        index: usize,
        ty: Option<Type>,
        current: Option<Touch>,
    ) -> ParameterId {
        let id = ParameterId::next(self.parameters.len());
        self.parameters.push(ParameterReflect {
            property,
            index,
            ty,
            decorators: DecoratorMap::new(),
            current,
        });
        id
    }

    /// Returns the parameter at `index` of `property`, creating it and any
    /// missing lower indices on first use.
    ///
    /// Indices are only synthesized when the method's arity is unknown.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if `property` is not in this store, or
    /// `ParameterOutOfRange` if `index` is at or past a known arity.
    pub fn ensure_parameter(&mut self, property: PropertyId, index: usize) -> Result<ParameterId> {
        let prop = self
            .properties
            .get(property.index())
            .ok_or_else(|| Self::missing(ElementRef::Property(property)))?;
        if let Some(&id) = prop.parameters.get(index) {
            return Ok(id);
        }
        if let Some(arity) = prop.arity {
            return Err(Error::new(ErrorKind::ParameterOutOfRange {
                property: self.describe(ElementRef::Property(property)),
                index,
                arity,
            }));
        }
        let current = prop.current;
        for i in prop.parameters.len()..=index {
            let id = self.push_parameter(property, i, None, current);
            self.properties[property.index()].parameters.push(id);
        }
        Ok(self.properties[property.index()].parameters[index])
    }

    fn invalidate(&self) {
        for class in &self.classes {
            class.cache.borrow_mut().clear();
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Returns the class reflected for `constructor`.
    #[must_use]
    pub fn class_id(&self, constructor: &Constructor) -> Option<ClassId> {
        self.by_constructor.get(constructor).copied()
    }

    /// Returns the class most recently registered under `name`.
    #[must_use]
    pub fn class_id_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Returns a view of a class.
    #[must_use]
    pub fn class(&self, id: ClassId) -> Option<ClassView<'_>> {
        self.classes
            .get(id.index())
            .map(|data| ClassView::new(self, id, data))
    }

    /// Returns a view of a property.
    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<PropertyView<'_>> {
        self.properties
            .get(id.index())
            .map(|data| PropertyView::new(self, id, data))
    }

    /// Returns a view of a parameter.
    #[must_use]
    pub fn parameter(&self, id: ParameterId) -> Option<ParameterView<'_>> {
        self.parameters
            .get(id.index())
            .map(|data| ParameterView::new(self, id, data))
    }

    pub(crate) fn class_at(&self, id: ClassId) -> ClassView<'_> {
        ClassView::new(self, id, &self.classes[id.index()])
    }

    pub(crate) fn property_at(&self, id: PropertyId) -> PropertyView<'_> {
        PropertyView::new(self, id, &self.properties[id.index()])
    }

    pub(crate) fn parameter_at(&self, id: ParameterId) -> ParameterView<'_> {
        ParameterView::new(self, id, &self.parameters[id.index()])
    }

    /// Iterates every class in registration order.
    pub fn classes(&self) -> impl Iterator<Item = ClassView<'_>> {
        (0..self.classes.len()).map(|i| self.class_at(ClassId::next(i)))
    }

    /// Returns the number of reflected classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if `element` names a reflect in this store.
    #[must_use]
    pub fn contains(&self, element: ElementRef) -> bool {
        match element {
            ElementRef::Class(id) => id.index() < self.classes.len(),
            ElementRef::Property(id) => id.index() < self.properties.len(),
            ElementRef::Parameter(id) => id.index() < self.parameters.len(),
        }
    }

    // =========================================================================
    // Property listing
    // =========================================================================

    /// Lists the properties of `class` for one keyword.
    ///
    /// - `Owned`: the class's own members, kind-filtered
    /// - `Inherited`: the parent's unscoped listing (empty at the root)
    /// - unset: own members, then every parent member whose name no own
    ///   member (of the requested kind) already uses
    #[must_use]
    pub fn list_properties(
        &self,
        class: ClassId,
        keyword: Keyword,
        scope: Option<Scope>,
        kind: Option<Kind>,
    ) -> Arc<[PropertyId]> {
        let Some(data) = self.classes.get(class.index()) else {
            return Arc::from(Vec::new());
        };
        let key = (keyword, scope, kind);
        if self.memoize {
            if let Some(hit) = data.cache.borrow().get(&key) {
                return Arc::clone(hit);
            }
        }

        let own = || {
            data.members(keyword)
                .ids()
                .iter()
                .copied()
                .filter(move |id| kind.is_none_or(|k| self.properties[id.index()].kind == k))
        };
        let list: Arc<[PropertyId]> = match scope {
            Some(Scope::Owned) => own().collect(),
            Some(Scope::Inherited) => data.parent.map_or_else(
                || Arc::from(Vec::new()),
                |p| self.list_properties(p, keyword, None, kind),
            ),
            None => {
                let mut props: Vec<PropertyId> = own().collect();
                if let Some(parent) = data.parent {
                    let names: HashSet<&str> = props
                        .iter()
                        .map(|id| &*self.properties[id.index()].name)
                        .collect();
                    let inherited = self.list_properties(parent, keyword, None, kind);
                    props.extend(
                        inherited
                            .iter()
                            .copied()
                            .filter(|id| !names.contains(&*self.properties[id.index()].name)),
                    );
                }
                props.into()
            }
        };

        if self.memoize {
            data.cache.borrow_mut().insert(key, Arc::clone(&list));
        }
        list
    }

    /// Finds a visible property of `class` by name.
    #[must_use]
    pub fn find_property(
        &self,
        class: ClassId,
        keyword: Keyword,
        name: &str,
        scope: Option<Scope>,
        kind: Option<Kind>,
    ) -> Option<PropertyId> {
        self.list_properties(class, keyword, scope, kind)
            .iter()
            .copied()
            .find(|id| &*self.properties[id.index()].name == name)
    }

    /// Returns the parent class's same-named, same-keyword property.
    #[must_use]
    pub fn proto_of(&self, property: PropertyId) -> Option<PropertyId> {
        let prop = self.properties.get(property.index())?;
        let parent = self.classes[prop.class.index()].parent?;
        self.find_property(parent, prop.keyword, &prop.name, None, None)
    }

    // =========================================================================
    // Decorators
    // =========================================================================

    fn own(&self, element: ElementRef) -> Option<&DecoratorMap> {
        match element {
            ElementRef::Class(id) => self.classes.get(id.index()).map(|c| &c.decorators),
            ElementRef::Property(id) => self.properties.get(id.index()).map(|p| &p.decorators),
            ElementRef::Parameter(id) => self.parameters.get(id.index()).map(|p| &p.decorators),
        }
    }

    fn up(&self, element: ElementRef) -> Option<ElementRef> {
        match element {
            ElementRef::Class(id) => self
                .classes
                .get(id.index())
                .and_then(|c| c.parent)
                .map(ElementRef::Class),
            ElementRef::Property(id) => self.proto_of(id).map(ElementRef::Property),
            ElementRef::Parameter(_) => None,
        }
    }

    /// Resolves the decorator map of `element` under `belongs`.
    ///
    /// - `Own`: the element's own values
    /// - `Parent`: the parent's fully resolved values
    /// - unset: own values overlaid on the parent's resolved values
    ///
    /// Values resolved from a parent skip identifiers marked `not_inheritor`.
    /// Parameters have no parent and always resolve to their own values.
    #[must_use]
    pub fn resolve(&self, element: ElementRef, belongs: Option<Belongs>) -> Cow<'_, DecoratorMap> {
        let Some(own) = self.own(element) else {
            return Cow::Owned(DecoratorMap::new());
        };
        if matches!(element, ElementRef::Parameter(_)) {
            return Cow::Borrowed(own);
        }
        match (belongs, self.up(element)) {
            (Some(Belongs::Own), _) | (None, None) => Cow::Borrowed(own),
            (Some(Belongs::Parent), None) => Cow::Owned(DecoratorMap::new()),
            (Some(Belongs::Parent), Some(up)) => Cow::Owned(self.inherited(up)),
            (None, Some(up)) => Cow::Owned(own.overlay(&self.inherited(up))),
        }
    }

    fn inherited(&self, element: ElementRef) -> DecoratorMap {
        self.resolve(element, None)
            .into_owned()
            .retain(|id| self.inheritable(id))
    }

    fn slot_mut(&mut self, element: ElementRef) -> Result<(&mut DecoratorMap, &mut Option<Touch>)> {
        let slot = match element {
            ElementRef::Class(id) => self
                .classes
                .get_mut(id.index())
                .map(|c| (&mut c.decorators, &mut c.current)),
            ElementRef::Property(id) => self
                .properties
                .get_mut(id.index())
                .map(|p| (&mut p.decorators, &mut p.current)),
            ElementRef::Parameter(id) => self
                .parameters
                .get_mut(id.index())
                .map(|p| (&mut p.decorators, &mut p.current)),
        };
        slot.ok_or_else(|| Self::missing(element))
    }

    fn missing(element: ElementRef) -> Error {
        Error::new(ErrorKind::Internal(format!("unknown element: {element}")))
    }

    /// Stores `value` on `element` under `identifier`.
    ///
    /// Non-record values are stored as an empty record. A `not_multiple`
    /// identifier keeps only the newest value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDecoratorReference` if no rule was declared for
    /// `identifier`, or `Internal` if `element` is not in this store.
    pub fn set_value(
        &mut self,
        element: ElementRef,
        identifier: IdentifierId,
        value: impl Into<Value>,
    ) -> Result<()> {
        let replace = self
            .rules
            .get(&identifier)
            .map(|r| r.not_multiple)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidDecoratorReference(identifier.to_string()))
            })?;
        let (map, _) = self.slot_mut(element)?;
        map.store(identifier, Record::coerce(value.into()), replace);
        Ok(())
    }

    /// Records `touch` as the most recent attachment to `element`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if `element` is not in this store.
    pub fn touch(&mut self, element: ElementRef, touch: Touch) -> Result<()> {
        let (_, current) = self.slot_mut(element)?;
        *current = Some(touch);
        Ok(())
    }

    /// Returns the most recent attachment to `element`.
    #[must_use]
    pub fn touch_of(&self, element: ElementRef) -> Option<Touch> {
        match element {
            ElementRef::Class(id) => self.classes.get(id.index()).and_then(|c| c.current),
            ElementRef::Property(id) => self.properties.get(id.index()).and_then(|p| p.current),
            ElementRef::Parameter(id) => self.parameters.get(id.index()).and_then(|p| p.current),
        }
    }

    // =========================================================================
    // Descriptions and export
    // =========================================================================

    /// Returns the structural site kind of `element`.
    #[must_use]
    pub fn target_of(&self, element: ElementRef) -> Target {
        match element {
            ElementRef::Class(_) => Target::Class,
            ElementRef::Property(id) => match self.properties.get(id.index()).map(|p| p.kind) {
                Some(Kind::Method) => Target::Method,
                _ => Target::Field,
            },
            ElementRef::Parameter(_) => Target::Parameter,
        }
    }

    /// Returns the human-readable description of `element`.
    #[must_use]
    pub fn describe(&self, element: ElementRef) -> String {
        match element {
            ElementRef::Class(id) => match self.classes.get(id.index()) {
                Some(c) => format!("<class>{}", c.name()),
                None => format!("<class>{id}"),
            },
            ElementRef::Property(id) => match self.properties.get(id.index()) {
                Some(p) => format!(
                    "<{}>{}.{} [{}]",
                    p.kind,
                    self.classes[p.class.index()].name(),
                    p.name,
                    p.keyword
                ),
                None => format!("<property>{id}"),
            },
            ElementRef::Parameter(id) => match self.parameters.get(id.index()) {
                Some(param) => {
                    let p = &self.properties[param.property.index()];
                    format!(
                        "<parameter>{}.{}#{} [{}]",
                        self.classes[p.class.index()].name(),
                        p.name,
                        param.index,
                        p.keyword
                    )
                }
                None => format!("<parameter>{id}"),
            },
        }
    }

    /// Builds a `{"$ref": description}` link record.
    #[must_use]
    pub fn reference(description: impl Into<Value>) -> Record {
        Record::new().with("$ref", description)
    }

    /// Exports the own decorator values of `element`.
    #[must_use]
    pub fn decorator_info(&self, element: ElementRef) -> Value {
        let entries: Vec<Value> = self
            .own(element)
            .into_iter()
            .flat_map(DecoratorMap::iter)
            .map(|(id, values)| {
                let description = self
                    .rule(id)
                    .map_or_else(|| id.to_string(), DecoratorRule::description);
                let values: LtVec<Value> = values.iter().cloned().map(Value::from).collect();
                Value::from(
                    Record::new()
                        .with("identifier", Self::reference(description))
                        .with("values", Value::Vec(values)),
                )
            })
            .collect();
        Value::from(entries)
    }
}
