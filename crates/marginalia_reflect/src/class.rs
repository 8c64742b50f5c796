//! Class reflects and their borrowed view.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use marginalia_foundation::{ClassId, IdentifierId, PropertyId, Record, Value};

use crate::decorator::{DecoratorMap, Touch};
use crate::element::{ElementRef, Reflected};
use crate::filter::{Filter, Keyword, Kind, Scope};
use crate::model::{Body, Constructor};
use crate::property::PropertyView;
use crate::store::ReflectStore;

pub(crate) type ListKey = (Keyword, Option<Scope>, Option<Kind>);

/// Own members of one keyword, in registration order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Members {
    order: Vec<PropertyId>,
    by_name: HashMap<Arc<str>, PropertyId>,
}

impl Members {
    pub(crate) fn get(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn insert(&mut self, name: Arc<str>, id: PropertyId) {
        self.order.push(id);
        self.by_name.insert(name, id);
    }

    pub(crate) fn ids(&self) -> &[PropertyId] {
        &self.order
    }
}

/// Reflection record for one class.
#[derive(Debug)]
pub(crate) struct ClassReflect {
    pub(crate) constructor: Constructor,
    pub(crate) body: Option<Arc<Body>>,
    pub(crate) parent: Option<ClassId>,
    pub(crate) instance: Members,
    pub(crate) statics: Members,
    pub(crate) decorators: DecoratorMap,
    pub(crate) current: Option<Touch>,
    pub(crate) cache: RefCell<HashMap<ListKey, Arc<[PropertyId]>>>,
}

impl ClassReflect {
    pub(crate) fn new(
        constructor: Constructor,
        body: Option<Arc<Body>>,
        parent: Option<ClassId>,
        current: Option<Touch>,
    ) -> Self {
        Self {
            constructor,
            body,
            parent,
            instance: Members::default(),
            statics: Members::default(),
            decorators: DecoratorMap::new(),
            current,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn members(&self, keyword: Keyword) -> &Members {
        match keyword {
            Keyword::Instance => &self.instance,
            Keyword::Static => &self.statics,
        }
    }

    pub(crate) fn members_mut(&mut self, keyword: Keyword) -> &mut Members {
        match keyword {
            Keyword::Instance => &mut self.instance,
            Keyword::Static => &mut self.statics,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.constructor.name()
    }
}

/// Borrowed read handle over a class reflect.
#[derive(Clone, Copy, Debug)]
pub struct ClassView<'s> {
    store: &'s ReflectStore,
    id: ClassId,
    data: &'s ClassReflect,
}

impl<'s> ClassView<'s> {
    pub(crate) fn new(store: &'s ReflectStore, id: ClassId, data: &'s ClassReflect) -> Self {
        Self { store, id, data }
    }

    /// Returns the arena id.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Returns the fully-qualified class name.
    #[must_use]
    pub fn name(&self) -> &'s str {
        self.data.name()
    }

    /// Returns the class identity.
    #[must_use]
    pub fn constructor(&self) -> &'s Constructor {
        &self.data.constructor
    }

    /// Returns the literal body the class was first reflected with.
    #[must_use]
    pub fn body(&self) -> Option<&'s Body> {
        self.data.body.as_deref()
    }

    /// Returns the parent class reflect, absent at the root.
    #[must_use]
    pub fn parent(&self) -> Option<ClassView<'s>> {
        self.data.parent.map(|p| self.store.class_at(p))
    }

    fn views(&self, ids: &[PropertyId]) -> Vec<PropertyView<'s>> {
        ids.iter().map(|id| self.store.property_at(*id)).collect()
    }

    fn find(&self, keyword: Keyword, name: &str, filter: Filter) -> Option<PropertyView<'s>> {
        self.store
            .find_property(self.id, keyword, name, filter.scope, filter.kind)
            .map(|id| self.store.property_at(id))
    }

    // --- instance properties -------------------------------------------------

    /// Lists instance properties, honouring the filter's scope and kind.
    ///
    /// Without a scope, own properties come first and shadow same-named
    /// inherited ones.
    #[must_use]
    pub fn list_instance_properties(&self, filter: Filter) -> Vec<PropertyView<'s>> {
        self.views(&self.store.list_properties(
            self.id,
            Keyword::Instance,
            filter.scope,
            filter.kind,
        ))
    }

    /// Lists instance property names.
    #[must_use]
    pub fn list_instance_property_names(&self, filter: Filter) -> Vec<Arc<str>> {
        self.list_instance_properties(filter)
            .iter()
            .map(PropertyView::name_arc)
            .collect()
    }

    /// Finds an instance property by name.
    #[must_use]
    pub fn get_instance_property(&self, name: &str, filter: Filter) -> Option<PropertyView<'s>> {
        self.find(Keyword::Instance, name, filter)
    }

    /// Returns true if an instance property with this name is visible.
    #[must_use]
    pub fn has_instance_property(&self, name: &str, filter: Filter) -> bool {
        self.get_instance_property(name, filter).is_some()
    }

    // --- static properties ---------------------------------------------------

    /// Lists static properties, honouring the filter's scope and kind.
    #[must_use]
    pub fn list_static_properties(&self, filter: Filter) -> Vec<PropertyView<'s>> {
        self.views(&self.store.list_properties(
            self.id,
            Keyword::Static,
            filter.scope,
            filter.kind,
        ))
    }

    /// Lists static property names.
    #[must_use]
    pub fn list_static_property_names(&self, filter: Filter) -> Vec<Arc<str>> {
        self.list_static_properties(filter)
            .iter()
            .map(PropertyView::name_arc)
            .collect()
    }

    /// Finds a static property by name.
    #[must_use]
    pub fn get_static_property(&self, name: &str, filter: Filter) -> Option<PropertyView<'s>> {
        self.find(Keyword::Static, name, filter)
    }

    /// Returns true if a static property with this name is visible.
    #[must_use]
    pub fn has_static_property(&self, name: &str, filter: Filter) -> bool {
        self.get_static_property(name, filter).is_some()
    }

    // --- any properties ------------------------------------------------------

    /// Lists instance then static properties, unless the filter's keyword
    /// narrows to one.
    ///
    /// With an `identifier`, keeps only properties carrying it under the
    /// filter's belongs dimension.
    #[must_use]
    pub fn list_any_properties(
        &self,
        filter: Filter,
        identifier: Option<IdentifierId>,
    ) -> Vec<PropertyView<'s>> {
        let mut props = match filter.keyword {
            Some(Keyword::Instance) => self.list_instance_properties(filter),
            Some(Keyword::Static) => self.list_static_properties(filter),
            None => {
                let mut all = self.list_instance_properties(filter);
                all.extend(self.list_static_properties(filter));
                all
            }
        };
        if let Some(id) = identifier {
            props.retain(|p| p.filter_by_belongs(id, filter.belongs));
        }
        props
    }

    /// Finds a property by name, preferring instance over static.
    #[must_use]
    pub fn get_any_property(&self, name: &str, filter: Filter) -> Option<PropertyView<'s>> {
        match filter.keyword {
            Some(Keyword::Instance) => self.get_instance_property(name, filter),
            Some(Keyword::Static) => self.get_static_property(name, filter),
            None => self
                .get_instance_property(name, filter)
                .or_else(|| self.get_static_property(name, filter)),
        }
    }

    /// Returns true if a property with this name is visible.
    #[must_use]
    pub fn has_any_property(&self, name: &str, filter: Filter) -> bool {
        self.get_any_property(name, filter).is_some()
    }

    /// Exports the class as a record tree.
    #[must_use]
    pub fn info(&self, detailed: bool) -> Record {
        let instances: Vec<Value> = self
            .views(self.data.instance.ids())
            .iter()
            .map(|p| Value::from(p.info(detailed)))
            .collect();
        let statics: Vec<Value> = self
            .views(self.data.statics.ids())
            .iter()
            .map(|p| Value::from(p.info(detailed)))
            .collect();
        let body = if detailed {
            self.data.body.as_ref().map(|b| format!("body{{{}}}", b.len()))
        } else {
            None
        };

        Record::new()
            .with("name", self.name())
            .with("creator", self.data.constructor.signed(true))
            .with_opt("body", body)
            .with("instances", instances)
            .with("statics", statics)
            .with("identifiers", self.store.decorator_info(self.element()))
            .with_opt(
                "parent",
                self.parent().map(|p| ReflectStore::reference(p.description())),
            )
    }
}

impl Reflected for ClassView<'_> {
    fn store(&self) -> &ReflectStore {
        self.store
    }

    fn element(&self) -> ElementRef {
        ElementRef::Class(self.id)
    }
}
