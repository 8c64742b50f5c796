//! Property reflects: one per member name and keyword of a class.

use std::sync::Arc;

use marginalia_foundation::{ClassId, IdentifierId, ParameterId, PropertyId, Record, Type, Value};

use crate::class::ClassView;
use crate::decorator::{DecoratorMap, Touch};
use crate::element::{ElementRef, Reflected};
use crate::filter::{Filter, Keyword, Kind, Scope};
use crate::model::Callable;
use crate::parameter::ParameterView;
use crate::store::ReflectStore;

#[derive(Debug)]
pub(crate) struct PropertyReflect {
    pub(crate) class: ClassId,
    pub(crate) name: Arc<str>,
    pub(crate) keyword: Keyword,
    pub(crate) kind: Kind,
    pub(crate) callable: Option<Callable>,
    pub(crate) ty: Option<Type>,
    pub(crate) parameters: Vec<ParameterId>,
    /// Declared parameter count, when a callable or introspector knows it.
    pub(crate) arity: Option<usize>,
    pub(crate) decorators: DecoratorMap,
    pub(crate) current: Option<Touch>,
}

/// Borrowed read handle over a property reflect.
#[derive(Clone, Copy, Debug)]
pub struct PropertyView<'s> {
    store: &'s ReflectStore,
    id: PropertyId,
    data: &'s PropertyReflect,
}

impl<'s> PropertyView<'s> {
    pub(crate) fn new(store: &'s ReflectStore, id: PropertyId, data: &'s PropertyReflect) -> Self {
        Self { store, id, data }
    }

    /// Returns the arena id.
    #[must_use]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &'s str {
        &self.data.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        self.data.name.clone()
    }

    /// Returns static or instance membership.
    #[must_use]
    pub fn keyword(&self) -> Keyword {
        self.data.keyword
    }

    /// Returns field or method classification.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.data.kind
    }

    /// Returns the callable, for methods that have one.
    #[must_use]
    pub fn callable(&self) -> Option<&'s Callable> {
        self.data.callable.as_ref()
    }

    /// Returns the introspected type: field type, or method return type.
    #[must_use]
    pub fn ty(&self) -> Option<&'s Type> {
        self.data.ty.as_ref()
    }

    /// Returns the declaring class.
    ///
    /// For an inherited property this is the ancestor, not the class that
    /// listed it.
    #[must_use]
    pub fn class(&self) -> ClassView<'s> {
        self.store.class_at(self.data.class)
    }

    /// Returns the same-named, same-keyword property of the parent class.
    #[must_use]
    pub fn proto(&self) -> Option<PropertyView<'s>> {
        self.store
            .proto_of(self.id)
            .map(|id| self.store.property_at(id))
    }

    /// Returns true if the parent class declares this property too.
    #[must_use]
    pub fn has_proto(&self) -> bool {
        self.store.proto_of(self.id).is_some()
    }

    /// Lists the parameter reflects, in index order.
    #[must_use]
    pub fn list_parameters(&self) -> Vec<ParameterView<'s>> {
        self.data
            .parameters
            .iter()
            .map(|id| self.store.parameter_at(*id))
            .collect()
    }

    /// Returns true if a parameter exists at `index`.
    #[must_use]
    pub fn has_parameter(&self, index: usize) -> bool {
        index < self.data.parameters.len()
    }

    /// Returns the parameter at `index`.
    #[must_use]
    pub fn get_parameter(&self, index: usize) -> Option<ParameterView<'s>> {
        self.data
            .parameters
            .get(index)
            .map(|id| self.store.parameter_at(*id))
    }

    /// Lists the parameters carrying `identifier`.
    #[must_use]
    pub fn parameters_by(&self, identifier: IdentifierId) -> Vec<ParameterView<'s>> {
        self.list_parameters()
            .into_iter()
            .filter(|p| p.filter_by_belongs(identifier, None))
            .collect()
    }

    /// Returns true if the filter's keyword is unset or matches.
    #[must_use]
    pub fn filter_by_keyword(&self, filter: Filter) -> bool {
        filter.keyword.is_none_or(|k| k == self.data.keyword)
    }

    /// Returns true if the filter's kind is unset or matches.
    #[must_use]
    pub fn filter_by_kind(&self, filter: Filter) -> bool {
        filter.kind.is_none_or(|k| k == self.data.kind)
    }

    /// Returns true if the filter's scope is unset or matches, relative to
    /// the class `owner` that is asking.
    #[must_use]
    pub fn filter_by_scope(&self, owner: ClassId, filter: Filter) -> bool {
        match filter.scope {
            Some(Scope::Owned) => self.data.class == owner,
            Some(Scope::Inherited) => self.data.class != owner,
            None => true,
        }
    }

    /// Exports the property as a record tree.
    #[must_use]
    pub fn info(&self, detailed: bool) -> Record {
        let mut rec = Record::new()
            .with("name", self.name())
            .with("description", self.description())
            .with("class", ReflectStore::reference(self.class().description()));
        if detailed {
            rec = rec
                .with("type", self.data.ty.clone())
                .with("keyword", self.data.keyword.as_str())
                .with("kind", self.data.kind.as_str());
            if self.data.kind == Kind::Method {
                let parameters: Vec<Value> = self
                    .list_parameters()
                    .iter()
                    .map(|p| Value::from(p.info(detailed)))
                    .collect();
                rec = rec
                    .with("callable", self.data.callable.as_ref().map(|c| c.signed(true)))
                    .with("parameters", parameters);
            }
        }
        rec.with_opt(
            "proto",
            self.proto().map(|p| ReflectStore::reference(p.description())),
        )
    }
}

impl Reflected for PropertyView<'_> {
    fn store(&self) -> &ReflectStore {
        self.store
    }

    fn element(&self) -> ElementRef {
        ElementRef::Property(self.id)
    }
}
