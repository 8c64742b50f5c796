//! Read-side queries for one identifier.
//!
//! Class lookups here never create a reflect: an unknown class reads as
//! empty. Scalar reads return nothing for an identifier without a `single`
//! key instead of failing.

use std::collections::HashSet;

use marginalia_foundation::{IdentifierId, Record, Target, Value};
use marginalia_reflect::{
    ClassRef, ClassView, ElementRef, Filter, Kind, ParameterView, PropertyView, Reflected,
};

use crate::identifier::Identifier;
use crate::registry::Registry;

/// The query family of one identifier, borrowed from its registry.
#[derive(Copy, Clone, Debug)]
pub struct IdentifierQuery<'r> {
    registry: &'r Registry,
    identifier: &'r Identifier,
}

impl<'r> IdentifierQuery<'r> {
    pub(crate) fn new(registry: &'r Registry, identifier: &'r Identifier) -> Self {
        Self {
            registry,
            identifier,
        }
    }

    /// Returns the identifier being queried.
    #[must_use]
    pub fn identifier(&self) -> &'r Identifier {
        self.identifier
    }

    fn id(&self) -> IdentifierId {
        self.identifier.id()
    }

    fn single(values: Option<Record>, key: &str) -> Option<Value> {
        values.and_then(|rec| rec.get(key).cloned())
    }

    fn singles(values: &[Record], key: &str) -> Vec<Value> {
        values
            .iter()
            .filter_map(|rec| rec.get(key).cloned())
            .collect()
    }

    /// Distinct elements this identifier was forked onto, oldest first.
    fn elements(&self) -> Vec<ElementRef> {
        let mut seen = HashSet::new();
        self.identifier
            .instances()
            .iter()
            .filter_map(|id| self.registry.instance(*id))
            .map(|view| view.instance().element())
            .filter(|el| seen.insert(*el))
            .collect()
    }

    fn class_view(&self, class: ClassRef<'_>) -> Option<ClassView<'r>> {
        self.registry
            .find_class(class)
            .and_then(|id| self.registry.store().class(id))
    }

    fn property_view(
        &self,
        class: ClassRef<'_>,
        name: &str,
        filter: Filter,
    ) -> Option<PropertyView<'r>> {
        self.class_view(class)?.get_any_property(name, filter)
    }

    fn parameter_view(
        &self,
        class: ClassRef<'_>,
        name: &str,
        index: usize,
        filter: Filter,
    ) -> Option<ParameterView<'r>> {
        self.property_view(class, name, filter.with_kind(Kind::Method))?
            .get_parameter(index)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Classes this identifier was applied to that still carry it under the
    /// filter's belongs.
    #[must_use]
    pub fn assigned_classes(&self, filter: Filter) -> Vec<ClassView<'r>> {
        let store = self.registry.store();
        self.elements()
            .into_iter()
            .filter_map(|el| el.as_class().and_then(|id| store.class(id)))
            .filter(|c| c.filter_by_target(&[Target::Class]))
            .filter(|c| c.filter_by_belongs(self.id(), filter.belongs))
            .collect()
    }

    /// Returns the first value on a class.
    #[must_use]
    pub fn value_by_class<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        filter: Filter,
    ) -> Option<Record> {
        self.class_view(class.into())?
            .get_value(self.id(), filter.belongs)
    }

    /// Returns every value on a class.
    #[must_use]
    pub fn values_by_class<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        filter: Filter,
    ) -> Vec<Record> {
        self.class_view(class.into())
            .map(|c| c.list_values(self.id(), filter.belongs).iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Extracts the `single` field of the first value on a class.
    #[must_use]
    pub fn single_by_class<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        filter: Filter,
    ) -> Option<Value> {
        let key = self.identifier.single()?;
        Self::single(self.value_by_class(class, filter), key)
    }

    /// Extracts the `single` field of every value on a class that has it.
    #[must_use]
    pub fn singles_by_class<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        filter: Filter,
    ) -> Vec<Value> {
        match self.identifier.single() {
            Some(key) => Self::singles(&self.values_by_class(class, filter), key),
            None => Vec::new(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Properties this identifier was applied to, narrowed by the filter's
    /// kind and belongs.
    #[must_use]
    pub fn assigned_properties(&self, filter: Filter) -> Vec<PropertyView<'r>> {
        let store = self.registry.store();
        self.elements()
            .into_iter()
            .filter_map(|el| el.as_property().and_then(|id| store.property(id)))
            .filter(|p| p.filter_by_target(&[Target::Method, Target::Field]))
            .filter(|p| p.filter_by_kind(filter))
            .filter(|p| p.filter_by_belongs(self.id(), filter.belongs))
            .collect()
    }

    /// Returns the first value on a property, instance before static.
    #[must_use]
    pub fn value_by_property<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        filter: Filter,
    ) -> Option<Record> {
        self.property_view(class.into(), name, filter)?
            .get_value(self.id(), filter.belongs)
    }

    /// Returns every value on a property.
    #[must_use]
    pub fn values_by_property<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        filter: Filter,
    ) -> Vec<Record> {
        self.property_view(class.into(), name, filter)
            .map(|p| p.list_values(self.id(), filter.belongs).iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Extracts the `single` field of the first value on a property.
    #[must_use]
    pub fn single_by_property<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        filter: Filter,
    ) -> Option<Value> {
        let key = self.identifier.single()?;
        Self::single(self.value_by_property(class, name, filter), key)
    }

    /// Extracts the `single` field of every value on a property that has it.
    #[must_use]
    pub fn singles_by_property<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        filter: Filter,
    ) -> Vec<Value> {
        match self.identifier.single() {
            Some(key) => Self::singles(&self.values_by_property(class, name, filter), key),
            None => Vec::new(),
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Parameters this identifier was applied to that still carry it.
    #[must_use]
    pub fn assigned_parameters(&self, filter: Filter) -> Vec<ParameterView<'r>> {
        let store = self.registry.store();
        self.elements()
            .into_iter()
            .filter_map(|el| el.as_parameter().and_then(|id| store.parameter(id)))
            .filter(|p| p.filter_by_target(&[Target::Parameter]))
            .filter(|p| p.filter_by_belongs(self.id(), filter.belongs))
            .collect()
    }

    /// Returns the first value on a method parameter.
    ///
    /// The filter's kind is forced to method.
    #[must_use]
    pub fn value_by_parameter<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        index: usize,
        filter: Filter,
    ) -> Option<Record> {
        self.parameter_view(class.into(), name, index, filter)?
            .get_value(self.id(), None)
    }

    /// Returns every value on a method parameter.
    #[must_use]
    pub fn values_by_parameter<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        index: usize,
        filter: Filter,
    ) -> Vec<Record> {
        self.parameter_view(class.into(), name, index, filter)
            .map(|p| p.list_values(self.id(), None).iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Extracts the `single` field of the first value on a method parameter.
    #[must_use]
    pub fn single_by_parameter<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        index: usize,
        filter: Filter,
    ) -> Option<Value> {
        let key = self.identifier.single()?;
        Self::single(self.value_by_parameter(class, name, index, filter), key)
    }

    /// Extracts the `single` field of every value on a method parameter that has it.
    #[must_use]
    pub fn singles_by_parameter<'a>(
        &self,
        class: impl Into<ClassRef<'a>>,
        name: &str,
        index: usize,
        filter: Filter,
    ) -> Vec<Value> {
        match self.identifier.single() {
            Some(key) => Self::singles(&self.values_by_parameter(class, name, index, filter), key),
            None => Vec::new(),
        }
    }
}
