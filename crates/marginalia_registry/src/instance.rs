//! Applications of an identifier to an element.

use marginalia_foundation::{Error, IdentifierId, InstanceId, Record, Result, Target, Value};
use marginalia_reflect::{ClassView, ElementRef, ParameterView, PropertyView, Reflected};

use crate::registry::Registry;

/// One application of an identifier to a class, property, or parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) identifier: IdentifierId,
    pub(crate) target: Target,
    pub(crate) element: ElementRef,
}

impl Instance {
    /// Returns the arena id.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the identifier this instance was forked from.
    #[must_use]
    pub fn identifier(&self) -> IdentifierId {
        self.identifier
    }

    /// Returns the attachment target.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the element the instance is bound to.
    #[must_use]
    pub fn element(&self) -> ElementRef {
        self.element
    }

    /// Returns true if attached to a class.
    #[must_use]
    pub fn is_of_class(&self) -> bool {
        self.target == Target::Class
    }

    /// Returns true if attached to a method.
    #[must_use]
    pub fn is_of_method(&self) -> bool {
        self.target == Target::Method
    }

    /// Returns true if attached to a field.
    #[must_use]
    pub fn is_of_field(&self) -> bool {
        self.target == Target::Field
    }

    /// Returns true if attached to a parameter.
    #[must_use]
    pub fn is_of_parameter(&self) -> bool {
        self.target == Target::Parameter
    }
}

/// An instance together with the registry it lives in.
#[derive(Copy, Clone, Debug)]
pub struct InstanceView<'r> {
    registry: &'r Registry,
    instance: Instance,
}

impl<'r> InstanceView<'r> {
    pub(crate) fn new(registry: &'r Registry, instance: Instance) -> Self {
        Self { registry, instance }
    }

    /// Returns the underlying instance.
    #[must_use]
    pub fn instance(&self) -> Instance {
        self.instance
    }

    fn mismatch(&self, expected: Target) -> Error {
        Error::invalid_target(
            self.instance.target,
            expected,
            self.registry.store().describe(self.instance.element),
        )
    }

    /// Returns the class reflect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` unless the instance targets a class.
    pub fn as_class(&self) -> Result<ClassView<'r>> {
        if !self.instance.is_of_class() {
            return Err(self.mismatch(Target::Class));
        }
        self.instance
            .element
            .as_class()
            .and_then(|id| self.registry.store().class(id))
            .ok_or_else(|| self.mismatch(Target::Class))
    }

    /// Returns the method reflect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` unless the instance targets a method.
    pub fn as_method(&self) -> Result<PropertyView<'r>> {
        self.property(Target::Method)
    }

    /// Returns the field reflect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` unless the instance targets a field.
    pub fn as_field(&self) -> Result<PropertyView<'r>> {
        self.property(Target::Field)
    }

    fn property(&self, expected: Target) -> Result<PropertyView<'r>> {
        if self.instance.target != expected {
            return Err(self.mismatch(expected));
        }
        self.instance
            .element
            .as_property()
            .and_then(|id| self.registry.store().property(id))
            .ok_or_else(|| self.mismatch(expected))
    }

    /// Returns the parameter reflect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` unless the instance targets a parameter.
    pub fn as_parameter(&self) -> Result<ParameterView<'r>> {
        if !self.instance.is_of_parameter() {
            return Err(self.mismatch(Target::Parameter));
        }
        self.instance
            .element
            .as_parameter()
            .and_then(|id| self.registry.store().parameter(id))
            .ok_or_else(|| self.mismatch(Target::Parameter))
    }

    /// Returns the values stored on the element under this instance's identifier.
    #[must_use]
    pub fn values(&self) -> Vec<Record> {
        let store = self.registry.store();
        let id = self.instance.identifier;
        let values = match self.instance.element {
            ElementRef::Class(c) => store.class(c).map(|v| v.list_values(id, None)),
            ElementRef::Property(p) => store.property(p).map(|v| v.list_values(id, None)),
            ElementRef::Parameter(p) => store.parameter(p).map(|v| v.list_values(id, None)),
        };
        values.map(|v| v.iter().cloned().collect()).unwrap_or_default()
    }
}

/// A freshly applied instance, able to store its value.
///
/// Holds the registry mutably so the value lands before any other
/// attachment can interleave.
#[derive(Debug)]
pub struct Forked<'r> {
    registry: &'r mut Registry,
    instance: Instance,
}

impl<'r> Forked<'r> {
    pub(crate) fn new(registry: &'r mut Registry, instance: Instance) -> Self {
        Self { registry, instance }
    }

    /// Returns the instance id.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.instance.id
    }

    /// Returns the underlying instance.
    #[must_use]
    pub fn instance(&self) -> Instance {
        self.instance
    }

    /// Returns the element the instance is bound to.
    #[must_use]
    pub fn element(&self) -> ElementRef {
        self.instance.element
    }

    /// Stores `value` on the element under this instance's identifier.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the reflect store.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<ElementRef> {
        self.registry
            .set_value(self.instance.element, self.instance.identifier, value)?;
        Ok(self.instance.element)
    }

    /// Borrows the instance for reading.
    #[must_use]
    pub fn view(&self) -> InstanceView<'_> {
        InstanceView::new(self.registry, self.instance)
    }

    /// Returns the class reflect.
    ///
    /// # Errors
    ///
    /// See [`InstanceView::as_class`].
    pub fn as_class(&self) -> Result<ClassView<'_>> {
        self.view().as_class()
    }

    /// Returns the method reflect.
    ///
    /// # Errors
    ///
    /// See [`InstanceView::as_method`].
    pub fn as_method(&self) -> Result<PropertyView<'_>> {
        self.view().as_method()
    }

    /// Returns the field reflect.
    ///
    /// # Errors
    ///
    /// See [`InstanceView::as_field`].
    pub fn as_field(&self) -> Result<PropertyView<'_>> {
        self.view().as_field()
    }

    /// Returns the parameter reflect.
    ///
    /// # Errors
    ///
    /// See [`InstanceView::as_parameter`].
    pub fn as_parameter(&self) -> Result<ParameterView<'_>> {
        self.view().as_parameter()
    }

    /// Releases the registry borrow.
    #[must_use]
    pub fn finish(self) -> Instance {
        self.instance
    }
}
