//! Parameter reflects: one per formal parameter of a method.

use marginalia_foundation::{ParameterId, PropertyId, Record, Type};

use crate::decorator::{DecoratorMap, Touch};
use crate::element::{ElementRef, Reflected};
use crate::property::PropertyView;
use crate::store::ReflectStore;

#[derive(Debug)]
pub(crate) struct ParameterReflect {
    pub(crate) property: PropertyId,
    pub(crate) index: usize,
    pub(crate) ty: Option<Type>,
    pub(crate) decorators: DecoratorMap,
    pub(crate) current: Option<Touch>,
}

/// Borrowed read handle over a parameter reflect.
///
/// Parameters do not inherit: every read sees the parameter's own values.
#[derive(Clone, Copy, Debug)]
pub struct ParameterView<'s> {
    store: &'s ReflectStore,
    id: ParameterId,
    data: &'s ParameterReflect,
}

impl<'s> ParameterView<'s> {
    pub(crate) fn new(store: &'s ReflectStore, id: ParameterId, data: &'s ParameterReflect) -> Self {
        Self { store, id, data }
    }

    /// Returns the arena id.
    #[must_use]
    pub fn id(&self) -> ParameterId {
        self.id
    }

    /// Returns the zero-based position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.data.index
    }

    /// Returns the declared type, when the body declared one.
    #[must_use]
    pub fn ty(&self) -> Option<&'s Type> {
        self.data.ty.as_ref()
    }

    /// Returns the owning method.
    #[must_use]
    pub fn property(&self) -> PropertyView<'s> {
        self.store.property_at(self.data.property)
    }

    /// Exports the parameter as a record tree.
    #[must_use]
    pub fn info(&self, detailed: bool) -> Record {
        let rec = Record::new()
            .with("index", self.data.index)
            .with("type", self.data.ty.clone());
        if !detailed {
            return rec;
        }
        rec.with("description", self.description())
            .with(
                "property",
                ReflectStore::reference(self.property().description()),
            )
    }
}

impl Reflected for ParameterView<'_> {
    fn store(&self) -> &ReflectStore {
        self.store
    }

    fn element(&self) -> ElementRef {
        ElementRef::Parameter(self.id)
    }
}
