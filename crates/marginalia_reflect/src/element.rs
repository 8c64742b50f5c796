//! Operations shared by every reflected element.
//!
//! Classes, properties, and parameters all carry a decorator map and answer
//! the same questions about it. [`ElementRef`] names an element inside a
//! [`ReflectStore`]; [`Reflected`] supplies the shared operations to any
//! borrowed view that can name its element.

use std::fmt;
use std::sync::Arc;

use marginalia_foundation::{
    ClassId, Error, ErrorKind, IdentifierId, InstanceId, LtVec, ParameterId, PropertyId, Record,
    Result, Target, Value,
};

use crate::filter::Belongs;
use crate::store::ReflectStore;

/// A reflected element, by arena id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// A class reflect.
    Class(ClassId),
    /// A property reflect (method or field).
    Property(PropertyId),
    /// A parameter reflect.
    Parameter(ParameterId),
}

impl ElementRef {
    /// Returns the class id, if this is a class.
    #[must_use]
    pub const fn as_class(self) -> Option<ClassId> {
        match self {
            Self::Class(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the property id, if this is a property.
    #[must_use]
    pub const fn as_property(self) -> Option<PropertyId> {
        match self {
            Self::Property(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the parameter id, if this is a parameter.
    #[must_use]
    pub const fn as_parameter(self) -> Option<ParameterId> {
        match self {
            Self::Parameter(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "{id}"),
            Self::Property(id) => write!(f, "{id}"),
            Self::Parameter(id) => write!(f, "{id}"),
        }
    }
}

impl From<ClassId> for ElementRef {
    fn from(id: ClassId) -> Self {
        Self::Class(id)
    }
}

impl From<PropertyId> for ElementRef {
    fn from(id: PropertyId) -> Self {
        Self::Property(id)
    }
}

impl From<ParameterId> for ElementRef {
    fn from(id: ParameterId) -> Self {
        Self::Parameter(id)
    }
}

/// Decorator operations available on every reflected element.
///
/// Reads take an optional [`Belongs`] selecting own values, parent values, or
/// the merge of both. Parameters ignore it and always read their own map.
/// Unknown identifiers read as absent rather than failing.
pub trait Reflected {
    /// The store the element lives in.
    fn store(&self) -> &ReflectStore;

    /// The element being viewed.
    fn element(&self) -> ElementRef;

    /// Returns the structural site kind of the element.
    fn target(&self) -> Target {
        self.store().target_of(self.element())
    }

    /// Returns the human-readable description, e.g. `<class>sample.User`.
    fn description(&self) -> String {
        self.store().describe(self.element())
    }

    /// Returns the instance that most recently touched the element.
    fn current_instance(&self) -> Option<InstanceId> {
        self.store().touch_of(self.element()).map(|t| t.instance)
    }

    /// Returns the identifier of the instance that most recently touched the element.
    fn current_identifier(&self) -> Option<IdentifierId> {
        self.store().touch_of(self.element()).map(|t| t.identifier)
    }

    /// Returns the resolved decorator values keyed by identifier name.
    fn decorators(&self, belongs: Option<Belongs>) -> Vec<(Arc<str>, LtVec<Record>)> {
        let store = self.store();
        store
            .resolve(self.element(), belongs)
            .iter()
            .filter_map(|(id, values)| store.rule(id).map(|r| (r.name.clone(), values.clone())))
            .collect()
    }

    /// Returns true if the resolved map has an entry for `identifier`.
    fn has_decorator(&self, identifier: IdentifierId, belongs: Option<Belongs>) -> bool {
        self.store()
            .resolve(self.element(), belongs)
            .contains(identifier)
    }

    /// Returns every stored value for `identifier`, in insertion order.
    fn list_values(&self, identifier: IdentifierId, belongs: Option<Belongs>) -> LtVec<Record> {
        self.store()
            .resolve(self.element(), belongs)
            .get(identifier)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the first stored value for `identifier`.
    fn get_value(&self, identifier: IdentifierId, belongs: Option<Belongs>) -> Option<Record> {
        self.list_values(identifier, belongs).first().cloned()
    }

    /// Extracts the identifier's `single` field from every stored value.
    ///
    /// Values lacking the field yield [`Value::Nil`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidDecoratorReference` if the identifier was never
    /// declared, or `SingleNotSupported` if it has no `single` key.
    fn list_singles(&self, identifier: IdentifierId, belongs: Option<Belongs>) -> Result<Vec<Value>> {
        let store = self.store();
        let rule = store.rule(identifier).ok_or_else(|| {
            Error::new(ErrorKind::InvalidDecoratorReference(identifier.to_string()))
        })?;
        let Some(key) = rule.single.as_deref() else {
            return Err(Error::single_not_supported(
                rule.name.to_string(),
                self.description(),
            ));
        };
        Ok(self
            .list_values(identifier, belongs)
            .iter()
            .map(|rec| rec.get(key).cloned().unwrap_or(Value::Nil))
            .collect())
    }

    /// Returns the first extracted `single` value.
    ///
    /// # Errors
    ///
    /// Same as [`Reflected::list_singles`].
    fn get_single(&self, identifier: IdentifierId, belongs: Option<Belongs>) -> Result<Option<Value>> {
        Ok(self.list_singles(identifier, belongs)?.into_iter().next())
    }

    /// Returns true if `targets` is empty or contains this element's target.
    fn filter_by_target(&self, targets: &[Target]) -> bool {
        targets.is_empty() || targets.contains(&self.target())
    }

    /// Returns true if the element carries `identifier` under `belongs`.
    fn filter_by_belongs(&self, identifier: IdentifierId, belongs: Option<Belongs>) -> bool {
        self.has_decorator(identifier, belongs)
    }
}
