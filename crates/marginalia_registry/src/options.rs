//! Identifier options.

use std::sync::Arc;

use marginalia_foundation::{Record, Target, Value};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rules an identifier imposes on where and how it is attached.
///
/// Options are normalized when an identifier is created: if no target kind
/// is allowed explicitly, all four are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdentifierOptions {
    /// May decorate classes.
    pub class: bool,
    /// May decorate methods.
    pub method: bool,
    /// May decorate fields.
    pub field: bool,
    /// May decorate method parameters.
    pub parameter: bool,
    /// Rejected on instance members.
    pub not_instance: bool,
    /// Rejected on static members.
    pub not_static: bool,
    /// Values need not be retained after the initial application. Advisory.
    pub not_persistent: bool,
    /// At most one value per element; a new value replaces the old.
    pub not_multiple: bool,
    /// Values are never resolved from a parent class or overridden property.
    pub not_inheritor: bool,
    /// Record field extracted by the scalar accessors.
    pub single: Option<Arc<str>>,
}

impl IdentifierOptions {
    /// Creates options with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows the given target kind.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        match target {
            Target::Class => self.class = true,
            Target::Method => self.method = true,
            Target::Field => self.field = true,
            Target::Parameter => self.parameter = true,
        }
        self
    }

    /// Allows each of the given target kinds.
    #[must_use]
    pub fn with_targets(self, targets: &[Target]) -> Self {
        targets.iter().fold(self, |opts, t| opts.with_target(*t))
    }

    /// Builder method to reject instance members.
    #[must_use]
    pub fn with_not_instance(mut self, value: bool) -> Self {
        self.not_instance = value;
        self
    }

    /// Builder method to reject static members.
    #[must_use]
    pub fn with_not_static(mut self, value: bool) -> Self {
        self.not_static = value;
        self
    }

    /// Builder method to mark values as not persistent.
    #[must_use]
    pub fn with_not_persistent(mut self, value: bool) -> Self {
        self.not_persistent = value;
        self
    }

    /// Builder method to keep at most one value.
    #[must_use]
    pub fn with_not_multiple(mut self, value: bool) -> Self {
        self.not_multiple = value;
        self
    }

    /// Builder method to stop inheritance of values.
    #[must_use]
    pub fn with_not_inheritor(mut self, value: bool) -> Self {
        self.not_inheritor = value;
        self
    }

    /// Builder method to set the scalar extraction key.
    ///
    /// An empty key is the same as no key.
    #[must_use]
    pub fn with_single(mut self, key: impl Into<Arc<str>>) -> Self {
        let key = key.into();
        self.single = (!key.is_empty()).then_some(key);
        self
    }

    /// Returns the options with the default target set applied.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if !(self.class || self.method || self.field || self.parameter) {
            self.class = true;
            self.method = true;
            self.field = true;
            self.parameter = true;
        }
        self
    }

    /// Returns true if the target kind is allowed.
    #[must_use]
    pub fn allows(&self, target: Target) -> bool {
        match target {
            Target::Class => self.class,
            Target::Method => self.method,
            Target::Field => self.field,
            Target::Parameter => self.parameter,
        }
    }

    /// Exports the options as a record.
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("class", self.class)
            .with("method", self.method)
            .with("field", self.field)
            .with("parameter", self.parameter)
            .with("not_instance", self.not_instance)
            .with("not_static", self.not_static)
            .with("not_persistent", self.not_persistent)
            .with("not_multiple", self.not_multiple)
            .with("not_inheritor", self.not_inheritor)
            .with("single", self.single.clone().map(Value::from))
    }
}
