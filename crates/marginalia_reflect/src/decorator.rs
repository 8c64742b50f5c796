//! Decorator maps and the identifier rules that govern them.

use std::collections::HashMap;
use std::sync::Arc;

use marginalia_foundation::{IdentifierId, InstanceId, LtVec, Record};

/// The subset of identifier options a decorator map needs to know about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratorRule {
    /// Identifier name, used for keyed views and diagnostics.
    pub name: Arc<str>,
    /// At most one stored value; a new value replaces the old.
    pub not_multiple: bool,
    /// Values are never resolved from a parent element.
    pub not_inheritor: bool,
    /// Field extracted by the scalar (`single`) accessors.
    pub single: Option<Arc<str>>,
}

impl DecoratorRule {
    /// Creates a rule with default multiplicity and inheritance.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            not_multiple: false,
            not_inheritor: false,
            single: None,
        }
    }

    /// Returns the description used in `$ref` links.
    #[must_use]
    pub fn description(&self) -> String {
        format!("<identifier>{}", self.name)
    }
}

/// The most recent attachment that touched an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Touch {
    /// The attaching instance.
    pub instance: InstanceId,
    /// The instance's identifier.
    pub identifier: IdentifierId,
}

/// Insertion-ordered map from identifier to its stored values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecoratorMap {
    order: Vec<IdentifierId>,
    values: HashMap<IdentifierId, LtVec<Record>>,
}

impl DecoratorMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `id`.
    ///
    /// With `replace` the stored list becomes a singleton; otherwise the value
    /// is appended after the existing ones.
    pub fn store(&mut self, id: IdentifierId, record: Record, replace: bool) {
        let list = match self.values.get(&id) {
            Some(existing) if !replace => existing.push_back(record),
            _ => LtVec::unit(record),
        };
        self.put(id, list);
    }

    fn put(&mut self, id: IdentifierId, list: LtVec<Record>) {
        if self.values.insert(id, list).is_none() {
            self.order.push(id);
        }
    }

    /// Returns the values stored under `id`.
    #[must_use]
    pub fn get(&self, id: IdentifierId) -> Option<&LtVec<Record>> {
        self.values.get(&id)
    }

    /// Returns true if `id` has an entry.
    #[must_use]
    pub fn contains(&self, id: IdentifierId) -> bool {
        self.values.contains_key(&id)
    }

    /// Returns the number of identifiers with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no identifier has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentifierId, &LtVec<Record>)> {
        self.order.iter().map(|id| (*id, &self.values[id]))
    }

    /// Returns identifiers in first-insertion order.
    #[must_use]
    pub fn identifiers(&self) -> &[IdentifierId] {
        &self.order
    }

    /// Keeps only the entries for which `keep` returns true.
    #[must_use]
    pub fn retain(mut self, keep: impl Fn(IdentifierId) -> bool) -> Self {
        self.order.retain(|id| keep(*id));
        self.values.retain(|id, _| keep(*id));
        self
    }

    /// Overlays this map on top of `inherited`.
    ///
    /// Entries present here win over same-keyed inherited entries; own
    /// entries come first, followed by inherited-only ones.
    #[must_use]
    pub fn overlay(&self, inherited: &DecoratorMap) -> DecoratorMap {
        let mut merged = self.clone();
        for (id, list) in inherited.iter() {
            if !merged.contains(id) {
                merged.put(id, list.clone());
            }
        }
        merged
    }
}
