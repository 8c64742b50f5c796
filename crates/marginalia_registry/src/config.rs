//! Configuration for a registry.

use std::sync::Arc;

use marginalia_reflect::{DEFAULT_BUILTIN_ROOTS, DeclaredTypes, NoTypes, ReflectStore, TypeIntrospector};

/// Configuration for a [`Registry`](crate::Registry).
///
/// Controls class-root detection, type discovery, listing memoization, and
/// diagnostics.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Class names never recorded as a parent.
    pub builtin_roots: Vec<Arc<str>>,

    /// Emit a warning when two identifiers or aliases share a name.
    pub warn_on_name_collision: bool,

    /// Memoize property listings per class.
    pub memoize_queries: bool,

    /// Source of declared member types.
    pub introspector: Arc<dyn TypeIntrospector>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            builtin_roots: DEFAULT_BUILTIN_ROOTS.iter().map(|s| Arc::from(*s)).collect(),
            warn_on_name_collision: true,
            memoize_queries: true,
            introspector: Arc::new(DeclaredTypes),
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration that never discovers member types.
    ///
    /// Methods get one untyped parameter per declared argument.
    #[must_use]
    pub fn untyped() -> Self {
        Self {
            introspector: Arc::new(NoTypes),
            ..Self::default()
        }
    }

    /// Creates a configuration with collision warnings silenced.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            warn_on_name_collision: false,
            ..Self::default()
        }
    }

    /// Builder method to replace the builtin root names.
    #[must_use]
    pub fn with_builtin_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.builtin_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set collision warnings.
    #[must_use]
    pub fn with_warn_on_name_collision(mut self, warn: bool) -> Self {
        self.warn_on_name_collision = warn;
        self
    }

    /// Builder method to set listing memoization.
    #[must_use]
    pub fn with_memoize_queries(mut self, memoize: bool) -> Self {
        self.memoize_queries = memoize;
        self
    }

    /// Builder method to set the type introspector.
    #[must_use]
    pub fn with_introspector(mut self, introspector: Arc<dyn TypeIntrospector>) -> Self {
        self.introspector = introspector;
        self
    }

    /// Builds an empty reflect store honouring this configuration.
    pub(crate) fn store(&self) -> ReflectStore {
        ReflectStore::new()
            .with_builtin_roots(self.builtin_roots.iter().cloned())
            .with_memoize(self.memoize_queries)
            .with_introspector(Arc::clone(&self.introspector))
    }
}
