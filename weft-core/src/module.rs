//! Table-driven resolvers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::codec::{Codec, DynCodec};
use crate::descriptor::TypeDescriptor;
use crate::resolver::Resolver;

/// Produces a codec for any descriptor with a given base name, or `None`.
pub type Factory = Arc<dyn Fn(&TypeDescriptor) -> Option<Arc<dyn DynCodec>> + Send + Sync>;

/// A resolver backed by explicit registrations: exact descriptors first, then
/// factories keyed by base name.
#[derive(Clone, Default)]
pub struct Module {
    exact: HashMap<TypeDescriptor, Arc<dyn DynCodec>>,
    by_base: HashMap<Arc<str>, Factory>,
}

impl Module {
    /// Starts an empty module.
    pub fn builder() -> ModuleBuilder {
        ModuleBuilder::default()
    }

    /// Number of exact registrations.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.by_base.is_empty()
    }
}

impl Resolver for Module {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        if let Some(codec) = self.exact.get(ty) {
            trace!(%ty, "exact registration");
            return Some(codec.clone());
        }
        let factory = self.by_base.get(ty.name())?;
        trace!(%ty, "base factory");
        factory(ty)
    }
}

impl core::fmt::Debug for Module {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Module")
            .field("exact", &self.exact.keys().collect::<Vec<_>>())
            .field("by_base", &self.by_base.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Module`].
#[derive(Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    /// Registers `codec` for exactly `ty`. Later registrations replace earlier ones.
    pub fn codec<C: Codec>(self, ty: TypeDescriptor, codec: C) -> Self {
        self.dyn_codec(ty, Arc::new(codec))
    }

    /// Registers an already erased codec for exactly `ty`.
    pub fn dyn_codec(mut self, ty: TypeDescriptor, codec: Arc<dyn DynCodec>) -> Self {
        self.module.exact.insert(ty.with_nullable(false), codec);
        self
    }

    /// Registers a factory consulted for every descriptor whose base is `name`
    /// and which has no exact registration.
    pub fn base<F>(mut self, name: impl Into<Arc<str>>, factory: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> Option<Arc<dyn DynCodec>> + Send + Sync + 'static,
    {
        self.module.by_base.insert(name.into(), Arc::new(factory));
        self
    }

    /// Finishes the module.
    pub fn build(self) -> Module {
        self.module
    }
}
