//! The process-wide registry: ordered providers, nullable support and a
//! concurrent memo cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::DynCodec;
use crate::descriptor::TypeDescriptor;
use crate::nullable::NullableCodec;
use crate::resolver::Resolver;

/// A resolver built once from an explicit list of providers.
///
/// Lookups try the providers in order, first match wins; nullable descriptors
/// are wrapped in a [`NullableCodec`]. Results are memoized: concurrent misses
/// on the same descriptor may both compute, and the last insert wins.
pub struct Registry {
    providers: Vec<Arc<dyn Resolver>>,
    cache: RwLock<HashMap<TypeDescriptor, Arc<dyn DynCodec>>>,
}

impl Registry {
    /// Starts an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Appends a provider after all existing ones. Taking `&mut self` keeps
    /// this to the time before the registry is shared.
    pub fn push_extra(&mut self, extra: impl Resolver + 'static) {
        self.providers.push(Arc::new(extra));
        self.cache.get_mut().clear();
    }

    /// Number of memoized descriptors.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn compute(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        if ty.is_nullable() {
            let inner = self.lookup(&ty.with_nullable(false))?;
            if !inner.resolved() {
                return Some(inner);
            }
            return Some(Arc::new(NullableCodec::new(inner)));
        }
        let mut failed = None;
        for provider in &self.providers {
            match provider.lookup(ty) {
                Some(codec) if codec.resolved() => return Some(codec),
                Some(codec) => {
                    failed.get_or_insert(codec);
                }
                None => {}
            }
        }
        failed
    }
}

impl Resolver for Registry {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        if let Some(codec) = self.cache.read().get(ty) {
            return Some(codec.clone());
        }
        let codec = self.compute(ty)?;
        debug!(%ty, value = codec.value_type(), "memoizing resolution");
        self.cache.write().insert(ty.clone(), codec.clone());
        Some(codec)
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.providers.len())
            .field("cached", &self.cached())
            .finish()
    }
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    providers: Vec<Arc<dyn Resolver>>,
    extras: Vec<Arc<dyn Resolver>>,
}

impl RegistryBuilder {
    /// Adds a provider. Providers are consulted in the order they are added.
    pub fn provider(mut self, provider: impl Resolver + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Adds an extra provider, consulted after every regular provider.
    pub fn extra(mut self, extra: impl Resolver + 'static) -> Self {
        self.extras.push(Arc::new(extra));
        self
    }

    /// Finishes the registry.
    pub fn build(self) -> Registry {
        let mut providers = self.providers;
        providers.extend(self.extras);
        Registry {
            providers,
            cache: RwLock::new(HashMap::new()),
        }
    }
}
