//! Mapping descriptors to codecs, and composing resolvers.

use core::any::Any;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::{AnyValue, DynCodec, downcast};
use crate::descriptor::{BaseType, TypeDescriptor};
use crate::error::CodecError;
use crate::framing::{read_nested_any, write_nested_any};
use crate::nullable::NullableCodec;
use crate::protocol::{IT, Sink, Source};

/// Maps a [`TypeDescriptor`] to the codec that handles it.
///
/// Resolvers are immutable once published and may be queried from many
/// threads at once.
pub trait Resolver: Send + Sync {
    /// Finds a codec, or `None` if this resolver knows nothing about `ty`.
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>>;

    /// Finds a codec, falling back to a [`NoCodec`] that fails on first use.
    fn resolve(&self, ty: &TypeDescriptor) -> Arc<dyn DynCodec> {
        self.lookup(ty).unwrap_or_else(|| {
            debug!(%ty, "no codec registered");
            Arc::new(NoCodec::unresolved(ty.clone()))
        })
    }

    /// Like [`resolve`](Resolver::resolve), but a missing codec is an error
    /// now rather than on first use.
    fn resolve_checked(&self, ty: &TypeDescriptor) -> Result<Arc<dyn DynCodec>, CodecError> {
        let codec = self.resolve(ty);
        match codec.failure() {
            Some(error) => Err(error.clone()),
            None if !codec.resolved() => Err(CodecError::Unresolved {
                descriptor: ty.clone(),
            }),
            None => Ok(codec),
        }
    }
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        (**self).lookup(ty)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        (**self).lookup(ty)
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        (**self).lookup(ty)
    }
}

/// Composition operators for resolvers.
pub trait ResolverExt: Resolver + Sized {
    /// Tries `self` first and falls back to `next` when `self` has no codec.
    fn then<N: Resolver>(self, next: N) -> Then<Self, N> {
        Then { first: self, next }
    }

    /// Resolves nullable descriptors by wrapping the non-nullable resolution
    /// in a [`NullableCodec`].
    fn with_nullable_support(self) -> NullableSupport<Self> {
        NullableSupport { inner: self }
    }

    /// Rewrites every occurrence of `from` to `to` before looking up.
    fn retarget(self, from: BaseType, to: BaseType) -> Retarget<Self> {
        Retarget {
            inner: self,
            from,
            to,
        }
    }
}

impl<R: Resolver> ResolverExt for R {}

/// First-match-wins chaining, see [`ResolverExt::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    next: B,
}

impl<A: Resolver, B: Resolver> Resolver for Then<A, B> {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        match self.first.lookup(ty) {
            Some(codec) if codec.resolved() => Some(codec),
            failed => {
                trace!(%ty, "falling back to next resolver");
                match self.next.lookup(ty) {
                    Some(codec) if codec.resolved() => Some(codec),
                    other => failed.or(other),
                }
            }
        }
    }
}

/// See [`ResolverExt::with_nullable_support`].
#[derive(Debug, Clone)]
pub struct NullableSupport<R> {
    inner: R,
}

impl<R: Resolver> Resolver for NullableSupport<R> {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        if !ty.is_nullable() {
            return self.inner.lookup(ty);
        }
        let codec = self.inner.lookup(&ty.with_nullable(false))?;
        if !codec.resolved() {
            return Some(codec);
        }
        Some(Arc::new(NullableCodec::new(codec)))
    }
}

/// See [`ResolverExt::retarget`].
#[derive(Debug, Clone)]
pub struct Retarget<R> {
    inner: R,
    from: BaseType,
    to: BaseType,
}

impl<R: Resolver> Resolver for Retarget<R> {
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Arc<dyn DynCodec>> {
        self.inner.lookup(&ty.substitute_base(&self.from, &self.to))
    }
}

/// Sentinel returned when resolution fails. Every operation fails immediately
/// with the error it was created with, before touching the value, sink or
/// source.
#[derive(Debug, Clone)]
pub struct NoCodec {
    error: CodecError,
}

impl NoCodec {
    /// Nothing is registered for `descriptor`.
    pub fn unresolved(descriptor: TypeDescriptor) -> Self {
        Self {
            error: CodecError::Unresolved { descriptor },
        }
    }

    /// The codec for `descriptor` exists but needs a different number of
    /// type arguments.
    pub fn arity(descriptor: TypeDescriptor, expected: usize) -> Self {
        let found = descriptor.args().len();
        Self {
            error: CodecError::Arity {
                descriptor,
                expected,
                found,
            },
        }
    }

    /// The error this sentinel reports.
    pub fn error(&self) -> &CodecError {
        &self.error
    }

    fn fail<T>(&self) -> Result<T, CodecError> {
        Err(self.error.clone())
    }
}

impl DynCodec for NoCodec {
    fn value_type(&self) -> &'static str {
        "!"
    }

    fn resolved(&self) -> bool {
        false
    }

    fn failure(&self) -> Option<&CodecError> {
        Some(&self.error)
    }

    fn read_any(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        _source: &mut dyn Source,
    ) -> Result<AnyValue, CodecError> {
        self.fail()
    }

    fn write_any(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        _sink: &mut dyn Sink,
        _value: &dyn Any,
    ) -> Result<(), CodecError> {
        self.fail()
    }

    fn runtime_type_any(
        &self,
        _ty: &TypeDescriptor,
        _value: &dyn Any,
    ) -> Result<Option<BaseType>, CodecError> {
        self.fail()
    }

    fn concrete_any<'a>(
        &self,
        _ty: &TypeDescriptor,
        _value: &'a dyn Any,
    ) -> Result<&'a dyn Any, CodecError> {
        self.fail()
    }

    fn adopt_any(&self, _ty: &TypeDescriptor, _concrete: AnyValue) -> Result<AnyValue, CodecError> {
        self.fail()
    }

    fn none_any(&self, _ty: &TypeDescriptor) -> Result<AnyValue, CodecError> {
        self.fail()
    }

    fn some_any(&self, _ty: &TypeDescriptor, _value: AnyValue) -> Result<AnyValue, CodecError> {
        self.fail()
    }

    fn unwrap_option_any<'a>(
        &self,
        _ty: &TypeDescriptor,
        _value: &'a dyn Any,
    ) -> Result<Option<&'a dyn Any>, CodecError> {
        self.fail()
    }
}

// Nullable descriptors nest through their wrapper; a failing sentinel must
// fail before anything is consumed or emitted.
fn direct(ty: &TypeDescriptor, codec: &dyn DynCodec) -> bool {
    ty.is_terminal() || ty.is_nullable() || !codec.resolved()
}

/// Reads a value of type `T` described by `ty`.
///
/// Open descriptors are read as a tagged field labeled [`IT`] so the runtime
/// type can be recovered.
pub fn read<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    source: &mut dyn Source,
) -> Result<T, CodecError> {
    let codec = resolver.resolve(ty);
    let value = if direct(ty, &*codec) {
        codec.read_any(resolver, ty, source)?
    } else {
        read_nested_any(resolver, source, IT, ty, &*codec)?
    };
    downcast(value, ty)
}

/// Writes `value` as described by `ty`.
pub fn write<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    sink: &mut dyn Sink,
    value: &T,
) -> Result<(), CodecError> {
    let codec = resolver.resolve(ty);
    let value: &dyn Any = value;
    if direct(ty, &*codec) {
        codec.write_any(resolver, ty, sink, value)
    } else {
        write_nested_any(resolver, sink, IT, ty, &*codec, value)
    }
}
