//! Field framing shared by record and container codecs.
//!
//! The erased functions do the actual work; [`SinkExt`] and [`SourceExt`] are
//! typed conveniences for hand-written record codecs.

use core::any::Any;
use std::borrow::Cow;

use tracing::trace;

use crate::codec::{AnyValue, DynCodec, downcast};
use crate::descriptor::{PrimitiveCode, TypeDescriptor};
use crate::error::CodecError;
use crate::protocol::{Nested, Sink, Source};
use crate::resolver::Resolver;
use crate::scalar::{Primitive, Scalar};

/// Writes `value` as a nested field with static descriptor `ty`, which must
/// not be nullable. Open descriptors are dispatched on the runtime type of
/// the value.
pub fn write_nested_any(
    resolver: &dyn Resolver,
    sink: &mut dyn Sink,
    label: &str,
    ty: &TypeDescriptor,
    codec: &dyn DynCodec,
    value: &dyn Any,
) -> Result<(), CodecError> {
    if ty.is_terminal() {
        sink.begin_nested(label, ty, ty)?;
        codec.write_any(resolver, ty, sink, value)?;
    } else {
        let actual = match codec.runtime_type_any(ty, value)? {
            Some(runtime) => ty.for_instance(&runtime),
            None => ty.clone(),
        };
        trace!(label, %ty, %actual, "dispatching on runtime type");
        sink.begin_nested(label, ty, &actual)?;
        let payload = codec.concrete_any(ty, value)?;
        resolver
            .resolve(&actual)
            .write_any(resolver, &actual, sink, payload)?;
    }
    sink.end_nested(label, ty)
}

/// Reads a nested field with static descriptor `ty`, which must not be
/// nullable. A substituted descriptor is re-resolved and the decoded value is
/// handed back to `codec` for adoption.
pub fn read_nested_any(
    resolver: &dyn Resolver,
    source: &mut dyn Source,
    label: &str,
    ty: &TypeDescriptor,
    codec: &dyn DynCodec,
) -> Result<AnyValue, CodecError> {
    let value = match source.begin_nested(label, ty)? {
        Nested::Nest => codec.read_any(resolver, ty, source)?,
        Nested::Substitute(actual) => {
            let actual = actual.align_with(ty);
            trace!(label, %ty, %actual, "substituted");
            let concrete = resolver
                .resolve(&actual)
                .read_any(resolver, &actual, source)?;
            codec.adopt_any(ty, concrete)?
        }
    };
    source.end_nested(label, ty)?;
    Ok(value)
}

/// Writes an optional nested field: the null marker, then the field if present.
/// `value` is an erased `Option<V>` where `codec` handles `V`.
pub fn write_nullable_nested_any(
    resolver: &dyn Resolver,
    sink: &mut dyn Sink,
    label: &str,
    ty: &TypeDescriptor,
    codec: &dyn DynCodec,
    value: &dyn Any,
) -> Result<(), CodecError> {
    let ty = non_null(ty);
    match codec.unwrap_option_any(&ty, value)? {
        None => sink.put_null(label, true),
        Some(value) => {
            sink.put_null(label, false)?;
            write_nested_any(resolver, sink, label, &ty, codec, value)
        }
    }
}

/// Reads an optional nested field into an erased `Option<V>`.
pub fn read_nullable_nested_any(
    resolver: &dyn Resolver,
    source: &mut dyn Source,
    label: &str,
    ty: &TypeDescriptor,
    codec: &dyn DynCodec,
) -> Result<AnyValue, CodecError> {
    let ty = non_null(ty);
    if source.is_null(label)? {
        return codec.none_any(&ty);
    }
    let value = read_nested_any(resolver, source, label, &ty, codec)?;
    codec.some_any(&ty, value)
}

fn non_null(ty: &TypeDescriptor) -> Cow<'_, TypeDescriptor> {
    if ty.is_nullable() {
        Cow::Owned(ty.with_nullable(false))
    } else {
        Cow::Borrowed(ty)
    }
}

/// Typed field helpers for writers.
pub trait SinkExt {
    /// Writes a nested field, resolving the codec for `ty`.
    fn put_nested<T: Send + 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
        value: &T,
    ) -> Result<(), CodecError>;

    /// Writes an optional nested field.
    fn put_nullable_nested<T: Send + 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
        value: Option<&T>,
    ) -> Result<(), CodecError>;

    /// Writes a primitive through its accessor.
    fn put_primitive<P: Primitive>(&mut self, label: &str, value: &P) -> Result<(), CodecError>;

    /// Writes an optional primitive: the null marker, then the value if present.
    fn put_nullable<P: Primitive>(
        &mut self,
        label: &str,
        value: Option<&P>,
    ) -> Result<(), CodecError>;

    /// Writes a tagged scalar.
    fn put_scalar(&mut self, label: &str, value: &Scalar) -> Result<(), CodecError>;

    /// Frames `body` with `begin(ty)` and `end(ty)`.
    fn mark_around<F>(&mut self, ty: &TypeDescriptor, body: F) -> Result<(), CodecError>
    where
        F: FnOnce(&mut Self) -> Result<(), CodecError>;
}

impl<'s> SinkExt for dyn Sink + 's {
    fn put_nested<T: Send + 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
        value: &T,
    ) -> Result<(), CodecError> {
        let ty = non_null(ty);
        let codec = resolver.resolve(&ty);
        write_nested_any(resolver, self, label, &ty, &*codec, value)
    }

    fn put_nullable_nested<T: Send + 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
        value: Option<&T>,
    ) -> Result<(), CodecError> {
        match value {
            None => self.put_null(label, true),
            Some(value) => {
                self.put_null(label, false)?;
                self.put_nested(resolver, label, ty, value)
            }
        }
    }

    fn put_primitive<P: Primitive>(&mut self, label: &str, value: &P) -> Result<(), CodecError> {
        value.put(self, label)
    }

    fn put_nullable<P: Primitive>(
        &mut self,
        label: &str,
        value: Option<&P>,
    ) -> Result<(), CodecError> {
        match value {
            None => self.put_null(label, true),
            Some(value) => {
                self.put_null(label, false)?;
                value.put(self, label)
            }
        }
    }

    fn put_scalar(&mut self, label: &str, value: &Scalar) -> Result<(), CodecError> {
        value.put(self, label)
    }

    fn mark_around<F>(&mut self, ty: &TypeDescriptor, body: F) -> Result<(), CodecError>
    where
        F: FnOnce(&mut Self) -> Result<(), CodecError>,
    {
        self.begin(ty)?;
        body(self)?;
        self.end(ty)
    }
}

/// Typed field helpers for readers.
pub trait SourceExt {
    /// Reads a nested field, resolving the codec for `ty`.
    fn get_nested<T: 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
    ) -> Result<T, CodecError>;

    /// Reads an optional nested field.
    fn get_nullable_nested<T: 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
    ) -> Result<Option<T>, CodecError>;

    /// Reads a primitive through its accessor.
    fn get_primitive<P: Primitive>(&mut self, label: &str) -> Result<P, CodecError>;

    /// Reads an optional primitive.
    fn get_nullable<P: Primitive>(&mut self, label: &str) -> Result<Option<P>, CodecError>;

    /// Reads a scalar of kind `code`.
    fn get_scalar(&mut self, label: &str, code: PrimitiveCode) -> Result<Scalar, CodecError>;

    /// Frames `body` with `begin(ty)` and `end(ty)`.
    fn mark_around<T, F>(&mut self, ty: &TypeDescriptor, body: F) -> Result<T, CodecError>
    where
        F: FnOnce(&mut Self) -> Result<T, CodecError>;
}

impl<'s> SourceExt for dyn Source + 's {
    fn get_nested<T: 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
    ) -> Result<T, CodecError> {
        let ty = non_null(ty);
        let codec = resolver.resolve(&ty);
        let value = read_nested_any(resolver, self, label, &ty, &*codec)?;
        downcast(value, &ty)
    }

    fn get_nullable_nested<T: 'static>(
        &mut self,
        resolver: &dyn Resolver,
        label: &str,
        ty: &TypeDescriptor,
    ) -> Result<Option<T>, CodecError> {
        if self.is_null(label)? {
            return Ok(None);
        }
        self.get_nested(resolver, label, ty).map(Some)
    }

    fn get_primitive<P: Primitive>(&mut self, label: &str) -> Result<P, CodecError> {
        P::get(self, label)
    }

    fn get_nullable<P: Primitive>(&mut self, label: &str) -> Result<Option<P>, CodecError> {
        if self.is_null(label)? {
            return Ok(None);
        }
        P::get(self, label).map(Some)
    }

    fn get_scalar(&mut self, label: &str, code: PrimitiveCode) -> Result<Scalar, CodecError> {
        Scalar::get(self, label, code)
    }

    fn mark_around<T, F>(&mut self, ty: &TypeDescriptor, body: F) -> Result<T, CodecError>
    where
        F: FnOnce(&mut Self) -> Result<T, CodecError>,
    {
        self.begin(ty)?;
        let value = body(self)?;
        self.end(ty)?;
        Ok(value)
    }
}
