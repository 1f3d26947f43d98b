//! Primitive codecs and the unboxed slot helpers shared by containers.

use core::any::Any;
use core::marker::PhantomData;
use std::sync::Arc;

use weft_core::{
    Codec, CodecError, DynCodec, IT, Primitive, PrimitiveCode, Resolver, Sink, Source,
    TypeDescriptor, downcast, read_nested_any, read_nullable_nested_any, write_nested_any,
    write_nullable_nested_any,
};

/// Codec for a single primitive, read and written through the accessor of
/// its kind under the label [`IT`].
pub struct PrimitiveCodec<P>(PhantomData<fn() -> P>);

impl<P> PrimitiveCodec<P> {
    /// The codec for `P`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<P> Default for PrimitiveCodec<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Primitive> Codec for PrimitiveCodec<P> {
    type Value = P;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<P, CodecError> {
        P::get(source, IT)
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &P,
    ) -> Result<(), CodecError> {
        value.put(sink, IT)
    }
}

/// Runs `$body` with `$p` bound to the Rust type of primitive `$code`.
macro_rules! with_primitive {
    ($code:expr, |$p:ident| $body:expr) => {
        match $code {
            PrimitiveCode::Boolean => {
                type $p = bool;
                $body
            }
            PrimitiveCode::Byte => {
                type $p = i8;
                $body
            }
            PrimitiveCode::Short => {
                type $p = i16;
                $body
            }
            PrimitiveCode::Int => {
                type $p = i32;
                $body
            }
            PrimitiveCode::Long => {
                type $p = i64;
                $body
            }
            PrimitiveCode::Float => {
                type $p = f32;
                $body
            }
            PrimitiveCode::Double => {
                type $p = f64;
                $body
            }
            PrimitiveCode::Char => {
                type $p = char;
                $body
            }
            PrimitiveCode::Unit => {
                type $p = ();
                $body
            }
            PrimitiveCode::String => {
                type $p = String;
                $body
            }
        }
    };
}

// Moves `value` into `B` when both are the same type.
fn recast<A: 'static, B: 'static>(value: A) -> Option<B> {
    let mut slot = Some(value);
    (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<B>>()
        .and_then(Option::take)
}

/// Reads a primitive (or, for nullable `ty`, an optional primitive) slot
/// straight through the accessors, without a nested block.
pub(crate) fn read_primitive<T: 'static>(
    code: PrimitiveCode,
    ty: &TypeDescriptor,
    source: &mut dyn Source,
    label: &str,
) -> Result<T, CodecError> {
    let value: Option<T> = with_primitive!(code, |P| {
        if ty.is_nullable() {
            let value: Option<P> = if source.is_null(label)? {
                None
            } else {
                Some(P::get(source, label)?)
            };
            recast(value)
        } else {
            recast(P::get(source, label)?)
        }
    });
    value.ok_or_else(|| CodecError::type_mismatch::<T>(ty))
}

/// Writes a primitive slot; see [`read_primitive`].
pub(crate) fn write_primitive<T: 'static>(
    code: PrimitiveCode,
    ty: &TypeDescriptor,
    sink: &mut dyn Sink,
    label: &str,
    value: &T,
) -> Result<(), CodecError> {
    let value = value as &dyn Any;
    let mismatch = || CodecError::type_mismatch::<T>(ty);
    with_primitive!(code, |P| {
        if ty.is_nullable() {
            match value.downcast_ref::<Option<P>>().ok_or_else(mismatch)? {
                None => sink.put_null(label, true),
                Some(value) => {
                    sink.put_null(label, false)?;
                    value.put(sink, label)
                }
            }
        } else {
            value.downcast_ref::<P>().ok_or_else(mismatch)?.put(sink, label)
        }
    })
}

/// How one container element or tuple slot is coded. Settled before the
/// container opens its block, so a missing codec leaves no partial frame.
pub(crate) enum Slot {
    Primitive(PrimitiveCode),
    Nested(Arc<dyn DynCodec>),
}

impl Slot {
    pub(crate) fn resolve(
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
    ) -> Result<Self, CodecError> {
        match ty.primitive_code() {
            Some(code) => Ok(Self::Primitive(code)),
            None => resolver
                .resolve_checked(&ty.with_nullable(false))
                .map(Self::Nested),
        }
    }

    pub(crate) fn read<T: 'static>(
        &self,
        resolver: &dyn Resolver,
        source: &mut dyn Source,
        label: &str,
        ty: &TypeDescriptor,
    ) -> Result<T, CodecError> {
        let codec = match self {
            Self::Primitive(code) => return read_primitive(*code, ty, source, label),
            Self::Nested(codec) => &**codec,
        };
        let value = if ty.is_nullable() {
            read_nullable_nested_any(resolver, source, label, ty, codec)?
        } else {
            read_nested_any(resolver, source, label, ty, codec)?
        };
        downcast(value, ty)
    }

    pub(crate) fn write<T: 'static>(
        &self,
        resolver: &dyn Resolver,
        sink: &mut dyn Sink,
        label: &str,
        ty: &TypeDescriptor,
        value: &T,
    ) -> Result<(), CodecError> {
        match self {
            Self::Primitive(code) => write_primitive(*code, ty, sink, label, value),
            Self::Nested(codec) if ty.is_nullable() => {
                write_nullable_nested_any(resolver, sink, label, ty, &**codec, value)
            }
            Self::Nested(codec) => write_nested_any(resolver, sink, label, ty, &**codec, value),
        }
    }
}
