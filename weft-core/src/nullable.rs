//! The first-level nullable wrapper.

use core::any::Any;
use std::sync::Arc;

use crate::codec::{AnyValue, DynCodec};
use crate::descriptor::{BaseType, TypeDescriptor};
use crate::error::CodecError;
use crate::framing::{read_nested_any, write_nested_any};
use crate::protocol::{IT, Sink, Source};
use crate::resolver::Resolver;

/// Codec for `T?` built around the codec for `T`.
///
/// Writes a null marker labeled [`IT`]; when the value is present it follows
/// as a nested field with the same label. Values are `Option<T>`.
pub struct NullableCodec {
    inner: Arc<dyn DynCodec>,
}

impl NullableCodec {
    /// Wraps the codec of the non-nullable type.
    pub fn new(inner: Arc<dyn DynCodec>) -> Self {
        Self { inner }
    }
}

fn nested_optional(ty: &TypeDescriptor) -> CodecError {
    CodecError::backend(format!("{ty} cannot itself be wrapped in another optional"))
}

impl DynCodec for NullableCodec {
    fn value_type(&self) -> &'static str {
        "Option<_>"
    }

    fn resolved(&self) -> bool {
        self.inner.resolved()
    }

    fn read_any(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<AnyValue, CodecError> {
        let base = ty.with_nullable(false);
        if source.is_null(IT)? {
            return self.inner.none_any(&base);
        }
        let value = read_nested_any(resolver, source, IT, &base, &*self.inner)?;
        self.inner.some_any(&base, value)
    }

    fn write_any(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &dyn Any,
    ) -> Result<(), CodecError> {
        let base = ty.with_nullable(false);
        match self.inner.unwrap_option_any(&base, value)? {
            None => sink.put_null(IT, true),
            Some(value) => {
                sink.put_null(IT, false)?;
                write_nested_any(resolver, sink, IT, &base, &*self.inner, value)
            }
        }
    }

    fn runtime_type_any(
        &self,
        _ty: &TypeDescriptor,
        _value: &dyn Any,
    ) -> Result<Option<BaseType>, CodecError> {
        Ok(None)
    }

    fn concrete_any<'a>(
        &self,
        _ty: &TypeDescriptor,
        value: &'a dyn Any,
    ) -> Result<&'a dyn Any, CodecError> {
        Ok(value)
    }

    fn adopt_any(&self, _ty: &TypeDescriptor, concrete: AnyValue) -> Result<AnyValue, CodecError> {
        Ok(concrete)
    }

    fn none_any(&self, ty: &TypeDescriptor) -> Result<AnyValue, CodecError> {
        Err(nested_optional(ty))
    }

    fn some_any(&self, ty: &TypeDescriptor, _value: AnyValue) -> Result<AnyValue, CodecError> {
        Err(nested_optional(ty))
    }

    fn unwrap_option_any<'a>(
        &self,
        ty: &TypeDescriptor,
        _value: &'a dyn Any,
    ) -> Result<Option<&'a dyn Any>, CodecError> {
        Err(nested_optional(ty))
    }
}
