//! Codecs: stateless strategies converting one type to and from the protocol.

use core::any::Any;

use crate::descriptor::{BaseType, TypeDescriptor};
use crate::error::CodecError;
use crate::protocol::{Sink, Source};
use crate::resolver::Resolver;

/// A type-erased value as produced by [`DynCodec::read_any`].
pub type AnyValue = Box<dyn Any + Send>;

/// Recovers the concrete type of an erased value.
pub fn downcast<T: 'static>(value: AnyValue, ty: &TypeDescriptor) -> Result<T, CodecError> {
    value
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| CodecError::type_mismatch::<T>(ty))
}

/// Reads and writes values of one Rust type.
///
/// Codecs are shared across threads and calls; all per-call state lives on the
/// [`Sink`] or [`Source`].
pub trait Codec: Send + Sync + 'static {
    /// The Rust type handled by this codec.
    type Value: Send + 'static;

    /// Reads one value.
    fn read(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Self::Value, CodecError>;

    /// Writes one value.
    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Self::Value,
    ) -> Result<(), CodecError>;

    /// The runtime type of `value` when it is more specific than the
    /// descriptor the codec was resolved for. Codecs of open types override
    /// this; `None` means the value is exactly the resolved type.
    fn runtime_type(&self, value: &Self::Value) -> Option<BaseType> {
        let _ = value;
        None
    }

    /// The concrete payload of `value`, handed to the codec of its runtime type.
    fn concrete<'a>(&self, value: &'a Self::Value) -> &'a dyn Any {
        value
    }

    /// Converts a value decoded by the codec of a runtime type into this
    /// codec's value type.
    fn adopt(&self, concrete: AnyValue) -> Result<Self::Value, AnyValue> {
        concrete.downcast::<Self::Value>().map(|value| *value)
    }

    /// False for sentinels that fail on use.
    fn resolved(&self) -> bool {
        true
    }
}

/// The object-safe face of a [`Codec`], as handed out by resolvers.
///
/// Implemented for every [`Codec`]; the option helpers let wrappers build and
/// take apart `Option<Value>` without naming the value type.
pub trait DynCodec: Send + Sync {
    /// Name of the Rust value type, for diagnostics.
    fn value_type(&self) -> &'static str;

    /// False for sentinels that fail on use.
    fn resolved(&self) -> bool;

    /// The error a sentinel fails with.
    fn failure(&self) -> Option<&CodecError> {
        None
    }

    /// Reads one value.
    fn read_any(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<AnyValue, CodecError>;

    /// Writes one value.
    fn write_any(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &dyn Any,
    ) -> Result<(), CodecError>;

    /// See [`Codec::runtime_type`].
    fn runtime_type_any(
        &self,
        ty: &TypeDescriptor,
        value: &dyn Any,
    ) -> Result<Option<BaseType>, CodecError>;

    /// See [`Codec::concrete`].
    fn concrete_any<'a>(
        &self,
        ty: &TypeDescriptor,
        value: &'a dyn Any,
    ) -> Result<&'a dyn Any, CodecError>;

    /// See [`Codec::adopt`].
    fn adopt_any(&self, ty: &TypeDescriptor, concrete: AnyValue) -> Result<AnyValue, CodecError>;

    /// An erased `Option::<Value>::None`.
    fn none_any(&self, ty: &TypeDescriptor) -> Result<AnyValue, CodecError>;

    /// Wraps an erased `Value` into an erased `Option<Value>`.
    fn some_any(&self, ty: &TypeDescriptor, value: AnyValue) -> Result<AnyValue, CodecError>;

    /// Looks inside an erased `Option<Value>`.
    fn unwrap_option_any<'a>(
        &self,
        ty: &TypeDescriptor,
        value: &'a dyn Any,
    ) -> Result<Option<&'a dyn Any>, CodecError>;
}

fn view<'a, C: Codec>(ty: &TypeDescriptor, value: &'a dyn Any) -> Result<&'a C::Value, CodecError> {
    value
        .downcast_ref::<C::Value>()
        .ok_or_else(|| CodecError::type_mismatch::<C::Value>(ty))
}

impl<C: Codec> DynCodec for C {
    fn value_type(&self) -> &'static str {
        core::any::type_name::<C::Value>()
    }

    fn resolved(&self) -> bool {
        Codec::resolved(self)
    }

    fn read_any(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<AnyValue, CodecError> {
        let value = self.read(resolver, ty, source)?;
        Ok(Box::new(value))
    }

    fn write_any(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &dyn Any,
    ) -> Result<(), CodecError> {
        self.write(resolver, ty, sink, view::<C>(ty, value)?)
    }

    fn runtime_type_any(
        &self,
        ty: &TypeDescriptor,
        value: &dyn Any,
    ) -> Result<Option<BaseType>, CodecError> {
        Ok(self.runtime_type(view::<C>(ty, value)?))
    }

    fn concrete_any<'a>(
        &self,
        ty: &TypeDescriptor,
        value: &'a dyn Any,
    ) -> Result<&'a dyn Any, CodecError> {
        Ok(self.concrete(view::<C>(ty, value)?))
    }

    fn adopt_any(&self, ty: &TypeDescriptor, concrete: AnyValue) -> Result<AnyValue, CodecError> {
        match self.adopt(concrete) {
            Ok(value) => Ok(Box::new(value)),
            Err(_) => Err(CodecError::type_mismatch::<C::Value>(ty)),
        }
    }

    fn none_any(&self, _ty: &TypeDescriptor) -> Result<AnyValue, CodecError> {
        Ok(Box::new(None::<C::Value>))
    }

    fn some_any(&self, ty: &TypeDescriptor, value: AnyValue) -> Result<AnyValue, CodecError> {
        let value = downcast::<C::Value>(value, ty)?;
        Ok(Box::new(Some(value)))
    }

    fn unwrap_option_any<'a>(
        &self,
        ty: &TypeDescriptor,
        value: &'a dyn Any,
    ) -> Result<Option<&'a dyn Any>, CodecError> {
        let option = value
            .downcast_ref::<Option<C::Value>>()
            .ok_or_else(|| CodecError::type_mismatch::<Option<C::Value>>(ty))?;
        Ok(option.as_ref().map(|value| value as &dyn Any))
    }
}
