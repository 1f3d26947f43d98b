//! Pair and triple codecs.

use core::marker::PhantomData;

use weft_core::{Codec, CodecError, Resolver, Sink, Source, TypeDescriptor};

use crate::primitive::Slot;

fn slots<const N: usize>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
) -> Result<[Slot; N], CodecError> {
    ty.expect_arity(N)?;
    let mut slots = Vec::with_capacity(N);
    for arg in ty.args() {
        slots.push(Slot::resolve(resolver, arg)?);
    }
    slots
        .try_into()
        .map_err(|_| CodecError::protocol(format!("{N} slots"), ty))
}

/// Codec for `(A, B)` described as `Pair<A, B>`; fields `first` and `second`.
pub struct PairCodec<A, B>(PhantomData<fn() -> (A, B)>);

impl<A, B> PairCodec<A, B> {
    /// The codec for `(A, B)`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<A, B> Default for PairCodec<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> Codec for PairCodec<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    type Value = (A, B);

    fn read(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<(A, B), CodecError> {
        let [a, b] = slots(resolver, ty)?;
        source.begin(ty)?;
        let first = a.read(resolver, source, "first", ty.arg(0)?)?;
        let second = b.read(resolver, source, "second", ty.arg(1)?)?;
        source.end(ty)?;
        Ok((first, second))
    }

    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        (first, second): &(A, B),
    ) -> Result<(), CodecError> {
        let [a, b] = slots(resolver, ty)?;
        sink.begin(ty)?;
        a.write(resolver, sink, "first", ty.arg(0)?, first)?;
        b.write(resolver, sink, "second", ty.arg(1)?, second)?;
        sink.end(ty)
    }
}

/// Codec for `(A, B, C)` described as `Triple<A, B, C>`; fields `first`,
/// `second` and `third`.
pub struct TripleCodec<A, B, C>(PhantomData<fn() -> (A, B, C)>);

impl<A, B, C> TripleCodec<A, B, C> {
    /// The codec for `(A, B, C)`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<A, B, C> Default for TripleCodec<A, B, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B, C> Codec for TripleCodec<A, B, C>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
{
    type Value = (A, B, C);

    fn read(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<(A, B, C), CodecError> {
        let [a, b, c] = slots(resolver, ty)?;
        source.begin(ty)?;
        let first = a.read(resolver, source, "first", ty.arg(0)?)?;
        let second = b.read(resolver, source, "second", ty.arg(1)?)?;
        let third = c.read(resolver, source, "third", ty.arg(2)?)?;
        source.end(ty)?;
        Ok((first, second, third))
    }

    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        (first, second, third): &(A, B, C),
    ) -> Result<(), CodecError> {
        let [a, b, c] = slots(resolver, ty)?;
        sink.begin(ty)?;
        a.write(resolver, sink, "first", ty.arg(0)?, first)?;
        b.write(resolver, sink, "second", ty.arg(1)?, second)?;
        c.write(resolver, sink, "third", ty.arg(2)?, third)?;
        sink.end(ty)
    }
}
