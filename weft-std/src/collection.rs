//! Generic collection codecs.

use core::any::Any;
use core::hash::Hash;
use core::marker::PhantomData;
use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::trace;
use weft_core::{Codec, CodecError, Resolver, Sink, Source, TypeDescriptor, item_label};

use crate::primitive::Slot;

/// A growable collection the container codecs can fill and walk.
pub trait Elements: Default + Send + 'static {
    /// Element type.
    type Item: Send + 'static;

    /// Appends one decoded element.
    fn push_item(&mut self, item: Self::Item);

    /// Elements in write order.
    fn items(&self) -> impl Iterator<Item = &Self::Item>;
}

impl<T: Send + 'static> Elements for Vec<T> {
    type Item = T;

    fn push_item(&mut self, item: T) {
        self.push(item);
    }

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T: Send + 'static> Elements for VecDeque<T> {
    type Item = T;

    fn push_item(&mut self, item: T) {
        self.push_back(item);
    }

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T: Eq + Hash + Send + 'static> Elements for HashSet<T> {
    type Item = T;

    fn push_item(&mut self, item: T) {
        self.insert(item);
    }

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T: Ord + Send + 'static> Elements for BTreeSet<T> {
    type Item = T;

    fn push_item(&mut self, item: T) {
        self.insert(item);
    }

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

/// Codec for any [`Elements`] collection of one type argument.
///
/// The block holds one field per element, labeled `item0`, `item1`, ...
/// Primitive elements skip the nested block and go straight through the
/// accessors. Reading stops at the end of the block or as soon as the source
/// no longer requests continuation.
pub struct CollectionCodec<C>(PhantomData<fn() -> C>);

/// Codec for `Vec<T>`.
pub type ListCodec<T> = CollectionCodec<Vec<T>>;

/// Codec for `HashSet<T>`.
pub type SetCodec<T> = CollectionCodec<HashSet<T>>;

impl<C> CollectionCodec<C> {
    /// The codec for `C`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for CollectionCodec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Elements> Codec for CollectionCodec<C> {
    type Value = C;

    fn read(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<C, CodecError> {
        let element = ty.element()?;
        let slot = Slot::resolve(resolver, element)?;
        source.begin(ty)?;
        let mut items = C::default();
        source.after_create(ty, &mut items as &mut dyn Any)?;

        let mut index = 0;
        while !source.is_end()? && source.continue_requested() {
            let label = item_label(index);
            items.push_item(slot.read(resolver, source, &label, element)?);
            index += 1;
        }
        trace!(%ty, count = index, "read collection");

        source.end(ty)?;
        Ok(items)
    }

    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &C,
    ) -> Result<(), CodecError> {
        let element = ty.element()?;
        let slot = Slot::resolve(resolver, element)?;
        sink.begin(ty)?;
        for (index, item) in value.items().enumerate() {
            slot.write(resolver, sink, &item_label(index), element, item)?;
        }
        sink.end(ty)
    }
}
