//! The standard module and registration helpers for container instances.

use core::hash::Hash;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use weft_core::{
    BaseType, DynCodec, Kind, Module, ModuleBuilder, NoCodec, Primitive, TypeDescriptor,
};

use crate::collection::{CollectionCodec, Elements};
use crate::primitive::PrimitiveCodec;
use crate::tuple::{PairCodec, TripleCodec};

/// Registration of container instantiations on a [`ModuleBuilder`].
pub trait ModuleBuilderExt: Sized {
    /// Registers `C` for `ty`, a one-argument collection descriptor.
    fn collection<C: Elements>(self, ty: TypeDescriptor) -> Self;

    /// Registers `Vec<E>` for `List<element>`. For a nullable `element`, `E`
    /// is the `Option` of the element's value type.
    fn list<E: Send + 'static>(self, element: TypeDescriptor) -> Self {
        self.collection::<Vec<E>>(TypeDescriptor::list(element))
    }

    /// Registers `HashSet<E>` for `Set<element>`.
    fn set<E: Eq + Hash + Send + 'static>(self, element: TypeDescriptor) -> Self {
        self.collection::<HashSet<E>>(TypeDescriptor::set(element))
    }

    /// Registers `(A, B)` for `Pair<first, second>`.
    fn pair<A, B>(self, first: TypeDescriptor, second: TypeDescriptor) -> Self
    where
        A: Send + 'static,
        B: Send + 'static;

    /// Registers `(A, B, C)` for `Triple<first, second, third>`.
    fn triple<A, B, C>(
        self,
        first: TypeDescriptor,
        second: TypeDescriptor,
        third: TypeDescriptor,
    ) -> Self
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static;
}

impl ModuleBuilderExt for ModuleBuilder {
    fn collection<C: Elements>(self, ty: TypeDescriptor) -> Self {
        self.codec(ty, CollectionCodec::<C>::new())
    }

    fn pair<A, B>(self, first: TypeDescriptor, second: TypeDescriptor) -> Self
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        self.codec(
            TypeDescriptor::pair(first, second),
            PairCodec::<A, B>::new(),
        )
    }

    fn triple<A, B, C>(
        self,
        first: TypeDescriptor,
        second: TypeDescriptor,
        third: TypeDescriptor,
    ) -> Self
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
    {
        self.codec(
            TypeDescriptor::triple(first, second, third),
            TripleCodec::<A, B, C>::new(),
        )
    }
}

fn collection_of(name: &str, element: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::new(BaseType::new(name, Kind::Collection), [element])
}

fn sequences<P: Primitive>(builder: ModuleBuilder) -> ModuleBuilder {
    let plain = P::descriptor();
    let nullable = plain.with_nullable(true);
    builder
        .codec(plain.clone(), PrimitiveCodec::<P>::new())
        .collection::<Vec<P>>(collection_of("List", plain.clone()))
        .collection::<Vec<Option<P>>>(collection_of("List", nullable.clone()))
        .collection::<Vec<P>>(collection_of("MutableList", plain.clone()))
        .collection::<Vec<Option<P>>>(collection_of("MutableList", nullable.clone()))
        .collection::<VecDeque<P>>(collection_of("Deque", plain))
        .collection::<VecDeque<Option<P>>>(collection_of("Deque", nullable))
}

fn sets<P: Primitive + Ord + Hash>(builder: ModuleBuilder) -> ModuleBuilder {
    let plain = P::descriptor();
    let nullable = plain.with_nullable(true);
    builder
        .collection::<HashSet<P>>(collection_of("Set", plain.clone()))
        .collection::<HashSet<Option<P>>>(collection_of("Set", nullable.clone()))
        .collection::<HashSet<P>>(collection_of("MutableSet", plain.clone()))
        .collection::<HashSet<Option<P>>>(collection_of("MutableSet", nullable.clone()))
        .collection::<BTreeSet<P>>(collection_of("SortedSet", plain))
        .collection::<BTreeSet<Option<P>>>(collection_of("SortedSet", nullable))
}

fn expect_args(
    expected: usize,
) -> impl Fn(&TypeDescriptor) -> Option<Arc<dyn DynCodec>> + Send + Sync + 'static {
    move |ty: &TypeDescriptor| {
        (ty.args().len() != expected)
            .then(|| Arc::new(NoCodec::arity(ty.clone(), expected)) as Arc<dyn DynCodec>)
    }
}

/// The ten primitives, and every built-in collection over them with plain and
/// nullable elements. Sets are registered for the primitives with a total
/// order, which leaves out `Float` and `Double`.
///
/// Tuples and collections of records are registered with
/// [`ModuleBuilderExt`]. Built-in containers used with the wrong number of
/// arguments resolve to a [`NoCodec`] reporting the arity.
pub fn std_module() -> Module {
    let mut builder = Module::builder();
    builder = sequences::<bool>(builder);
    builder = sequences::<i8>(builder);
    builder = sequences::<i16>(builder);
    builder = sequences::<i32>(builder);
    builder = sequences::<i64>(builder);
    builder = sequences::<f32>(builder);
    builder = sequences::<f64>(builder);
    builder = sequences::<char>(builder);
    builder = sequences::<()>(builder);
    builder = sequences::<String>(builder);

    builder = sets::<bool>(builder);
    builder = sets::<i8>(builder);
    builder = sets::<i16>(builder);
    builder = sets::<i32>(builder);
    builder = sets::<i64>(builder);
    builder = sets::<char>(builder);
    builder = sets::<()>(builder);
    builder = sets::<String>(builder);

    for name in weft_core::COLLECTION_NAMES {
        builder = builder.base(name, expect_args(1));
    }
    builder = builder.base("Pair", expect_args(2));
    builder = builder.base("Triple", expect_args(3));
    builder.build()
}
