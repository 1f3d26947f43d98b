//! Codec protocol and resolution engine for weft.
//!
//! A value crosses into a backend as a sequence of protocol calls: blocks
//! (`begin`/`end`), fields (`begin_nested`/`end_nested`), null markers and
//! typed scalars. [`Codec`]s drive that sequence for one Rust type each;
//! [`Resolver`]s map a runtime [`TypeDescriptor`] to the codec that handles it.
//!
//! ```
//! use weft_core::{TypeDescriptor, TypeDescriptor as T};
//!
//! let ty: TypeDescriptor = "Pair<Int, List<String?>>".parse().unwrap();
//! assert_eq!(ty, T::pair(T::int(), T::list(T::string().nullable())));
//! assert_eq!(ty.to_string(), "Pair<Int, List<String?>>");
//! ```
//!
//! Fields whose static descriptor is open (not [terminal](TypeDescriptor::is_terminal))
//! carry a type tag naming their runtime type, so readers can re-resolve the
//! concrete codec. See [`FamilyCodec`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod after_create;
mod codec;
mod descriptor;
mod error;
mod family;
mod flag;
mod framing;
mod module;
mod nullable;
mod parse;
mod protocol;
mod registry;
mod resolver;
mod scalar;

pub use after_create::{OnAfterCreate, SourceAdaptors};
pub use codec::{AnyValue, Codec, DynCodec, downcast};
pub use descriptor::{BaseType, COLLECTION_NAMES, Kind, PrimitiveCode, TUPLE_NAMES, TypeDescriptor};
pub use error::CodecError;
pub use family::{FamilyCodec, Member, MemberOps};
pub use flag::ContinueFlag;
pub use framing::{
    SinkExt, SourceExt, read_nested_any, read_nullable_nested_any, write_nested_any,
    write_nullable_nested_any,
};
pub use module::{Factory, Module, ModuleBuilder};
pub use nullable::NullableCodec;
pub use protocol::{IT, Nested, Sink, Source, item_label};
pub use registry::{Registry, RegistryBuilder};
pub use resolver::{NoCodec, NullableSupport, Resolver, ResolverExt, Retarget, Then, read, write};
pub use scalar::{Primitive, Scalar};
