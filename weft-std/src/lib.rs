//! Primitive and container codecs for weft.
//!
//! [`std_module`] resolves the ten primitives and the built-in collections
//! over them. Collections of records, and tuples, are registered per
//! instantiation through [`ModuleBuilderExt`]:
//!
//! ```
//! use weft_core::{Module, Registry, TypeDescriptor as T};
//! use weft_std::{ModuleBuilderExt, std_module};
//!
//! let registry = Registry::builder()
//!     .provider(std_module())
//!     .provider(Module::builder().pair::<i32, String>(T::int(), T::string()).build())
//!     .build();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod primitive;

mod collection;
mod module;
mod tuple;

pub use collection::{CollectionCodec, Elements, ListCodec, SetCodec};
pub use module::{ModuleBuilderExt, std_module};
pub use primitive::PrimitiveCodec;
pub use tuple::{PairCodec, TripleCodec};
