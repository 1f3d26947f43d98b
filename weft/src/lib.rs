//! Descriptor-driven codecs with pluggable wire backends.
//!
//! A [`TypeDescriptor`] names a type at runtime; a [`Resolver`] maps it to a
//! [`Codec`]; the codec drives a [`Sink`] or [`Source`] through the framing
//! protocol. Backends decide what the protocol calls look like on the wire.
//!
//! ```
//! use weft::prelude::*;
//! use weft::TypeDescriptor as T;
//!
//! let registry = weft::std_registry()
//!     .provider(Module::builder().pair::<i32, String>(T::int(), T::string()).build())
//!     .build();
//! let ty = T::pair(T::int(), T::string());
//!
//! let text = weft::json::to_string(&registry, &ty, &(120, "Hello".to_string())).unwrap();
//! assert_eq!(text, r#"{"first":120,"second":"Hello"}"#);
//! ```
//!
//! Backends are behind features, all enabled by default: `tokens`, `raw`,
//! `json` and `tools`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use weft_core::*;
pub use weft_std::{
    CollectionCodec, Elements, ListCodec, ModuleBuilderExt, PairCodec, PrimitiveCodec, SetCodec,
    TripleCodec, std_module,
};

#[cfg(feature = "json")]
pub use weft_json as json;
#[cfg(feature = "raw")]
pub use weft_raw as raw;
#[cfg(feature = "tokens")]
pub use weft_tokens as tokens;
#[cfg(feature = "tools")]
pub use weft_tools as tools;

/// A registry builder whose first provider is [`std_module`].
pub fn std_registry() -> RegistryBuilder {
    Registry::builder().provider(std_module())
}

/// The traits and types most codecs and callers need.
pub mod prelude {
    pub use weft_core::{
        Codec, CodecError, Module, Registry, Resolver, ResolverExt, Sink, SinkExt, Source,
        SourceAdaptors, SourceExt, TypeDescriptor,
    };
    pub use weft_std::ModuleBuilderExt;
}
