//! The raw binary backend: big-endian, unlabeled, strictly sequential.
//!
//! ```
//! use weft_core::{Module, ResolverExt, TypeDescriptor as T};
//! use weft_std::{ModuleBuilderExt, std_module};
//!
//! let resolver = Module::builder()
//!     .pair::<i32, String>(T::int(), T::string())
//!     .build()
//!     .then(std_module());
//! let ty = T::pair(T::int(), T::string());
//!
//! let bytes = weft_raw::to_vec(&resolver, &ty, &(120, "Hello".to_string())).unwrap();
//! assert_eq!(&bytes[..4], &[0, 0, 0, 120]);
//! let back: (i32, String) = weft_raw::from_slice(&resolver, &ty, &bytes).unwrap();
//! assert_eq!(back.1, "Hello");
//! ```
//!
//! [`IndexedStore`] keeps a list of records on disk and reads single records
//! back by key.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod indexed;
mod options;
mod sink;
mod source;
mod store;
mod strings;

pub use indexed::{IndexedRawSink, Span};
pub use options::{END_MARK, RawOptions};
pub use sink::RawSink;
pub use source::RawSource;
pub use store::IndexedStore;
pub use strings::StringEncoding;

use weft_core::{CodecError, Resolver, TypeDescriptor};

/// Encodes `value` with default options.
pub fn to_vec<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
) -> Result<Vec<u8>, CodecError> {
    to_vec_with(resolver, ty, value, RawOptions::default())
}

/// Encodes `value` with explicit options.
pub fn to_vec_with<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
    options: RawOptions,
) -> Result<Vec<u8>, CodecError> {
    let mut sink = RawSink::with_options(Vec::new(), options);
    weft_core::write(resolver, ty, &mut sink, value)?;
    sink.into_inner()
}

/// Decodes a value written with default options.
pub fn from_slice<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    bytes: &[u8],
) -> Result<T, CodecError> {
    from_slice_with(resolver, ty, bytes, RawOptions::default())
}

/// Decodes a value written with `options`. Trailing bytes are ignored.
pub fn from_slice_with<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    bytes: &[u8],
    options: RawOptions,
) -> Result<T, CodecError> {
    let mut source = RawSource::with_options(bytes, options);
    weft_core::read(resolver, ty, &mut source)
}
