//! Diagnostic sinks and a flat map backend.
//!
//! [`HashSink`] folds a value into an `i64`, [`PrintSink`] renders the
//! protocol calls as text, and [`MapSink`]/[`MapSource`] move the scalar
//! fields of one record in and out of a label map.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod hash;
mod map;
mod print;

pub use hash::{DEFAULT_PRIME, HashSink};
pub use map::{MapSink, MapSource};
pub use print::PrintSink;

use std::collections::HashMap;

use tracing::debug;
use weft_core::{CodecError, Resolver, Scalar, TypeDescriptor};

/// Hashes `value` with the default prime.
pub fn hash<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
) -> Result<i64, CodecError> {
    let mut sink = HashSink::new();
    weft_core::write(resolver, ty, &mut sink, value)?;
    let hash = sink.reset();
    debug!(%ty, hash, "hashed value");
    Ok(hash)
}

/// Renders the protocol calls writing `value` would make.
pub fn print<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
    labels: bool,
) -> Result<String, CodecError> {
    let mut sink = PrintSink::new(String::new(), labels);
    weft_core::write(resolver, ty, &mut sink, value)?;
    Ok(sink.into_inner())
}

/// The scalar fields of `value`, keyed by label. Null fields are left out.
pub fn to_map<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
) -> Result<HashMap<String, Scalar>, CodecError> {
    let mut sink = MapSink::new();
    weft_core::write(resolver, ty, &mut sink, value)?;
    Ok(sink.reset())
}

/// Reads a flat record from a label map.
pub fn from_map<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    map: HashMap<String, Scalar>,
) -> Result<T, CodecError> {
    weft_core::read(resolver, ty, &mut MapSource::new(map))
}
