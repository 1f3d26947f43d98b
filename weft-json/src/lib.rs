//! The labeled JSON backend.
//!
//! Records are objects keyed by field label, containers are arrays, empty
//! optionals are `null`, and a field whose static type is open is wrapped in
//! a single-key object naming its runtime type:
//!
//! ```text
//! {"mark": {"Point": {"x": 1, "y": 2}}}
//! ```
//!
//! Readers may request fields in any order. Every field must be present,
//! nullable ones included.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod options;
mod sink;
mod source;

pub use options::JsonOptions;
pub use sink::JsonSink;
pub use source::JsonSource;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use weft_core::{CodecError, Resolver, TypeDescriptor};

/// Writes `value` into a JSON document tree.
pub fn to_value<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
) -> Result<Value, CodecError> {
    let mut sink = JsonSink::new();
    weft_core::write(resolver, ty, &mut sink, value)?;
    sink.into_value()
}

/// Writes `value` as compact JSON text.
pub fn to_string<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
) -> Result<String, CodecError> {
    to_string_with(resolver, ty, value, &JsonOptions::default())
}

/// Writes `value` as JSON text with explicit options.
pub fn to_string_with<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
    options: &JsonOptions,
) -> Result<String, CodecError> {
    let document = to_value(resolver, ty, value)?;
    let mut out = Vec::new();
    let written = if options.pretty {
        let formatter = PrettyFormatter::with_indent(options.indent.as_bytes());
        document.serialize(&mut Serializer::with_formatter(&mut out, formatter))
    } else {
        document.serialize(&mut Serializer::new(&mut out))
    };
    written.map_err(|error| CodecError::backend(format!("cannot render JSON: {error}")))?;
    String::from_utf8(out).map_err(|error| CodecError::backend(error.to_string()))
}

/// Reads a value from a JSON document tree.
pub fn from_value<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    document: Value,
) -> Result<T, CodecError> {
    let mut source = JsonSource::new(document);
    weft_core::read(resolver, ty, &mut source)
}

/// Reads a value from JSON text.
pub fn from_str<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    text: &str,
) -> Result<T, CodecError> {
    let mut source = JsonSource::parse(text)?;
    weft_core::read(resolver, ty, &mut source)
}
