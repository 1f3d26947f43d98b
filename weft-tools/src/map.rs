//! A flat view of one record: its own scalar fields, keyed by label.

use std::collections::HashMap;

use tracing::trace;
use weft_core::{CodecError, Nested, Primitive, Scalar, Sink, Source, TypeDescriptor};

/// Collects the scalars written directly into the outermost block.
///
/// The first value put under a label is kept. A null marker replaces it and
/// removes the label from the result of [`reset`](MapSink::reset). Anything
/// inside a nested block, such as the elements of a list field or the fields
/// of a nested record, is skipped.
#[derive(Debug, Default)]
pub struct MapSink {
    values: HashMap<String, Option<Scalar>>,
    depth: usize,
}

impl MapSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value recorded under `label`, if any.
    pub fn get(&self, label: &str) -> Option<&Scalar> {
        self.values.get(label)?.as_ref()
    }

    /// Returns the non-null values collected so far and starts over.
    pub fn reset(&mut self) -> HashMap<String, Scalar> {
        self.depth = 0;
        self.values
            .drain()
            .filter_map(|(label, value)| Some((label, value?)))
            .collect()
    }

    fn record(&mut self, label: &str, value: Scalar) -> Result<(), CodecError> {
        if self.depth <= 1 {
            self.values.entry(label.to_owned()).or_insert(Some(value));
        } else {
            trace!(label, depth = self.depth, "skipping nested scalar");
        }
        Ok(())
    }
}

impl Sink for MapSink {
    fn begin(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth += 1;
        Ok(())
    }

    fn end(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn begin_nested(
        &mut self,
        _label: &str,
        _ty: &TypeDescriptor,
        _actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        Ok(())
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn put_null(&mut self, label: &str, is_null: bool) -> Result<(), CodecError> {
        if is_null && self.depth <= 1 {
            self.values.insert(label.to_owned(), None);
        }
        Ok(())
    }

    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError> {
        self.record(label, Scalar::Bool(value))
    }

    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError> {
        self.record(label, Scalar::Byte(value))
    }

    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError> {
        self.record(label, Scalar::Short(value))
    }

    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError> {
        self.record(label, Scalar::Int(value))
    }

    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError> {
        self.record(label, Scalar::Long(value))
    }

    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError> {
        self.record(label, Scalar::Float(value))
    }

    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError> {
        self.record(label, Scalar::Double(value))
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        self.record(label, Scalar::Char(value))
    }

    fn put_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.record(label, Scalar::Unit)
    }

    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError> {
        self.record(label, Scalar::String(value.to_owned()))
    }
}

/// Reads a flat record back from a label map, as produced by
/// [`MapSink::reset`].
///
/// A label missing from the map reads as null. Nested blocks and sequences
/// cannot be expressed and fail with a backend error.
#[derive(Debug, Clone)]
pub struct MapSource {
    map: HashMap<String, Scalar>,
    depth: usize,
}

impl MapSource {
    /// Reads from `map`.
    pub fn new(map: HashMap<String, Scalar>) -> Self {
        Self { map, depth: 0 }
    }

    /// Unwraps the map.
    pub fn into_inner(self) -> HashMap<String, Scalar> {
        self.map
    }

    fn scalar<P: Primitive>(&self, label: &str) -> Result<P, CodecError> {
        let scalar = self.map.get(label).ok_or_else(|| CodecError::MissingField {
            label: label.to_owned(),
        })?;
        P::from_scalar(scalar.clone()).ok_or_else(|| CodecError::protocol(P::CODE.name(), scalar))
    }
}

impl Source for MapSource {
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        if self.depth > 0 {
            return Err(CodecError::backend(format!(
                "a flat map cannot hold the nested block {ty}"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn is_end(&mut self) -> Result<bool, CodecError> {
        Err(CodecError::backend("a flat map cannot hold a sequence"))
    }

    fn end(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn begin_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<Nested, CodecError> {
        if ty.is_terminal() {
            Ok(Nested::Nest)
        } else {
            Err(CodecError::backend(format!(
                "{label}: a flat map keeps no type tag for {ty}"
            )))
        }
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn is_null(&mut self, label: &str) -> Result<bool, CodecError> {
        Ok(!self.map.contains_key(label))
    }

    fn get_bool(&mut self, label: &str) -> Result<bool, CodecError> {
        self.scalar(label)
    }

    fn get_i8(&mut self, label: &str) -> Result<i8, CodecError> {
        self.scalar(label)
    }

    fn get_i16(&mut self, label: &str) -> Result<i16, CodecError> {
        self.scalar(label)
    }

    fn get_i32(&mut self, label: &str) -> Result<i32, CodecError> {
        self.scalar(label)
    }

    fn get_i64(&mut self, label: &str) -> Result<i64, CodecError> {
        self.scalar(label)
    }

    fn get_f32(&mut self, label: &str) -> Result<f32, CodecError> {
        self.scalar(label)
    }

    fn get_f64(&mut self, label: &str) -> Result<f64, CodecError> {
        self.scalar(label)
    }

    fn get_char(&mut self, label: &str) -> Result<char, CodecError> {
        self.scalar(label)
    }

    fn get_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.scalar(label)
    }

    fn get_string(&mut self, label: &str) -> Result<String, CodecError> {
        self.scalar(label)
    }
}
