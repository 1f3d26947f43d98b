use std::collections::HashMap;
use std::hash::Hash;
use std::io::Write;
use std::ops::Range;

use tracing::trace;
use weft_core::{CodecError, IT, Primitive, Scalar, Sink, TypeDescriptor};

use crate::{RawOptions, RawSink};

/// Byte range of one element inside the data file.
pub type Span = Range<u64>;

/// A [`RawSink`] that records where each element of a top-level collection
/// starts and ends, keyed by one of the element's own fields.
///
/// The range of an element covers its type tag and body. The key is the
/// scalar put under `key_label` directly in the element's block; fields with
/// the same label deeper down are ignored. Keys must be unique.
#[derive(Debug)]
pub struct IndexedRawSink<W, K> {
    raw: RawSink<W>,
    key_label: String,
    depth: usize,
    start: Option<u64>,
    field: Option<String>,
    key: Option<K>,
    index: HashMap<K, Span>,
    order: Vec<K>,
}

impl<W, K> IndexedRawSink<W, K>
where
    W: Write,
    K: Primitive + Eq + Hash + Clone,
{
    /// Indexes elements by the field labeled `key_label`.
    pub fn new(writer: W, key_label: impl Into<String>, options: RawOptions) -> Self {
        Self {
            raw: RawSink::with_options(writer, options),
            key_label: key_label.into(),
            depth: 0,
            start: None,
            field: None,
            key: None,
            index: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The index built so far, in write order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &Span)> {
        self.order
            .iter()
            .filter_map(|key| self.index.get_key_value(key))
    }

    /// Gives back the index and the writer.
    pub fn finish(self) -> Result<(HashMap<K, Span>, W), CodecError> {
        let writer = self.raw.into_inner()?;
        Ok((self.index, writer))
    }

    fn capture(&mut self, label: &str, scalar: impl FnOnce() -> Scalar) -> Result<(), CodecError> {
        // element blocks sit one level below the collection
        if self.depth != 2 || self.start.is_none() {
            return Ok(());
        }
        // a field codec writes its scalar under its own label
        let field = if label == IT { self.field.as_deref() } else { Some(label) };
        if field != Some(self.key_label.as_str()) {
            return Ok(());
        }
        let scalar = scalar();
        let key = K::from_scalar(scalar.clone()).ok_or_else(|| {
            CodecError::backend(format!(
                "key `{label}` holds {scalar}, not a {}",
                K::CODE.name()
            ))
        })?;
        self.key = Some(key);
        Ok(())
    }
}

impl<W, K> Sink for IndexedRawSink<W, K>
where
    W: Write,
    K: Primitive + Eq + Hash + Clone,
{
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth += 1;
        self.raw.begin(ty)
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth = self.depth.saturating_sub(1);
        self.raw.end(ty)
    }

    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        match self.depth {
            1 => {
                self.start = Some(self.raw.position());
                self.key = None;
            }
            2 => self.field = Some(label.to_owned()),
            _ => {}
        }
        self.raw.begin_nested(label, ty, actual)
    }

    fn end_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.raw.end_nested(label, ty)?;
        if self.depth == 2 {
            self.field = None;
        }
        if self.depth != 1 {
            return Ok(());
        }
        let (Some(start), end) = (self.start.take(), self.raw.position()) else {
            return Ok(());
        };
        let key = self.key.take().ok_or_else(|| {
            CodecError::backend(format!(
                "element {label} at byte {start} has no `{}` field to index by",
                self.key_label
            ))
        })?;
        if let Some(previous) = self.index.get(&key) {
            return Err(CodecError::backend(format!(
                "key {} of element {label} is not unique, already used by bytes {previous:?}",
                key.clone().into_scalar()
            )));
        }
        trace!(label, start, end, "indexed element");
        self.order.push(key.clone());
        self.index.insert(key, start..end);
        Ok(())
    }

    fn put_null(&mut self, label: &str, is_null: bool) -> Result<(), CodecError> {
        self.raw.put_null(label, is_null)
    }

    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Bool(value))?;
        self.raw.put_bool(label, value)
    }

    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Byte(value))?;
        self.raw.put_i8(label, value)
    }

    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Short(value))?;
        self.raw.put_i16(label, value)
    }

    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Int(value))?;
        self.raw.put_i32(label, value)
    }

    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Long(value))?;
        self.raw.put_i64(label, value)
    }

    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Float(value))?;
        self.raw.put_f32(label, value)
    }

    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Double(value))?;
        self.raw.put_f64(label, value)
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Char(value))?;
        self.raw.put_char(label, value)
    }

    fn put_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.capture(label, || Scalar::Unit)?;
        self.raw.put_unit(label)
    }

    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError> {
        self.capture(label, || Scalar::String(value.to_owned()))?;
        self.raw.put_str(label, value)
    }
}
