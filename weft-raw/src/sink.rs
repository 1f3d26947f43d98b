use std::io::Write;

use tracing::trace;
use weft_core::{CodecError, Sink, TypeDescriptor};

use crate::options::{END_MARK, RawOptions};
use crate::strings::{StringEncoding, encode};

/// Writes values as compact big-endian binary.
///
/// Labels are not written; blocks cost nothing to open and an eight-byte
/// marker to close. Fields of open types are preceded by their runtime type.
#[derive(Debug)]
pub struct RawSink<W> {
    writer: W,
    options: RawOptions,
    position: u64,
}

impl<W: Write> RawSink<W> {
    /// A sink with default options.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, RawOptions::default())
    }

    /// A sink with explicit options.
    pub fn with_options(writer: W, options: RawOptions) -> Self {
        Self {
            writer,
            options,
            position: 0,
        }
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Flushes and returns the writer.
    pub fn into_inner(mut self) -> Result<W, CodecError> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn string(&mut self, text: &str, encoding: StringEncoding) -> Result<(), CodecError> {
        let encoded = encode(text, encoding)?;
        self.bytes(&encoded)
    }
}

impl<W: Write> Sink for RawSink<W> {
    fn begin(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn end(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.bytes(&END_MARK.to_be_bytes())
    }

    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        if ty.is_terminal() {
            return Ok(());
        }
        trace!(label, %actual, at = self.position, "type tag");
        self.string(&actual.to_string(), StringEncoding::ModifiedUtf8)
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn put_null(&mut self, _label: &str, is_null: bool) -> Result<(), CodecError> {
        self.bytes(&[u8::from(is_null)])
    }

    fn put_bool(&mut self, _label: &str, value: bool) -> Result<(), CodecError> {
        self.bytes(&[u8::from(value)])
    }

    fn put_i8(&mut self, _label: &str, value: i8) -> Result<(), CodecError> {
        self.bytes(&value.to_be_bytes())
    }

    fn put_i16(&mut self, _label: &str, value: i16) -> Result<(), CodecError> {
        self.bytes(&value.to_be_bytes())
    }

    fn put_i32(&mut self, _label: &str, value: i32) -> Result<(), CodecError> {
        self.bytes(&value.to_be_bytes())
    }

    fn put_i64(&mut self, _label: &str, value: i64) -> Result<(), CodecError> {
        self.bytes(&value.to_be_bytes())
    }

    fn put_f32(&mut self, _label: &str, value: f32) -> Result<(), CodecError> {
        self.bytes(&value.to_be_bytes())
    }

    fn put_f64(&mut self, _label: &str, value: f64) -> Result<(), CodecError> {
        self.bytes(&value.to_be_bytes())
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        let unit = u16::try_from(u32::from(value)).map_err(|_| {
            CodecError::backend(format!(
                "{label}: {value:?} (U+{:X}) does not fit in one UTF-16 code unit",
                u32::from(value)
            ))
        })?;
        self.bytes(&unit.to_be_bytes())
    }

    fn put_unit(&mut self, _label: &str) -> Result<(), CodecError> {
        Ok(())
    }

    fn put_str(&mut self, _label: &str, value: &str) -> Result<(), CodecError> {
        self.string(value, self.options.string_encoding)
    }
}
