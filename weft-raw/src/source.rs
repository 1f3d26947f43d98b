use std::io::{ErrorKind, Read};

use tracing::trace;
use weft_core::{CodecError, Nested, Source, TypeDescriptor};

use crate::options::{END_MARK, RawOptions};
use crate::strings::{StringEncoding, decode_modified_utf8, decode_utf16};

/// Reads what [`RawSink`](crate::RawSink) wrote.
///
/// Reads are strictly sequential. `is_end` looks eight bytes ahead for the
/// end marker; those bytes are kept and served to the next read.
#[derive(Debug)]
pub struct RawSource<R> {
    reader: R,
    options: RawOptions,
    lookahead: Vec<u8>,
}

fn eof() -> CodecError {
    CodecError::protocol("more input", "end of input")
}

impl<R: Read> RawSource<R> {
    /// A source with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, RawOptions::default())
    }

    /// A source with explicit options.
    pub fn with_options(reader: R, options: RawOptions) -> Self {
        Self {
            reader,
            options,
            lookahead: Vec::with_capacity(8),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        let buffered = self.lookahead.len().min(buf.len());
        buf[..buffered].copy_from_slice(&self.lookahead[..buffered]);
        self.lookahead = self.lookahead.split_off(buffered);
        match self.reader.read_exact(&mut buf[buffered..]) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => Err(eof()),
            Err(error) => Err(error.into()),
        }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn peek_mark(&mut self) -> Result<u64, CodecError> {
        while self.lookahead.len() < 8 {
            let mut byte = [0; 8];
            let wanted = 8 - self.lookahead.len();
            match self.reader.read(&mut byte[..wanted]) {
                Ok(0) => return Err(eof()),
                Ok(read) => self.lookahead.extend_from_slice(&byte[..read]),
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) => return Err(error.into()),
            }
        }
        let mut mark = [0; 8];
        mark.copy_from_slice(&self.lookahead[..8]);
        Ok(u64::from_be_bytes(mark))
    }

    fn string(&mut self, encoding: StringEncoding) -> Result<String, CodecError> {
        let len = usize::from(u16::from_be_bytes(self.array()?));
        match encoding {
            StringEncoding::ModifiedUtf8 => {
                let mut bytes = vec![0; len];
                self.fill(&mut bytes)?;
                decode_modified_utf8(&bytes)
            }
            StringEncoding::Utf16 => {
                let mut bytes = vec![0; len * 2];
                self.fill(&mut bytes)?;
                decode_utf16(&bytes)
            }
        }
    }

    fn flag(&mut self) -> Result<bool, CodecError> {
        let [byte] = self.array()?;
        Ok(byte != 0)
    }
}

impl<R: Read> Source for RawSource<R> {
    fn begin(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn is_end(&mut self) -> Result<bool, CodecError> {
        Ok(self.peek_mark()? == END_MARK)
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        let mark = u64::from_be_bytes(self.array()?);
        if mark == END_MARK {
            Ok(())
        } else {
            Err(CodecError::protocol(
                format!("end of {ty}"),
                format!("{mark:#018x}"),
            ))
        }
    }

    fn begin_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<Nested, CodecError> {
        if ty.is_terminal() {
            return Ok(Nested::Nest);
        }
        let tag = self.string(StringEncoding::ModifiedUtf8)?;
        trace!(label, %ty, tag, "type tag");
        Ok(Nested::Substitute(TypeDescriptor::parse(&tag)?))
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn is_null(&mut self, _label: &str) -> Result<bool, CodecError> {
        self.flag()
    }

    fn get_bool(&mut self, _label: &str) -> Result<bool, CodecError> {
        self.flag()
    }

    fn get_i8(&mut self, _label: &str) -> Result<i8, CodecError> {
        Ok(i8::from_be_bytes(self.array()?))
    }

    fn get_i16(&mut self, _label: &str) -> Result<i16, CodecError> {
        Ok(i16::from_be_bytes(self.array()?))
    }

    fn get_i32(&mut self, _label: &str) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    fn get_i64(&mut self, _label: &str) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    fn get_f32(&mut self, _label: &str) -> Result<f32, CodecError> {
        Ok(f32::from_be_bytes(self.array()?))
    }

    fn get_f64(&mut self, _label: &str) -> Result<f64, CodecError> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    fn get_char(&mut self, label: &str) -> Result<char, CodecError> {
        let unit = u16::from_be_bytes(self.array()?);
        char::from_u32(u32::from(unit)).ok_or_else(|| {
            CodecError::backend(format!("{label}: lone surrogate {unit:#06x} is not a char"))
        })
    }

    fn get_unit(&mut self, _label: &str) -> Result<(), CodecError> {
        Ok(())
    }

    fn get_string(&mut self, _label: &str) -> Result<String, CodecError> {
        self.string(self.options.string_encoding)
    }
}
