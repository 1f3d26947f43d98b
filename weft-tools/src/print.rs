use core::fmt::{self, Write};

use weft_core::{CodecError, Sink, TypeDescriptor};

/// Renders protocol calls as indented lines, one per call.
///
/// ```text
/// Begin Pair<Int, String>
/// 	first: Int 120
/// 	second: String Hello
/// End
/// ```
///
/// Blocks and fields indent their contents by one tab. Labels are printed
/// when the sink is [labeled](PrintSink::labeled).
#[derive(Debug)]
pub struct PrintSink<W> {
    out: W,
    labels: bool,
    depth: usize,
}

impl<W: Write> PrintSink<W> {
    /// A sink writing to `out`, with or without labels.
    pub fn new(out: W, labels: bool) -> Self {
        Self {
            out,
            labels,
            depth: 0,
        }
    }

    /// A sink printing labels.
    pub fn labeled(out: W) -> Self {
        Self::new(out, true)
    }

    /// A sink printing the bare call sequence.
    pub fn sequence(out: W) -> Self {
        Self::new(out, false)
    }

    /// The output written so far.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Returns the output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, label: Option<&str>, text: fmt::Arguments<'_>) -> Result<(), CodecError> {
        self.write_line(label, text)
            .map_err(|fmt::Error| CodecError::backend("print sink output failed"))
    }

    fn write_line(&mut self, label: Option<&str>, text: fmt::Arguments<'_>) -> fmt::Result {
        let prefix = "\t".repeat(self.depth);
        self.out.write_str(&prefix)?;
        if let (true, Some(label)) = (self.labels, label) {
            write!(self.out, "{label}: ")?;
        }
        let text = text.to_string();
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.out.write_str(first)?;
        }
        for rest in lines {
            write!(self.out, "\n{prefix}{rest}")?;
        }
        self.out.write_char('\n')
    }
}

impl<W: Write> Sink for PrintSink<W> {
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.line(None, format_args!("Begin {ty}"))?;
        self.depth += 1;
        Ok(())
    }

    fn end(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth = self.depth.saturating_sub(1);
        self.line(None, format_args!("End"))
    }

    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        if actual == ty {
            self.line(Some(label), format_args!("Begin-nested {ty}"))?;
        } else {
            self.line(Some(label), format_args!("Begin-nested {ty} ({actual})"))?;
        }
        self.depth += 1;
        Ok(())
    }

    fn end_nested(&mut self, label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.depth = self.depth.saturating_sub(1);
        self.line(Some(label), format_args!("End-nested"))
    }

    fn put_null(&mut self, label: &str, is_null: bool) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Is-null {is_null}"))
    }

    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Boolean {value}"))
    }

    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Byte {value}"))
    }

    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Short {value}"))
    }

    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Int {value}"))
    }

    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Long {value}"))
    }

    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Float {value}"))
    }

    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Double {value}"))
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Char {value}"))
    }

    fn put_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("Unit"))
    }

    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError> {
        self.line(Some(label), format_args!("String {value}"))
    }
}
