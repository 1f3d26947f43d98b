//! The push/pull protocol implemented by every backend.
//!
//! Every value is framed as `begin → body → end`, every field inside a body as
//! `begin_nested → field body → end_nested`. Labels are always passed; a
//! sequential backend ignores them and relies on position, a labeled backend
//! addresses fields by them and may serve them in any order.

use core::any::Any;

use crate::descriptor::TypeDescriptor;
use crate::error::CodecError;

/// Label used when a single value is written without an enclosing record,
/// and by the nullable wrapper.
pub const IT: &str = "it";

/// Positional label of the element at `index` in a container.
pub fn item_label(index: usize) -> String {
    format!("item{index}")
}

/// What a source found at the start of a nested field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nested {
    /// Decode the field with its static descriptor.
    Nest,
    /// The field carries a type tag: decode it as this descriptor instead.
    Substitute(TypeDescriptor),
}

/// The writing half of the protocol.
///
/// A sink holds per-call state (position, scope stack) and serves one write
/// at a time.
pub trait Sink {
    /// Opens the block of a record, tuple or container.
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError>;

    /// Closes the block opened by [`Sink::begin`].
    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError>;

    /// Opens a field with static descriptor `ty`. `actual` is the descriptor of
    /// the runtime value; when `ty` is not terminal, the sink must record
    /// `actual` so a reader can substitute it.
    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError>;

    /// Closes the field opened by [`Sink::begin_nested`].
    fn end_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<(), CodecError>;

    /// Writes the null marker of an optional field. When `is_null` is false,
    /// the field's value follows.
    fn put_null(&mut self, label: &str, is_null: bool) -> Result<(), CodecError>;

    /// Writes a `Boolean`.
    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError>;
    /// Writes a `Byte`.
    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError>;
    /// Writes a `Short`.
    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError>;
    /// Writes an `Int`.
    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError>;
    /// Writes a `Long`.
    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError>;
    /// Writes a `Float`.
    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError>;
    /// Writes a `Double`.
    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError>;
    /// Writes a `Char`.
    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError>;
    /// Writes a `Unit`.
    fn put_unit(&mut self, label: &str) -> Result<(), CodecError>;
    /// Writes a `String`.
    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError>;
}

/// The reading half of the protocol.
pub trait Source {
    /// Enters the block of a record, tuple or container.
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError>;

    /// True if the current block has no further elements.
    fn is_end(&mut self) -> Result<bool, CodecError>;

    /// Leaves the block entered by [`Source::begin`].
    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError>;

    /// Enters the field with static descriptor `ty`, reading its type tag if
    /// `ty` is not terminal.
    fn begin_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<Nested, CodecError>;

    /// Leaves the field entered by [`Source::begin_nested`].
    fn end_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<(), CodecError>;

    /// Reads the null marker of an optional field.
    fn is_null(&mut self, label: &str) -> Result<bool, CodecError>;

    /// Reads a `Boolean`.
    fn get_bool(&mut self, label: &str) -> Result<bool, CodecError>;
    /// Reads a `Byte`.
    fn get_i8(&mut self, label: &str) -> Result<i8, CodecError>;
    /// Reads a `Short`.
    fn get_i16(&mut self, label: &str) -> Result<i16, CodecError>;
    /// Reads an `Int`.
    fn get_i32(&mut self, label: &str) -> Result<i32, CodecError>;
    /// Reads a `Long`.
    fn get_i64(&mut self, label: &str) -> Result<i64, CodecError>;
    /// Reads a `Float`.
    fn get_f32(&mut self, label: &str) -> Result<f32, CodecError>;
    /// Reads a `Double`.
    fn get_f64(&mut self, label: &str) -> Result<f64, CodecError>;
    /// Reads a `Char`.
    fn get_char(&mut self, label: &str) -> Result<char, CodecError>;
    /// Reads a `Unit`.
    fn get_unit(&mut self, label: &str) -> Result<(), CodecError>;
    /// Reads a `String`.
    fn get_string(&mut self, label: &str) -> Result<String, CodecError>;

    /// Called with a freshly created, not yet populated instance of `ty`.
    fn after_create(
        &mut self,
        ty: &TypeDescriptor,
        instance: &mut dyn Any,
    ) -> Result<(), CodecError> {
        let _ = (ty, instance);
        Ok(())
    }

    /// False once the consumer asked to stop; containers check this between
    /// elements.
    fn continue_requested(&self) -> bool {
        true
    }
}
