//! Scalar values and the [`Primitive`] trait tying Rust types to accessors.

use core::fmt;

use crate::descriptor::{PrimitiveCode, TypeDescriptor};
use crate::error::CodecError;
use crate::protocol::{Sink, Source};

/// One primitive value, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `Boolean`
    Bool(bool),
    /// `Byte`
    Byte(i8),
    /// `Short`
    Short(i16),
    /// `Int`
    Int(i32),
    /// `Long`
    Long(i64),
    /// `Float`
    Float(f32),
    /// `Double`
    Double(f64),
    /// `Char`
    Char(char),
    /// `Unit`
    Unit,
    /// `String`
    String(String),
}

impl Scalar {
    /// The primitive kind of this value.
    pub fn code(&self) -> PrimitiveCode {
        match self {
            Scalar::Bool(_) => PrimitiveCode::Boolean,
            Scalar::Byte(_) => PrimitiveCode::Byte,
            Scalar::Short(_) => PrimitiveCode::Short,
            Scalar::Int(_) => PrimitiveCode::Int,
            Scalar::Long(_) => PrimitiveCode::Long,
            Scalar::Float(_) => PrimitiveCode::Float,
            Scalar::Double(_) => PrimitiveCode::Double,
            Scalar::Char(_) => PrimitiveCode::Char,
            Scalar::Unit => PrimitiveCode::Unit,
            Scalar::String(_) => PrimitiveCode::String,
        }
    }

    /// Pushes this value into `sink` through the matching accessor.
    pub fn put(&self, sink: &mut dyn Sink, label: &str) -> Result<(), CodecError> {
        match self {
            Scalar::Bool(v) => sink.put_bool(label, *v),
            Scalar::Byte(v) => sink.put_i8(label, *v),
            Scalar::Short(v) => sink.put_i16(label, *v),
            Scalar::Int(v) => sink.put_i32(label, *v),
            Scalar::Long(v) => sink.put_i64(label, *v),
            Scalar::Float(v) => sink.put_f32(label, *v),
            Scalar::Double(v) => sink.put_f64(label, *v),
            Scalar::Char(v) => sink.put_char(label, *v),
            Scalar::Unit => sink.put_unit(label),
            Scalar::String(v) => sink.put_str(label, v),
        }
    }

    /// Pulls a value of kind `code` from `source`.
    pub fn get(
        source: &mut dyn Source,
        label: &str,
        code: PrimitiveCode,
    ) -> Result<Scalar, CodecError> {
        Ok(match code {
            PrimitiveCode::Boolean => Scalar::Bool(source.get_bool(label)?),
            PrimitiveCode::Byte => Scalar::Byte(source.get_i8(label)?),
            PrimitiveCode::Short => Scalar::Short(source.get_i16(label)?),
            PrimitiveCode::Int => Scalar::Int(source.get_i32(label)?),
            PrimitiveCode::Long => Scalar::Long(source.get_i64(label)?),
            PrimitiveCode::Float => Scalar::Float(source.get_f32(label)?),
            PrimitiveCode::Double => Scalar::Double(source.get_f64(label)?),
            PrimitiveCode::Char => Scalar::Char(source.get_char(label)?),
            PrimitiveCode::Unit => {
                source.get_unit(label)?;
                Scalar::Unit
            }
            PrimitiveCode::String => Scalar::String(source.get_string(label)?),
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Byte(v) => write!(f, "{v}"),
            Scalar::Short(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Long(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Double(v) => write!(f, "{v}"),
            Scalar::Char(v) => write!(f, "{v:?}"),
            Scalar::Unit => f.write_str("()"),
            Scalar::String(v) => write!(f, "{v:?}"),
        }
    }
}

/// A Rust type that maps onto one [`PrimitiveCode`].
pub trait Primitive: Sized + Send + Sync + 'static {
    /// The primitive kind.
    const CODE: PrimitiveCode;

    /// Reads one value through the matching accessor.
    fn get(source: &mut dyn Source, label: &str) -> Result<Self, CodecError>;

    /// Writes one value through the matching accessor.
    fn put(&self, sink: &mut dyn Sink, label: &str) -> Result<(), CodecError>;

    /// Wraps the value.
    fn into_scalar(self) -> Scalar;

    /// Unwraps a scalar of the right kind.
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    /// The descriptor of this primitive.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::primitive(Self::CODE)
    }
}

macro_rules! primitive {
    ($ty:ty, $code:ident, $variant:ident, $get:ident, $put:ident) => {
        impl Primitive for $ty {
            const CODE: PrimitiveCode = PrimitiveCode::$code;

            fn get(source: &mut dyn Source, label: &str) -> Result<Self, CodecError> {
                source.$get(label)
            }

            fn put(&self, sink: &mut dyn Sink, label: &str) -> Result<(), CodecError> {
                sink.$put(label, *self)
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

primitive!(bool, Boolean, Bool, get_bool, put_bool);
primitive!(i8, Byte, Byte, get_i8, put_i8);
primitive!(i16, Short, Short, get_i16, put_i16);
primitive!(i32, Int, Int, get_i32, put_i32);
primitive!(i64, Long, Long, get_i64, put_i64);
primitive!(f32, Float, Float, get_f32, put_f32);
primitive!(f64, Double, Double, get_f64, put_f64);
primitive!(char, Char, Char, get_char, put_char);

impl Primitive for () {
    const CODE: PrimitiveCode = PrimitiveCode::Unit;

    fn get(source: &mut dyn Source, label: &str) -> Result<Self, CodecError> {
        source.get_unit(label)
    }

    fn put(&self, sink: &mut dyn Sink, label: &str) -> Result<(), CodecError> {
        sink.put_unit(label)
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Unit
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        matches!(scalar, Scalar::Unit).then_some(())
    }
}

impl Primitive for String {
    const CODE: PrimitiveCode = PrimitiveCode::String;

    fn get(source: &mut dyn Source, label: &str) -> Result<Self, CodecError> {
        source.get_string(label)
    }

    fn put(&self, sink: &mut dyn Sink, label: &str) -> Result<(), CodecError> {
        sink.put_str(label, self)
    }

    fn into_scalar(self) -> Scalar {
        Scalar::String(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::String(v) => Some(v),
            _ => None,
        }
    }
}
