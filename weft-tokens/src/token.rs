use core::fmt;

use weft_core::{Scalar, TypeDescriptor};

/// One protocol call, as carried by token lists and channels.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `begin`
    Begin,
    /// `end`
    End,
    /// `put_null(true)`
    IsNull,
    /// `put_null(false)`
    IsNotNull,
    /// `begin_nested`
    BeginNested,
    /// `end_nested`
    EndNested,
    /// One typed scalar.
    Scalar(Scalar),
    /// Runtime type of an open field; follows [`Token::BeginNested`].
    TypeTag(TypeDescriptor),
}

impl Token {
    /// The name of the variant, for protocol errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Begin => "Begin",
            Token::End => "End",
            Token::IsNull => "IsNull",
            Token::IsNotNull => "IsNotNull",
            Token::BeginNested => "BeginNested",
            Token::EndNested => "EndNested",
            Token::Scalar(_) => "Scalar",
            Token::TypeTag(_) => "TypeTag",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Scalar(scalar) => write!(f, "Scalar({} {scalar})", scalar.code().name()),
            Token::TypeTag(ty) => write!(f, "TypeTag({ty})"),
            other => f.write_str(other.kind()),
        }
    }
}
