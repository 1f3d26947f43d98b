//! The error type shared by every codec and backend.

use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;

/// Everything that can go wrong during a read or a write.
///
/// None of these are recovered from inside the protocol: a failed call leaves
/// the sink or source in an unspecified position.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// No codec is registered for the descriptor.
    Unresolved {
        /// The descriptor that could not be resolved.
        descriptor: TypeDescriptor,
    },
    /// The backend produced something other than what the current frame expects.
    Protocol {
        /// What the reader was looking for.
        expected: Cow<'static, str>,
        /// What it saw instead.
        found: String,
    },
    /// A labeled reader reached the end of a scope without seeing the label.
    MissingField {
        /// The requested label.
        label: String,
    },
    /// A descriptor has the wrong number of type arguments.
    Arity {
        /// The offending descriptor.
        descriptor: TypeDescriptor,
        /// The number of arguments required.
        expected: usize,
        /// The number of arguments present.
        found: usize,
    },
    /// A value was recovered as a different Rust type than the codec produces.
    TypeMismatch {
        /// The descriptor the value was read or written for.
        descriptor: TypeDescriptor,
        /// The Rust type that was asked for.
        expected: &'static str,
    },
    /// A textual descriptor could not be parsed.
    Descriptor {
        /// The input text.
        text: String,
        /// Byte offset of the failure.
        position: usize,
        /// What went wrong.
        message: &'static str,
    },
    /// The underlying reader or writer failed.
    Io(Arc<std::io::Error>),
    /// A backend-specific failure, such as an unrepresentable value.
    Backend(String),
}

impl CodecError {
    /// A protocol violation.
    pub fn protocol(expected: impl Into<Cow<'static, str>>, found: impl fmt::Display) -> Self {
        CodecError::Protocol {
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// A backend-specific failure.
    pub fn backend(message: impl Into<String>) -> Self {
        CodecError::Backend(message.into())
    }

    /// A value of the wrong Rust type for `descriptor`.
    pub fn type_mismatch<T: ?Sized>(descriptor: &TypeDescriptor) -> Self {
        CodecError::TypeMismatch {
            descriptor: descriptor.clone(),
            expected: core::any::type_name::<T>(),
        }
    }

    /// Stable identifier of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Unresolved { .. } => "weft::unresolved",
            CodecError::Protocol { .. } => "weft::protocol",
            CodecError::MissingField { .. } => "weft::missing_field",
            CodecError::Arity { .. } => "weft::arity",
            CodecError::TypeMismatch { .. } => "weft::type_mismatch",
            CodecError::Descriptor { .. } => "weft::descriptor",
            CodecError::Io(_) => "weft::io",
            CodecError::Backend(_) => "weft::backend",
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Unresolved { descriptor } => {
                write!(f, "no codec registered for {descriptor}")
            }
            CodecError::Protocol { expected, found } => {
                write!(f, "protocol violation: expected {expected}, found {found}")
            }
            CodecError::MissingField { label } => write!(f, "field `{label}` not found"),
            CodecError::Arity {
                descriptor,
                expected,
                found,
            } => write!(
                f,
                "{descriptor} needs {expected} type argument(s), has {found}"
            ),
            CodecError::TypeMismatch {
                descriptor,
                expected,
            } => write!(f, "value for {descriptor} is not a {expected}"),
            CodecError::Descriptor {
                text,
                position,
                message,
            } => write!(f, "invalid type descriptor {text:?} at {position}: {message}"),
            CodecError::Io(error) => write!(f, "IO error: {error}"),
            CodecError::Backend(message) => f.write_str(message),
        }
    }
}

impl core::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            CodecError::Io(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        CodecError::Io(Arc::new(error))
    }
}

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for CodecError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(CodecError::code(self)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            CodecError::Unresolved { .. } => Some(Box::new(
                "register a codec for this descriptor in a Module passed to the Registry",
            )),
            CodecError::Descriptor { .. } => Some(Box::new(
                "descriptors are written as Name<Arg1, Arg2>? with optional `?` for nullable",
            )),
            _ => None,
        }
    }
}
