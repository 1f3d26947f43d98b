use std::collections::VecDeque;

use tracing::{debug, trace};
use weft_core::{CodecError, Nested, Scalar, Source, TypeDescriptor};

use crate::Token;

/// Where a [`TokenSource`] takes its tokens from.
pub trait TokenInput {
    /// The next token without consuming it; `None` once the input is exhausted.
    fn peek(&mut self) -> Result<Option<&Token>, CodecError>;

    /// Consumes the next token.
    fn next_token(&mut self) -> Result<Option<Token>, CodecError>;

    /// Whether the consumer still wants more elements.
    fn continue_requested(&self) -> bool {
        true
    }

    /// Stops the input early. Called once, when a container finishes because
    /// continuation is no longer requested.
    fn cancel(&mut self) {}
}

impl TokenInput for VecDeque<Token> {
    fn peek(&mut self) -> Result<Option<&Token>, CodecError> {
        Ok(self.front())
    }

    fn next_token(&mut self) -> Result<Option<Token>, CodecError> {
        Ok(self.pop_front())
    }
}

/// A strict sequential source over a token stream.
///
/// Every call must find exactly the token it expects; anything else, including
/// running out of tokens, is a protocol error.
#[derive(Debug)]
pub struct TokenSource<I> {
    input: I,
    cancelled: bool,
}

impl TokenSource<VecDeque<Token>> {
    /// A source replaying `tokens`.
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self::new(tokens.into_iter().collect())
    }

    /// Tokens not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }
}

impl<I: TokenInput> TokenSource<I> {
    /// A source reading from `input`.
    pub fn new(input: I) -> Self {
        Self {
            input,
            cancelled: false,
        }
    }

    /// The input.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// True once a container stopped early and the input was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn take(&mut self, expected: &'static str) -> Result<Token, CodecError> {
        if self.cancelled {
            return Err(CodecError::protocol(expected, "cancelled stream"));
        }
        match self.input.next_token()? {
            Some(token) => {
                trace!(%token, "take");
                Ok(token)
            }
            None => Err(CodecError::protocol(expected, "end of stream")),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), CodecError> {
        let token = self.take(expected.kind())?;
        if token == expected {
            Ok(())
        } else {
            Err(CodecError::protocol(expected.kind(), token))
        }
    }

    fn scalar(&mut self, label: &str) -> Result<Scalar, CodecError> {
        match self.take("Scalar")? {
            Token::Scalar(scalar) => {
                trace!(label, %scalar, "get");
                Ok(scalar)
            }
            other => Err(CodecError::protocol("Scalar", other)),
        }
    }
}

macro_rules! get_scalar {
    ($self:ident, $label:ident, $variant:ident, $name:literal) => {
        match $self.scalar($label)? {
            Scalar::$variant(value) => Ok(value),
            other => Err(CodecError::protocol($name, other.code().name())),
        }
    };
}

impl<I: TokenInput> Source for TokenSource<I> {
    fn begin(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.expect(Token::Begin)
    }

    fn is_end(&mut self) -> Result<bool, CodecError> {
        if self.cancelled {
            return Ok(true);
        }
        match self.input.peek()? {
            Some(token) => Ok(*token == Token::End),
            None => Err(CodecError::protocol("End", "end of stream")),
        }
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        if self.cancelled {
            return Ok(());
        }
        if !self.input.continue_requested() {
            debug!(%ty, "continuation withdrawn, cancelling input");
            self.input.cancel();
            self.cancelled = true;
            return Ok(());
        }
        self.expect(Token::End)
    }

    fn begin_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<Nested, CodecError> {
        self.expect(Token::BeginNested)?;
        if ty.is_terminal() {
            return Ok(Nested::Nest);
        }
        match self.take("TypeTag")? {
            Token::TypeTag(actual) => {
                trace!(label, %ty, %actual, "substitute");
                Ok(Nested::Substitute(actual))
            }
            other => Err(CodecError::protocol("TypeTag", other)),
        }
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        if self.cancelled {
            return Ok(());
        }
        self.expect(Token::EndNested)
    }

    fn is_null(&mut self, _label: &str) -> Result<bool, CodecError> {
        match self.take("IsNull")? {
            Token::IsNull => Ok(true),
            Token::IsNotNull => Ok(false),
            other => Err(CodecError::protocol("IsNull", other)),
        }
    }

    fn get_bool(&mut self, label: &str) -> Result<bool, CodecError> {
        get_scalar!(self, label, Bool, "Boolean")
    }

    fn get_i8(&mut self, label: &str) -> Result<i8, CodecError> {
        get_scalar!(self, label, Byte, "Byte")
    }

    fn get_i16(&mut self, label: &str) -> Result<i16, CodecError> {
        get_scalar!(self, label, Short, "Short")
    }

    fn get_i32(&mut self, label: &str) -> Result<i32, CodecError> {
        get_scalar!(self, label, Int, "Int")
    }

    fn get_i64(&mut self, label: &str) -> Result<i64, CodecError> {
        get_scalar!(self, label, Long, "Long")
    }

    fn get_f32(&mut self, label: &str) -> Result<f32, CodecError> {
        get_scalar!(self, label, Float, "Float")
    }

    fn get_f64(&mut self, label: &str) -> Result<f64, CodecError> {
        get_scalar!(self, label, Double, "Double")
    }

    fn get_char(&mut self, label: &str) -> Result<char, CodecError> {
        get_scalar!(self, label, Char, "Char")
    }

    fn get_unit(&mut self, label: &str) -> Result<(), CodecError> {
        match self.scalar(label)? {
            Scalar::Unit => Ok(()),
            other => Err(CodecError::protocol("Unit", other.code().name())),
        }
    }

    fn get_string(&mut self, label: &str) -> Result<String, CodecError> {
        get_scalar!(self, label, String, "String")
    }

    fn continue_requested(&self) -> bool {
        !self.cancelled && self.input.continue_requested()
    }
}
