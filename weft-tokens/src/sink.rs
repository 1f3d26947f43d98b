use tracing::trace;
use weft_core::{CodecError, Scalar, Sink, TypeDescriptor};

use crate::Token;

/// Where a [`TokenSink`] puts its tokens.
pub trait TokenOutput {
    /// Emits one token.
    fn emit(&mut self, token: Token) -> Result<(), CodecError>;
}

impl TokenOutput for Vec<Token> {
    fn emit(&mut self, token: Token) -> Result<(), CodecError> {
        self.push(token);
        Ok(())
    }
}

/// A sink that turns every protocol call into a [`Token`].
///
/// Labels are dropped; the token stream is positional.
#[derive(Debug, Default)]
pub struct TokenSink<O> {
    output: O,
}

impl<O: TokenOutput> TokenSink<O> {
    /// A sink writing to `output`.
    pub fn new(output: O) -> Self {
        Self { output }
    }

    /// The output.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Gives the output back.
    pub fn into_output(self) -> O {
        self.output
    }

    fn scalar(&mut self, label: &str, scalar: Scalar) -> Result<(), CodecError> {
        trace!(label, %scalar, "put");
        self.output.emit(Token::Scalar(scalar))
    }
}

impl TokenSink<Vec<Token>> {
    /// A sink collecting tokens in memory.
    pub fn buffered() -> Self {
        Self::new(Vec::new())
    }

    /// The tokens written so far.
    pub fn tokens(&self) -> &[Token] {
        &self.output
    }

    /// Takes the collected tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.output
    }
}

impl<O: TokenOutput> Sink for TokenSink<O> {
    fn begin(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.output.emit(Token::Begin)
    }

    fn end(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.output.emit(Token::End)
    }

    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        self.output.emit(Token::BeginNested)?;
        if !ty.is_terminal() {
            trace!(label, %actual, "type tag");
            self.output.emit(Token::TypeTag(actual.clone()))?;
        }
        Ok(())
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.output.emit(Token::EndNested)
    }

    fn put_null(&mut self, _label: &str, is_null: bool) -> Result<(), CodecError> {
        self.output.emit(if is_null {
            Token::IsNull
        } else {
            Token::IsNotNull
        })
    }

    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Bool(value))
    }

    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Byte(value))
    }

    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Short(value))
    }

    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Int(value))
    }

    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Long(value))
    }

    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Float(value))
    }

    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Double(value))
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Char(value))
    }

    fn put_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.scalar(label, Scalar::Unit)
    }

    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError> {
        self.scalar(label, Scalar::String(value.to_owned()))
    }
}
