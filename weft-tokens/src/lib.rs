//! The token backend: every protocol call becomes one [`Token`].
//!
//! [`TokenSink`] and [`TokenSource`] work over an in-memory list or a bounded
//! channel. The channel variant streams values between a producer and a
//! consumer; the consumer can stop a long collection early through its
//! [`ContinueFlag`](weft_core::ContinueFlag), after which the producer finishes
//! quietly.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod channel;
mod sink;
mod source;
mod token;

pub use channel::{
    ChannelInput, ChannelOutput, ChannelSink, ChannelSource, DEFAULT_CAPACITY, channel,
    channel_with_flag, read_async, write_async,
};
pub use sink::{TokenOutput, TokenSink};
pub use source::{TokenInput, TokenSource};
pub use token::Token;

use weft_core::{CodecError, Resolver, TypeDescriptor};

/// Writes `value` to a fresh token list.
pub fn to_tokens<T: Send + 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    value: &T,
) -> Result<Vec<Token>, CodecError> {
    let mut sink = TokenSink::buffered();
    weft_core::write(resolver, ty, &mut sink, value)?;
    Ok(sink.into_tokens())
}

/// Reads a value from a token list. Tokens left over after the value are a
/// protocol error.
pub fn from_tokens<T: 'static>(
    resolver: &dyn Resolver,
    ty: &TypeDescriptor,
    tokens: impl IntoIterator<Item = Token>,
) -> Result<T, CodecError> {
    let mut source = TokenSource::from_tokens(tokens);
    let value = weft_core::read(resolver, ty, &mut source)?;
    match source.remaining() {
        0 => Ok(value),
        left => Err(CodecError::protocol(
            "end of stream",
            format!("{left} more tokens"),
        )),
    }
}
