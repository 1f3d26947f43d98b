//! Token streaming between a producer and a consumer over a bounded channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;
use weft_core::{CodecError, ContinueFlag, Resolver, TypeDescriptor};

use crate::{Token, TokenInput, TokenOutput, TokenSink, TokenSource};

/// Capacity of [`channel`] when none is chosen: one token in flight, the
/// closest bounded equivalent of a rendezvous.
pub const DEFAULT_CAPACITY: usize = 1;

/// Producer end of a token channel.
#[derive(Debug)]
pub struct ChannelOutput {
    sender: mpsc::Sender<Token>,
    hung_up: bool,
}

impl ChannelOutput {
    /// True once the consumer went away. Tokens emitted after that are dropped.
    pub fn hung_up(&self) -> bool {
        self.hung_up
    }
}

impl TokenOutput for ChannelOutput {
    fn emit(&mut self, token: Token) -> Result<(), CodecError> {
        if self.hung_up {
            return Ok(());
        }
        if self.sender.blocking_send(token).is_err() {
            debug!("consumer hung up, dropping the rest of the stream");
            self.hung_up = true;
        }
        Ok(())
    }
}

/// Consumer end of a token channel.
#[derive(Debug)]
pub struct ChannelInput {
    receiver: mpsc::Receiver<Token>,
    lookahead: Option<Token>,
    flag: ContinueFlag,
}

impl ChannelInput {
    /// The flag consulted by [`TokenInput::continue_requested`].
    pub fn flag(&self) -> &ContinueFlag {
        &self.flag
    }

    fn fill(&mut self) {
        if self.lookahead.is_none() {
            self.lookahead = self.receiver.blocking_recv();
        }
    }
}

impl TokenInput for ChannelInput {
    fn peek(&mut self) -> Result<Option<&Token>, CodecError> {
        self.fill();
        Ok(self.lookahead.as_ref())
    }

    fn next_token(&mut self) -> Result<Option<Token>, CodecError> {
        self.fill();
        Ok(self.lookahead.take())
    }

    fn continue_requested(&self) -> bool {
        self.flag.is_set()
    }

    fn cancel(&mut self) {
        self.lookahead = None;
        self.receiver.close();
    }
}

/// Writing half of [`channel`].
pub type ChannelSink = TokenSink<ChannelOutput>;

/// Reading half of [`channel`].
pub type ChannelSource = TokenSource<ChannelInput>;

impl TokenSink<ChannelOutput> {
    /// True once the reading half stopped listening.
    pub fn hung_up(&self) -> bool {
        self.output().hung_up()
    }
}

impl TokenSource<ChannelInput> {
    /// A handle on the flag that asks the producer to stop after the current
    /// element.
    pub fn continue_flag(&self) -> ContinueFlag {
        self.input().flag().clone()
    }
}

/// A bounded token channel holding at most `capacity` tokens in flight.
///
/// Both halves block the calling thread; drive them from plain threads or
/// through [`write_async`] and [`read_async`]. Dropping the sink ends the
/// stream.
pub fn channel(capacity: usize) -> (ChannelSink, ChannelSource) {
    channel_with_flag(capacity, ContinueFlag::new())
}

/// Like [`channel`], with a flag shared with other parts of the consumer.
pub fn channel_with_flag(capacity: usize, flag: ContinueFlag) -> (ChannelSink, ChannelSource) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let sink = TokenSink::new(ChannelOutput {
        sender,
        hung_up: false,
    });
    let source = TokenSource::new(ChannelInput {
        receiver,
        lookahead: None,
        flag,
    });
    (sink, source)
}

fn joined<T>(
    result: Result<Result<T, CodecError>, tokio::task::JoinError>,
) -> Result<T, CodecError> {
    result.map_err(|error| CodecError::backend(format!("codec task failed: {error}")))?
}

/// Writes `value` into `sink` on the blocking pool. The sink is dropped at the
/// end, which ends the stream for the reader.
pub async fn write_async<T: Send + 'static>(
    resolver: Arc<dyn Resolver>,
    ty: TypeDescriptor,
    mut sink: ChannelSink,
    value: T,
) -> Result<(), CodecError> {
    let task = tokio::task::spawn_blocking(move || {
        weft_core::write(&*resolver, &ty, &mut sink, &value)?;
        if sink.hung_up() {
            debug!(%ty, "reader stopped early");
        }
        Ok(())
    });
    joined(task.await)
}

/// Reads one value of type `T` from `source` on the blocking pool.
pub async fn read_async<T: Send + 'static>(
    resolver: Arc<dyn Resolver>,
    ty: TypeDescriptor,
    mut source: ChannelSource,
) -> Result<T, CodecError> {
    let task =
        tokio::task::spawn_blocking(move || weft_core::read::<T>(&*resolver, &ty, &mut source));
    joined(task.await)
}
