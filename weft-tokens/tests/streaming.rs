use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use weft_core::{
    Codec, CodecError, ContinueFlag, Module, Registry, Resolver, Scalar, Sink, SinkExt, Source,
    SourceExt, TypeDescriptor as T, TypeDescriptor,
};
use weft_std::{ModuleBuilderExt, std_module};
use weft_testhelpers::test;
use weft_tokens::{
    DEFAULT_CAPACITY, Token, channel, channel_with_flag, from_tokens, read_async, to_tokens,
    write_async,
};

#[derive(Debug, Clone, PartialEq)]
struct Tick(i32);

fn tick() -> TypeDescriptor {
    T::record("Tick")
}

/// Counts the ticks it reads and withdraws continuation after `stop_after`.
struct TickCodec {
    flag: ContinueFlag,
    read: AtomicUsize,
    stop_after: usize,
}

impl TickCodec {
    fn new(flag: ContinueFlag, stop_after: usize) -> Self {
        Self {
            flag,
            read: AtomicUsize::new(0),
            stop_after,
        }
    }
}

impl Codec for TickCodec {
    type Value = Tick;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Tick, CodecError> {
        let tick = source.mark_around(ty, |source| source.get_primitive("n").map(Tick))?;
        if self.read.fetch_add(1, Ordering::SeqCst) + 1 == self.stop_after {
            self.flag.stop();
        }
        Ok(tick)
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Tick,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| sink.put_primitive("n", &value.0))
    }
}

fn registry(flag: ContinueFlag, stop_after: usize) -> Arc<Registry> {
    let ticks = Module::builder()
        .codec(tick(), TickCodec::new(flag, stop_after))
        .list::<Tick>(tick())
        .build();
    Arc::new(
        Registry::builder()
            .provider(std_module())
            .provider(ticks)
            .build(),
    )
}

fn ticks(count: i32) -> Vec<Tick> {
    (0..count).map(Tick).collect()
}

#[test]
fn list_streams_through_the_channel() {
    let registry = registry(ContinueFlag::new(), usize::MAX);
    let ty = T::list(tick());
    let (mut sink, mut source) = channel(DEFAULT_CAPACITY);

    let producer = {
        let registry = registry.clone();
        let ty = ty.clone();
        std::thread::spawn(move || {
            weft_core::write(&*registry, &ty, &mut sink, &ticks(50)).unwrap();
            sink.hung_up()
        })
    };
    let read: Vec<Tick> = weft_core::read(&*registry, &ty, &mut source).unwrap();
    assert!(!producer.join().unwrap());
    assert_eq!(read, ticks(50));
}

#[test]
fn consumer_can_stop_a_long_list() {
    let flag = ContinueFlag::new();
    let registry = registry(flag.clone(), 3);
    let ty = T::list(tick());
    let (mut sink, mut source) = channel_with_flag(DEFAULT_CAPACITY, flag.clone());

    let producer = {
        let registry = registry.clone();
        let ty = ty.clone();
        std::thread::spawn(move || {
            let result = weft_core::write(&*registry, &ty, &mut sink, &ticks(10_000));
            (result, sink.hung_up())
        })
    };
    let read: Vec<Tick> = weft_core::read(&*registry, &ty, &mut source).unwrap();
    assert_eq!(read, ticks(3));
    assert!(source.is_cancelled());
    assert!(!source.continue_flag().is_set());

    let (result, hung_up) = producer.join().unwrap();
    assert!(result.is_ok());
    assert!(hung_up);
}

#[test]
fn dropped_producer_truncates_the_stream() {
    let registry = registry(ContinueFlag::new(), usize::MAX);
    let ty = T::list(T::int());
    let (mut sink, mut source) = channel(4);

    let producer = std::thread::spawn(move || {
        sink.begin(&T::list(T::int())).unwrap();
        sink.put_i32("item0", 1).unwrap();
    });
    let error = weft_core::read::<Vec<i32>>(&*registry, &ty, &mut source).unwrap_err();
    producer.join().unwrap();
    assert_eq!(error.code(), "weft::protocol");
}

#[test(tokio::test)]
async fn async_producer_and_consumer() {
    let ty = T::pair(T::string(), T::list(T::long()));
    let registry: Arc<dyn Resolver> = Arc::new(
        Registry::builder()
            .provider(std_module())
            .provider(
                Module::builder()
                    .pair::<String, Vec<i64>>(T::string(), T::list(T::long()))
                    .build(),
            )
            .build(),
    );
    let (sink, source) = channel(DEFAULT_CAPACITY);
    let value = ("numbers".to_owned(), vec![1_i64, 2, 3]);

    let (written, read) = tokio::join!(
        write_async(registry.clone(), ty.clone(), sink, value.clone()),
        read_async::<(String, Vec<i64>)>(registry, ty, source),
    );
    written.unwrap();
    assert_eq!(read.unwrap(), value);
}

#[test(tokio::test)]
async fn async_consumer_cancels_producer() {
    let flag = ContinueFlag::new();
    let registry: Arc<dyn Resolver> = registry(flag.clone(), 2);
    let ty = T::list(tick());
    let (sink, source) = channel_with_flag(DEFAULT_CAPACITY, flag);

    let (written, read) = tokio::join!(
        write_async(registry.clone(), ty.clone(), sink, ticks(1_000)),
        read_async::<Vec<Tick>>(registry, ty, source),
    );
    written.unwrap();
    assert_eq!(read.unwrap(), ticks(2));
}

#[test]
fn terminal_elements_have_no_type_tag() {
    let registry = registry(ContinueFlag::new(), usize::MAX);
    let tokens = to_tokens(&*registry, &T::list(tick()), &ticks(1)).unwrap();
    assert_eq!(
        tokens,
        [
            Token::Begin,
            Token::BeginNested,
            Token::Begin,
            Token::Scalar(Scalar::Int(0)),
            Token::End,
            Token::EndNested,
            Token::End,
        ]
    );
}

#[test]
fn mismatched_tokens_name_both_sides() {
    let registry = registry(ContinueFlag::new(), usize::MAX);
    let error = from_tokens::<Vec<i32>>(
        &*registry,
        &T::list(T::int()),
        [Token::Begin, Token::Scalar(Scalar::Bool(true)), Token::End],
    )
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "protocol violation: expected Int, found Boolean"
    );
}

#[test]
fn leftover_tokens_are_rejected() {
    let registry = registry(ContinueFlag::new(), usize::MAX);
    let error = from_tokens::<i32>(
        &*registry,
        &T::int(),
        [Token::Scalar(Scalar::Int(1)), Token::End],
    )
    .unwrap_err();
    assert_eq!(error.code(), "weft::protocol");
}
