mod common;

use common::*;
use weft_core::{
    Codec, Module, Registry, Resolver, Sink, SinkExt, Source, TypeDescriptor, write,
};
use weft_testhelpers::test;

struct Drawing {
    name: String,
    shape: Shape,
    backup: Option<Shape>,
}

fn drawing() -> TypeDescriptor {
    TypeDescriptor::record("Drawing")
}

struct DrawingCodec;

impl Codec for DrawingCodec {
    type Value = Drawing;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        _source: &mut dyn Source,
    ) -> Result<Drawing, weft_core::CodecError> {
        Err(weft_core::CodecError::backend("write-only in this test"))
    }

    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Drawing,
    ) -> Result<(), weft_core::CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_primitive("name", &value.name)?;
            sink.put_nested(resolver, "shape", &shape(), &value.shape)?;
            sink.put_nullable_nested(resolver, "backup", &shape(), value.backup.as_ref())
        })
    }
}

fn registry() -> Registry {
    Registry::builder()
        .provider(
            Module::builder()
                .codec(circle(), CircleCodec)
                .codec(square(), SquareCodec)
                .codec(shape(), shape_codec())
                .codec(drawing(), DrawingCodec)
                .build(),
        )
        .build()
}

#[test]
fn open_fields_are_tagged_with_their_runtime_type() {
    let value = Drawing {
        name: "logo".to_owned(),
        shape: Shape::Square(Square { side: 4 }),
        backup: None,
    };
    let mut sink = Recorder::default();
    write(&registry(), &drawing(), &mut sink, &value).unwrap();
    assert_eq!(
        sink.calls,
        [
            "begin Drawing",
            "name: \"logo\"",
            "shape: nest Shape as Square",
            "begin Square",
            "side: 4",
            "end Square",
            "shape: unnest",
            "backup: null=true",
            "end Drawing",
        ]
    );
}

#[test]
fn terminal_fields_are_not_tagged() {
    let mut sink = Recorder::default();
    let registry = registry();
    let sink_dyn: &mut dyn Sink = &mut sink;
    sink_dyn
        .put_nested(&registry, "c", &circle(), &Circle { radius: 2 })
        .unwrap();
    assert_eq!(sink.calls[0], "c: nest Circle");
}

#[test]
fn top_level_open_value_goes_through_it() {
    let mut sink = Recorder::default();
    write(
        &registry(),
        &shape(),
        &mut sink,
        &Shape::Circle(Circle { radius: 9 }),
    )
    .unwrap();
    assert_eq!(
        sink.calls,
        [
            "it: nest Shape as Circle",
            "begin Circle",
            "radius: 9",
            "end Circle",
            "it: unnest",
        ]
    );
}

#[test]
fn family_adopts_member_payloads() {
    let codec = shape_codec();
    let adopted = codec.adopt(Box::new(Circle { radius: 5 })).unwrap();
    assert_eq!(adopted, Shape::Circle(Circle { radius: 5 }));
    assert!(codec.adopt(Box::new(17_i32)).is_err());
    assert_eq!(
        codec.runtime_type(&Shape::Square(Square { side: 1 })),
        Some(weft_core::BaseType::record("Square"))
    );
}

#[test]
fn family_has_no_body_of_its_own() {
    let mut sink = Recorder::default();
    let error = shape_codec()
        .write(
            &registry(),
            &shape(),
            &mut sink,
            &Shape::Circle(Circle { radius: 1 }),
        )
        .unwrap_err();
    assert_eq!(error.code(), "weft::backend");
}
