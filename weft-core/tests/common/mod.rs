//! A sink that records the protocol calls it receives, and a couple of
//! hand-written codecs.

#![allow(dead_code)]

use weft_core::{
    BaseType, Codec, CodecError, FamilyCodec, Resolver, Sink, SinkExt, Source, SourceExt,
    TypeDescriptor,
};

#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<String>,
}

impl Sink for Recorder {
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.calls.push(format!("begin {ty}"));
        Ok(())
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.calls.push(format!("end {ty}"));
        Ok(())
    }

    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        if ty.is_terminal() {
            self.calls.push(format!("{label}: nest {ty}"));
        } else {
            self.calls.push(format!("{label}: nest {ty} as {actual}"));
        }
        Ok(())
    }

    fn end_nested(&mut self, label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: unnest"));
        Ok(())
    }

    fn put_null(&mut self, label: &str, is_null: bool) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: null={is_null}"));
        Ok(())
    }

    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value}"));
        Ok(())
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value:?}"));
        Ok(())
    }

    fn put_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: ()"));
        Ok(())
    }

    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError> {
        self.calls.push(format!("{label}: {value:?}"));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Square {
    pub side: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Square(Square),
}

pub fn circle() -> TypeDescriptor {
    TypeDescriptor::record("Circle")
}

pub fn square() -> TypeDescriptor {
    TypeDescriptor::record("Square")
}

pub fn shape() -> TypeDescriptor {
    TypeDescriptor::open("Shape")
}

pub struct CircleCodec;

impl Codec for CircleCodec {
    type Value = Circle;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Circle, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Circle {
                radius: source.get_primitive("radius")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Circle,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| sink.put_primitive("radius", &value.radius))
    }
}

pub struct SquareCodec;

impl Codec for SquareCodec {
    type Value = Square;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Square, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Square {
                side: source.get_primitive("side")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Square,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| sink.put_primitive("side", &value.side))
    }
}

pub fn shape_codec() -> FamilyCodec<Shape> {
    FamilyCodec::new(BaseType::open("Shape"))
        .member(
            BaseType::record("Circle"),
            |shape| match shape {
                Shape::Circle(circle) => Some(circle),
                _ => None,
            },
            Shape::Circle,
        )
        .member(
            BaseType::record("Square"),
            |shape| match shape {
                Shape::Square(square) => Some(square),
                _ => None,
            },
            Shape::Square,
        )
}
