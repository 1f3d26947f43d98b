use std::collections::HashMap;

use weft_core::{
    BaseType, Codec, CodecError, FamilyCodec, Module, Registry, Resolver, Scalar, Sink, SinkExt,
    Source, SourceExt, TypeDescriptor as T, TypeDescriptor,
};
use weft_std::{ModuleBuilderExt, std_module};
use weft_testhelpers::test;
use weft_tools::{HashSink, MapSink, PrintSink, from_map, hash, print, to_map};

#[derive(Debug, Clone, PartialEq)]
struct Circle {
    radius: i32,
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle(Circle),
}

struct CircleCodec;

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

fn shape() -> TypeDescriptor {
    T::open("Shape")
}

#[derive(Debug, Clone, PartialEq)]
struct Badge {
    id: i32,
    holder: String,
    note: Option<String>,
}

fn badge() -> TypeDescriptor {
    T::record("Badge")
}

struct BadgeCodec;

impl Codec for BadgeCodec {
    type Value = Badge;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Badge, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Badge {
                id: source.get_primitive("id")?,
                holder: source.get_primitive("holder")?,
                note: source.get_nullable("note")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Badge,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_primitive("id", &value.id)?;
            sink.put_primitive("holder", &value.holder)?;
            sink.put_nullable("note", value.note.as_ref())
        })
    }
}

fn registry() -> Registry {
    let shapes = FamilyCodec::new(BaseType::open("Shape")).member(
        BaseType::record("Circle"),
        |shape| match shape {
            Shape::Circle(circle) => Some(circle),
        },
        Shape::Circle,
    );
    let records = Module::builder()
        .codec(T::record("Circle"), CircleCodec)
        .codec(shape(), shapes)
        .codec(badge(), BadgeCodec)
        .list::<Shape>(shape())
        .pair::<i32, String>(T::int(), T::string())
        .pair::<Option<i32>, Vec<String>>(T::int().nullable(), T::list(T::string()))
        .build();
    Registry::builder()
        .provider(std_module())
        .provider(records)
        .build()
}

#[test]
fn labeled_print_of_a_pair() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());
    let text = print(&registry, &ty, &(120, "Hello".to_owned()), true).unwrap();
    assert_eq!(
        text,
        "Begin Pair<Int, String>\n\tfirst: Int 120\n\tsecond: String Hello\nEnd\n"
    );
}

#[test]
fn nested_fields_indent_their_contents() {
    let registry = registry();
    let ty = T::pair(T::int().nullable(), T::list(T::string()));
    let value = (None::<i32>, vec!["a".to_owned()]);

    let labeled = print(&registry, &ty, &value, true).unwrap();
    assert_eq!(
        labeled,
        "Begin Pair<Int?, List<String>>\n\
         \tfirst: Is-null true\n\
         \tsecond: Begin-nested List<String>\n\
         \t\tBegin List<String>\n\
         \t\t\titem0: String a\n\
         \t\tEnd\n\
         \tsecond: End-nested\n\
         End\n"
    );

    let bare = print(&registry, &ty, &value, false).unwrap();
    assert!(bare.contains("\tIs-null true\n"), "{bare}");
    assert!(!bare.contains("first"), "{bare}");
}

#[test]
fn open_elements_show_their_runtime_type() {
    let registry = registry();
    let ty = T::list(shape());
    let value = vec![Shape::Circle(Circle { radius: 3 })];

    let mut sink = PrintSink::sequence(String::new());
    weft_core::write(&registry, &ty, &mut sink, &value).unwrap();
    assert_eq!(
        sink.into_inner(),
        "Begin List<Shape>\n\
         \tBegin-nested Shape (Circle)\n\
         \t\tBegin Circle\n\
         \t\t\tInt 3\n\
         \t\tEnd\n\
         \tEnd-nested\n\
         End\n"
    );
}

#[test]
fn multi_line_strings_keep_the_indentation() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());
    let text = print(&registry, &ty, &(1, "two\nlines".to_owned()), false).unwrap();
    assert!(text.contains("\tString two\n\tlines\n"), "{text}");
}

#[test]
fn hash_folds_scalars_in_order() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());
    // (1 * 37 + 1) * 37 + 'a'
    assert_eq!(hash(&registry, &ty, &(1, "a".to_owned())).unwrap(), 1503);
    assert_ne!(
        hash(&registry, &ty, &(1, "a".to_owned())).unwrap(),
        hash(&registry, &ty, &(1, "b".to_owned())).unwrap()
    );
    assert_eq!(
        hash(&registry, &T::list(T::int()), &vec![1, 2]).unwrap(),
        (37 + 1) * 37 + 2
    );
}

#[test]
fn nulls_contribute_zero() {
    let registry = registry();
    let ty = T::list(T::int().nullable());
    assert_eq!(hash(&registry, &ty, &vec![Some(1), None]).unwrap(), 38 * 37);
}

#[test]
fn prime_is_configurable_and_reset_clears() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());
    let mut sink = HashSink::with_prime(31);
    weft_core::write(&registry, &ty, &mut sink, &(1, "a".to_owned())).unwrap();
    assert_eq!(sink.value(), (31 + 1) * 31 + 97);
    assert_eq!(sink.reset(), 1089);
    assert_eq!(sink.value(), 1);
}

#[test]
fn equal_shapes_hash_equal() {
    let registry = registry();
    let ty = T::list(shape());
    let a = vec![Shape::Circle(Circle { radius: 3 })];
    let b = a.clone();
    assert_eq!(
        hash(&registry, &ty, &a).unwrap(),
        hash(&registry, &ty, &b).unwrap()
    );
}

#[test]
fn map_holds_the_scalar_fields_of_a_record() {
    let registry = registry();
    let value = Badge {
        id: 5,
        holder: "Ada".to_owned(),
        note: Some("guest".to_owned()),
    };
    let map = to_map(&registry, &badge(), &value).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["id"], Scalar::Int(5));
    assert_eq!(map["holder"], Scalar::String("Ada".to_owned()));

    let back: Badge = from_map(&registry, &badge(), map).unwrap();
    assert_eq!(back, value);
}

#[test]
fn null_fields_are_left_out_of_the_map() {
    let registry = registry();
    let value = Badge {
        id: 6,
        holder: "Grace".to_owned(),
        note: None,
    };
    let map = to_map(&registry, &badge(), &value).unwrap();
    assert!(!map.contains_key("note"));

    let back: Badge = from_map(&registry, &badge(), map).unwrap();
    assert_eq!(back, value);
}

#[test]
fn map_sink_skips_nested_blocks_and_resets() {
    let registry = registry();
    let ty = T::pair(T::int().nullable(), T::list(T::string()));
    let mut sink = MapSink::new();
    weft_core::write(&registry, &ty, &mut sink, &(Some(4), vec!["a".to_owned()])).unwrap();
    assert_eq!(sink.get("first"), Some(&Scalar::Int(4)));
    assert_eq!(sink.get("item0"), None);

    let map = sink.reset();
    assert_eq!(map.len(), 1);
    assert!(sink.reset().is_empty());
}

#[test]
fn map_source_rejects_nested_blocks_and_wrong_kinds() {
    let registry = registry();
    let ty = T::pair(T::int().nullable(), T::list(T::string()));
    let map = HashMap::from([("first".to_owned(), Scalar::Int(4))]);
    let error = from_map::<(Option<i32>, Vec<String>)>(&registry, &ty, map).unwrap_err();
    assert_eq!(error.code(), "weft::backend");

    let map = HashMap::from([
        ("id".to_owned(), Scalar::String("five".to_owned())),
        ("holder".to_owned(), Scalar::String("Ada".to_owned())),
    ]);
    let error = from_map::<Badge>(&registry, &badge(), map).unwrap_err();
    assert_eq!(error.code(), "weft::protocol");
}
