use weft_core::{
    BaseType, Codec, CodecError, FamilyCodec, Module, Registry, Resolver, Sink, SinkExt, Source,
    SourceExt, TypeDescriptor as T, TypeDescriptor,
};
use weft_json::{JsonOptions, from_str, to_string, to_string_with};
use weft_std::{ModuleBuilderExt, std_module};
use weft_testhelpers::test;

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct Label {
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Mark {
    Point(Point),
    Label(Label),
}

#[derive(Debug, Clone, PartialEq)]
enum Sketch {
    Marks(Vec<Mark>),
}

#[derive(Debug, Clone, PartialEq)]
struct Drawing {
    mark: Mark,
    marks: Vec<Mark>,
}

struct PersonCodec;

impl Codec for PersonCodec {
    type Value = Person;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Person, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Person {
                name: source.get_primitive("name")?,
                age: source.get_primitive("age")?,
                email: source.get_nullable("email")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Person,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_primitive("name", &value.name)?;
            sink.put_primitive("age", &value.age)?;
            sink.put_nullable("email", value.email.as_ref())
        })
    }
}

struct PointCodec;

impl Codec for PointCodec {
    type Value = Point;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Point, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Point {
                x: source.get_primitive("x")?,
                y: source.get_primitive("y")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Point,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_primitive("x", &value.x)?;
            sink.put_primitive("y", &value.y)
        })
    }
}

struct LabelCodec;

impl Codec for LabelCodec {
    type Value = Label;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Label, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Label {
                text: source.get_primitive("text")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Label,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| sink.put_primitive("text", &value.text))
    }
}

struct DrawingCodec;

impl Codec for DrawingCodec {
    type Value = Drawing;

    fn read(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Drawing, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Drawing {
                mark: source.get_nested(resolver, "mark", &mark())?,
                marks: source.get_nested(resolver, "marks", &T::list(mark()))?,
            })
        })
    }

    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Drawing,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_nested(resolver, "mark", &mark(), &value.mark)?;
            sink.put_nested(resolver, "marks", &T::list(mark()), &value.marks)
        })
    }
}

fn person() -> TypeDescriptor {
    T::record("Person")
}

fn point() -> TypeDescriptor {
    T::record("Point")
}

fn mark() -> TypeDescriptor {
    T::open("Mark")
}

fn drawing() -> TypeDescriptor {
    T::record("Drawing")
}

fn sketch() -> TypeDescriptor {
    T::new(BaseType::open("Sketch"), [mark()])
}

fn registry() -> Registry {
    let marks = FamilyCodec::new(BaseType::open("Mark"))
        .member(
            BaseType::record("Point"),
            |mark| match mark {
                Mark::Point(point) => Some(point),
                _ => None,
            },
            Mark::Point,
        )
        .member(
            BaseType::record("Label"),
            |mark| match mark {
                Mark::Label(label) => Some(label),
                _ => None,
            },
            Mark::Label,
        );
    let sketches = FamilyCodec::new(BaseType::open("Sketch")).member(
        BaseType::named("List"),
        |sketch| match sketch {
            Sketch::Marks(marks) => Some(marks),
        },
        Sketch::Marks,
    );
    let records = Module::builder()
        .codec(person(), PersonCodec)
        .codec(point(), PointCodec)
        .codec(T::record("Label"), LabelCodec)
        .codec(mark(), marks)
        .codec(drawing(), DrawingCodec)
        .codec(sketch(), sketches)
        .list::<Mark>(mark())
        .pair::<i32, String>(T::int(), T::string())
        .pair::<Point, Vec<i64>>(point(), T::list(T::long()))
        .triple::<char, (), bool>(T::char(), T::unit(), T::boolean())
        .build();
    Registry::builder()
        .provider(std_module())
        .provider(records)
        .build()
}

fn ada() -> Person {
    Person {
        name: "Ada".to_owned(),
        age: 36,
        email: Some("ada@example.org".to_owned()),
    }
}

#[test]
fn pair_of_int_and_string() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());
    let text = to_string(&registry, &ty, &(120, "Hello".to_owned())).unwrap();
    assert_eq!(text, r#"{"first":120,"second":"Hello"}"#);

    let back: (i32, String) = from_str(&registry, &ty, &text).unwrap();
    assert_eq!(back, (120, "Hello".to_owned()));
}

#[test]
fn fields_may_arrive_in_any_order() {
    let registry = registry();
    let text = r#"{"email": "ada@example.org", "age": 36, "name": "Ada"}"#;
    let back: Person = from_str(&registry, &person(), text).unwrap();
    assert_eq!(back, ada());

    let written = to_string(&registry, &person(), &ada()).unwrap();
    assert_eq!(written, r#"{"name":"Ada","age":36,"email":"ada@example.org"}"#);
}

#[test]
fn null_optionals() {
    let registry = registry();
    let mut expected = ada();
    expected.email = None;

    let written = to_string(&registry, &person(), &expected).unwrap();
    assert_eq!(written, r#"{"name":"Ada","age":36,"email":null}"#);

    let back: Person = from_str(&registry, &person(), &written).unwrap();
    assert_eq!(back, expected);
    let back: Person =
        from_str(&registry, &person(), r#"{"email": null, "age": 36, "name": "Ada"}"#).unwrap();
    assert_eq!(back, expected);
}

#[test]
fn absent_optional_is_a_missing_field() {
    let registry = registry();
    let error = from_str::<Person>(&registry, &person(), r#"{"age": 36, "name": "Ada"}"#)
        .unwrap_err();
    assert_eq!(error.code(), "weft::missing_field");
    assert!(error.to_string().contains("email"), "{error}");
}

#[test]
fn missing_required_field() {
    let registry = registry();
    let error = from_str::<Person>(&registry, &person(), r#"{"name": "Ada"}"#).unwrap_err();
    assert_eq!(error.code(), "weft::missing_field");
    assert!(error.to_string().contains("age"), "{error}");
}

#[test]
fn open_fields_are_wrapped_in_their_type() {
    let registry = registry();
    let value = Drawing {
        mark: Mark::Point(Point { x: 1, y: 2 }),
        marks: vec![
            Mark::Label(Label {
                text: "hi".to_owned(),
            }),
            Mark::Point(Point { x: 3, y: 4 }),
        ],
    };

    let text = to_string_with(&registry, &drawing(), &value, &JsonOptions::new().pretty()).unwrap();
    insta::assert_snapshot!(text, @r#"
    {
      "mark": {
        "Point": {
          "x": 1,
          "y": 2
        }
      },
      "marks": [
        {
          "Label": {
            "text": "hi"
          }
        },
        {
          "Point": {
            "x": 3,
            "y": 4
          }
        }
      ]
    }
    "#);

    let back: Drawing = from_str(&registry, &drawing(), &text).unwrap();
    assert_eq!(back, value);
}

#[test]
fn top_level_open_value() {
    let registry = registry();
    let value = Mark::Label(Label {
        text: "top".to_owned(),
    });
    let text = to_string(&registry, &mark(), &value).unwrap();
    assert_eq!(text, r#"{"Label":{"text":"top"}}"#);

    let back: Mark = from_str(&registry, &mark(), &text).unwrap();
    assert_eq!(back, value);
}

#[test]
fn open_arguments_of_a_wrapped_type_stay_open() {
    let registry = registry();
    let value = Sketch::Marks(vec![
        Mark::Point(Point { x: 1, y: 2 }),
        Mark::Label(Label {
            text: "hi".to_owned(),
        }),
    ]);
    let text = to_string(&registry, &sketch(), &value).unwrap();
    assert_eq!(
        text,
        r#"{"List<Mark>":[{"Point":{"x":1,"y":2}},{"Label":{"text":"hi"}}]}"#
    );

    let back: Sketch = from_str(&registry, &sketch(), &text).unwrap();
    assert_eq!(back, value);
}

#[test]
fn terminal_fields_are_not_wrapped() {
    let registry = registry();
    let ty = T::pair(point(), T::list(T::long()));
    let value = (Point { x: 1, y: 2 }, vec![5_i64, 6]);
    let text = to_string(&registry, &ty, &value).unwrap();
    assert_eq!(text, r#"{"first":{"x":1,"y":2},"second":[5,6]}"#);

    let back: (Point, Vec<i64>) = from_str(&registry, &ty, &text).unwrap();
    assert_eq!(back, value);
}

#[test]
fn nullable_elements_are_json_null() {
    let registry = registry();
    let ty = T::list(T::int().nullable());
    let value = vec![Some(1), None, Some(3)];
    let text = to_string(&registry, &ty, &value).unwrap();
    assert_eq!(text, "[1,null,3]");

    let back: Vec<Option<i32>> = from_str(&registry, &ty, &text).unwrap();
    assert_eq!(back, value);
}

#[test]
fn chars_units_and_booleans() {
    let registry = registry();
    let ty = T::triple(T::char(), T::unit(), T::boolean());
    let text = to_string(&registry, &ty, &('c', (), true)).unwrap();
    assert_eq!(text, r#"{"first":"c","second":null,"third":true}"#);

    let back: (char, (), bool) = from_str(&registry, &ty, &text).unwrap();
    assert_eq!(back, ('c', (), true));
}

#[test]
fn custom_indentation() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());
    let options = JsonOptions::new().indent("\t");
    let text = to_string_with(&registry, &ty, &(1, "a".to_owned()), &options).unwrap();
    assert_eq!(text, "{\n\t\"first\": 1,\n\t\"second\": \"a\"\n}");
}

#[test]
fn floats_must_be_finite() {
    let registry = registry();
    assert_eq!(to_string(&registry, &T::double(), &1.5_f64).unwrap(), "1.5");
    let error = to_string(&registry, &T::double(), &f64::NAN).unwrap_err();
    assert_eq!(error.code(), "weft::backend");
}

#[test]
fn malformed_and_mistyped_input() {
    let registry = registry();
    let ty = T::pair(T::int(), T::string());

    let error = from_str::<(i32, String)>(&registry, &ty, r#"{"first": 1,"#).unwrap_err();
    assert_eq!(error.code(), "weft::backend");

    let error =
        from_str::<(i32, String)>(&registry, &ty, r#"{"first": "1", "second": "a"}"#).unwrap_err();
    assert_eq!(error.code(), "weft::protocol");

    let error = from_str::<i8>(&registry, &T::byte(), "300").unwrap_err();
    assert_eq!(error.code(), "weft::backend");
}
