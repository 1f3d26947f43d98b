//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is the explicit, constructible stand-in for a runtime
//! type: a [`BaseType`], a nullability flag and an ordered list of type
//! arguments. Every read and write names the descriptor it works against; codecs
//! never reflect over Rust types.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::CodecError;

/// Scalar kinds that have a dedicated accessor pair on [`Sink`](crate::Sink)
/// and [`Source`](crate::Source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PrimitiveCode {
    /// `bool`
    Boolean = 0,
    /// `i8`
    Byte = 1,
    /// `i16`
    Short = 2,
    /// `i32`
    Int = 3,
    /// `i64`
    Long = 4,
    /// `f32`
    Float = 5,
    /// `f64`
    Double = 6,
    /// `char`, carried as one 16-bit code unit by positional binary backends
    Char = 7,
    /// `()`
    Unit = 8,
    /// `String`
    String = 9,
}

impl PrimitiveCode {
    /// Every primitive code, in tag order.
    pub const ALL: [PrimitiveCode; 10] = [
        PrimitiveCode::Boolean,
        PrimitiveCode::Byte,
        PrimitiveCode::Short,
        PrimitiveCode::Int,
        PrimitiveCode::Long,
        PrimitiveCode::Float,
        PrimitiveCode::Double,
        PrimitiveCode::Char,
        PrimitiveCode::Unit,
        PrimitiveCode::String,
    ];

    /// The name used in textual descriptors.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveCode::Boolean => "Boolean",
            PrimitiveCode::Byte => "Byte",
            PrimitiveCode::Short => "Short",
            PrimitiveCode::Int => "Int",
            PrimitiveCode::Long => "Long",
            PrimitiveCode::Float => "Float",
            PrimitiveCode::Double => "Double",
            PrimitiveCode::Char => "Char",
            PrimitiveCode::Unit => "Unit",
            PrimitiveCode::String => "String",
        }
    }

    /// Looks up a primitive by its textual name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.name() == name)
    }
}

/// How a base type takes part in dispatch and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// One of the fixed scalar kinds.
    Primitive(PrimitiveCode),
    /// Built-in list-like or set-like container; encoded as an open-ended block.
    Collection,
    /// Built-in pair or triple.
    Tuple,
    /// A record whose runtime values are always exactly this type.
    Record,
    /// A record, trait or interface whose runtime values may be more specific
    /// types. Fields of an open type carry a type tag.
    Open,
}

/// Built-in collection names.
pub const COLLECTION_NAMES: [&str; 6] = [
    "List",
    "MutableList",
    "Deque",
    "Set",
    "MutableSet",
    "SortedSet",
];

/// Built-in tuple names.
pub const TUPLE_NAMES: [&str; 2] = ["Pair", "Triple"];

/// The identity of a type: a name plus its [`Kind`].
///
/// Equality and hashing look at the name only, so a base parsed back from a
/// type tag compares equal to the base that was registered under that name.
#[derive(Clone)]
pub struct BaseType {
    name: Arc<str>,
    kind: Kind,
}

impl BaseType {
    /// Creates a base type with an explicit kind.
    pub fn new(name: impl Into<Arc<str>>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A terminal record type.
    pub fn record(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, Kind::Record)
    }

    /// An open type whose fields are dispatched on the runtime value.
    pub fn open(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, Kind::Open)
    }

    /// The base type of a primitive.
    pub fn primitive(code: PrimitiveCode) -> Self {
        Self::new(code.name(), Kind::Primitive(code))
    }

    /// Classifies a bare name: built-in primitives, collections and tuples get
    /// their kind, anything else is taken to be a terminal record.
    pub fn named(name: &str) -> Self {
        let kind = if let Some(code) = PrimitiveCode::from_name(name) {
            Kind::Primitive(code)
        } else if COLLECTION_NAMES.contains(&name) {
            Kind::Collection
        } else if TUPLE_NAMES.contains(&name) {
            Kind::Tuple
        } else {
            Kind::Record
        };
        Self::new(name, kind)
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind attached at construction.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// True for [`Kind::Open`].
    pub fn is_open(&self) -> bool {
        self.kind == Kind::Open
    }
}

impl PartialEq for BaseType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for BaseType {}

impl Hash for BaseType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseType")
            .field(&self.name)
            .field(&self.kind)
            .finish()
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An immutable description of a runtime type.
///
/// Two descriptors are equal when their bases, nullability and arguments are
/// recursively equal. Cloning is cheap: arguments are shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    base: BaseType,
    nullable: bool,
    args: Arc<[TypeDescriptor]>,
}

impl TypeDescriptor {
    /// Creates a non-nullable descriptor.
    pub fn new(base: BaseType, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self {
            base,
            nullable: false,
            args: args.into_iter().collect(),
        }
    }

    /// A descriptor without type arguments.
    pub fn simple(base: BaseType) -> Self {
        Self::new(base, [])
    }

    /// A primitive descriptor.
    pub fn primitive(code: PrimitiveCode) -> Self {
        Self::simple(BaseType::primitive(code))
    }

    /// `Boolean`
    pub fn boolean() -> Self {
        Self::primitive(PrimitiveCode::Boolean)
    }

    /// `Byte`
    pub fn byte() -> Self {
        Self::primitive(PrimitiveCode::Byte)
    }

    /// `Short`
    pub fn short() -> Self {
        Self::primitive(PrimitiveCode::Short)
    }

    /// `Int`
    pub fn int() -> Self {
        Self::primitive(PrimitiveCode::Int)
    }

    /// `Long`
    pub fn long() -> Self {
        Self::primitive(PrimitiveCode::Long)
    }

    /// `Float`
    pub fn float() -> Self {
        Self::primitive(PrimitiveCode::Float)
    }

    /// `Double`
    pub fn double() -> Self {
        Self::primitive(PrimitiveCode::Double)
    }

    /// `Char`
    pub fn char() -> Self {
        Self::primitive(PrimitiveCode::Char)
    }

    /// `Unit`
    pub fn unit() -> Self {
        Self::primitive(PrimitiveCode::Unit)
    }

    /// `String`
    pub fn string() -> Self {
        Self::primitive(PrimitiveCode::String)
    }

    /// A terminal record without type arguments.
    pub fn record(name: impl Into<Arc<str>>) -> Self {
        Self::simple(BaseType::record(name))
    }

    /// An open type without type arguments.
    pub fn open(name: impl Into<Arc<str>>) -> Self {
        Self::simple(BaseType::open(name))
    }

    /// `List<element>`
    pub fn list(element: TypeDescriptor) -> Self {
        Self::new(BaseType::new("List", Kind::Collection), [element])
    }

    /// `Set<element>`
    pub fn set(element: TypeDescriptor) -> Self {
        Self::new(BaseType::new("Set", Kind::Collection), [element])
    }

    /// `Pair<first, second>`
    pub fn pair(first: TypeDescriptor, second: TypeDescriptor) -> Self {
        Self::new(BaseType::new("Pair", Kind::Tuple), [first, second])
    }

    /// `Triple<first, second, third>`
    pub fn triple(first: TypeDescriptor, second: TypeDescriptor, third: TypeDescriptor) -> Self {
        Self::new(BaseType::new("Triple", Kind::Tuple), [first, second, third])
    }

    /// Parses the printable form `Name<Arg1, Arg2>?`.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        crate::parse::parse_descriptor(text)
    }

    /// The base type.
    pub fn base(&self) -> &BaseType {
        &self.base
    }

    /// The base type's name.
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// True if the descriptor admits an absent value.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The type arguments in declaration order.
    pub fn args(&self) -> &[TypeDescriptor] {
        &self.args
    }

    /// False when a runtime value may be a more specific type than this
    /// descriptor names, in which case writes carry a type tag.
    pub fn is_terminal(&self) -> bool {
        !self.base.is_open()
    }

    /// The primitive code of the base, independent of nullability.
    pub fn primitive_code(&self) -> Option<PrimitiveCode> {
        match self.base.kind() {
            Kind::Primitive(code) => Some(code),
            _ => None,
        }
    }

    /// True for built-in collections.
    pub fn is_collection(&self) -> bool {
        self.base.kind() == Kind::Collection
    }

    /// The argument at `index`.
    pub fn arg(&self, index: usize) -> Result<&TypeDescriptor, CodecError> {
        self.args.get(index).ok_or_else(|| CodecError::Arity {
            descriptor: self.clone(),
            expected: index + 1,
            found: self.args.len(),
        })
    }

    /// Fails unless the descriptor has exactly `expected` arguments.
    pub fn expect_arity(&self, expected: usize) -> Result<(), CodecError> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(CodecError::Arity {
                descriptor: self.clone(),
                expected,
                found: self.args.len(),
            })
        }
    }

    /// The single argument of a one-argument descriptor.
    pub fn element(&self) -> Result<&TypeDescriptor, CodecError> {
        self.expect_arity(1)?;
        self.arg(0)
    }

    /// The first argument of a two-argument descriptor.
    pub fn key(&self) -> Result<&TypeDescriptor, CodecError> {
        self.expect_arity(2)?;
        self.arg(0)
    }

    /// The second argument of a two-argument descriptor.
    pub fn value(&self) -> Result<&TypeDescriptor, CodecError> {
        self.expect_arity(2)?;
        self.arg(1)
    }

    /// The same descriptor with the given nullability.
    pub fn with_nullable(&self, nullable: bool) -> Self {
        Self {
            base: self.base.clone(),
            nullable,
            args: self.args.clone(),
        }
    }

    /// Shorthand for `with_nullable(true)`.
    pub fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// Replaces every occurrence of `old` in the tree with `new`.
    pub fn substitute_base(&self, old: &BaseType, new: &BaseType) -> Self {
        let base = if self.base == *old {
            new.clone()
        } else {
            self.base.clone()
        };
        Self {
            base,
            nullable: self.nullable,
            args: self
                .args
                .iter()
                .map(|arg| arg.substitute_base(old, new))
                .collect(),
        }
    }

    /// The descriptor of a value whose runtime type is `runtime`: the base is
    /// replaced, nullability and arguments are kept.
    pub fn for_instance(&self, runtime: &BaseType) -> Self {
        Self {
            base: runtime.clone(),
            nullable: self.nullable,
            args: self.args.clone(),
        }
    }

    /// Takes base kinds from `known` wherever a name matches at the same
    /// position. Descriptors parsed from a type tag only know the kinds of
    /// built-in names; the static descriptor knows which arguments are open.
    pub fn align_with(&self, known: &TypeDescriptor) -> Self {
        let base = if self.base == known.base {
            known.base.clone()
        } else {
            self.base.clone()
        };
        let args = if self.args.len() == known.args.len() {
            self.args
                .iter()
                .zip(known.args.iter())
                .map(|(arg, known)| arg.align_with(known))
                .collect()
        } else {
            self.args.clone()
        };
        Self {
            base,
            nullable: self.nullable,
            args,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.name())?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({self})")
    }
}

impl core::str::FromStr for TypeDescriptor {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
