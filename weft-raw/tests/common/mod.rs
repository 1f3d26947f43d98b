#![allow(dead_code)]

use weft_core::{
    BaseType, Codec, CodecError, FamilyCodec, Module, Registry, Resolver, Sink, SinkExt, Source,
    SourceExt, TypeDescriptor as T, TypeDescriptor,
};
use weft_std::{ModuleBuilderExt, std_module};

#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: i32,
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Entry(Entry),
    Note(Note),
}

/// An open container of items; its only member is a plain list.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    Items(Vec<Item>),
}

pub fn owner() -> TypeDescriptor {
    T::record("Owner")
}

pub fn entry() -> TypeDescriptor {
    T::record("Entry")
}

pub fn batch() -> TypeDescriptor {
    T::new(BaseType::open("Batch"), [item()])
}

pub fn note() -> TypeDescriptor {
    T::record("Note")
}

pub fn item() -> TypeDescriptor {
    T::open("Item")
}

pub fn entry_named(id: i32, name: &str) -> Entry {
    Entry {
        id,
        name: name.to_owned(),
        owner: Owner { id: 1000 + id },
    }
}

struct OwnerCodec;

impl Codec for OwnerCodec {
    type Value = Owner;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Owner, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Owner {
                id: source.get_primitive("id")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Owner,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| sink.put_primitive("id", &value.id))
    }
}

struct EntryCodec;

impl Codec for EntryCodec {
    type Value = Entry;

    fn read(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Entry, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Entry {
                id: source.get_primitive("id")?,
                name: source.get_primitive("name")?,
                owner: source.get_nested(resolver, "owner", &owner())?,
            })
        })
    }

    fn write(
        &self,
        resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Entry,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_primitive("id", &value.id)?;
            sink.put_primitive("name", &value.name)?;
            sink.put_nested(resolver, "owner", &owner(), &value.owner)
        })
    }
}

struct NoteCodec;

impl Codec for NoteCodec {
    type Value = Note;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        source: &mut dyn Source,
    ) -> Result<Note, CodecError> {
        source.mark_around(ty, |source| {
            Ok(Note {
                id: source.get_primitive("id")?,
                text: source.get_primitive("text")?,
            })
        })
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        ty: &TypeDescriptor,
        sink: &mut dyn Sink,
        value: &Note,
    ) -> Result<(), CodecError> {
        sink.mark_around(ty, |sink| {
            sink.put_primitive("id", &value.id)?;
            sink.put_primitive("text", &value.text)
        })
    }
}

pub fn registry() -> Registry {
    let items = FamilyCodec::new(BaseType::open("Item"))
        .member(
            BaseType::record("Entry"),
            |item| match item {
                Item::Entry(entry) => Some(entry),
                _ => None,
            },
            Item::Entry,
        )
        .member(
            BaseType::record("Note"),
            |item| match item {
                Item::Note(note) => Some(note),
                _ => None,
            },
            Item::Note,
        );
    let batches = FamilyCodec::new(BaseType::open("Batch")).member(
        BaseType::named("List"),
        |batch| match batch {
            Batch::Items(items) => Some(items),
        },
        Batch::Items,
    );
    let records = Module::builder()
        .codec(owner(), OwnerCodec)
        .codec(entry(), EntryCodec)
        .codec(note(), NoteCodec)
        .codec(item(), items)
        .codec(batch(), batches)
        .list::<Entry>(entry())
        .list::<Item>(item())
        .pair::<i32, String>(T::int(), T::string())
        .build();
    Registry::builder()
        .provider(std_module())
        .provider(records)
        .build()
}
