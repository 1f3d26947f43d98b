//! A directory of raw-encoded records with a point-lookup index.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::hash::Hash;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tracing::debug;
use weft_core::{
    CodecError, Module, Primitive, Resolver, ResolverExt, Source, SourceExt, Then, TypeDescriptor,
};
use weft_std::{ModuleBuilderExt, PrimitiveCodec};

use crate::indexed::{IndexedRawSink, Span};
use crate::{RawOptions, RawSink, RawSource};

const MAX_TRANSFER: u64 = 8192;

const DATA: &str = "data";
const INDEX: &str = "index";
const UPDATE: &str = "update";

struct Cached<K> {
    stamp: SystemTime,
    index: HashMap<K, Span>,
}

/// Records of type `T` stored in `dir/data`, indexed by their field
/// `key_label` of type `K` in `dir/index`.
///
/// The data file is a raw `List<item>`; the index file a raw
/// `List<Triple<K, Long, Long>>` of key, start and end offset, ordered by
/// start. `item` must describe a record or an open type.
///
/// The index is read lazily and kept until either file is modified.
pub struct IndexedStore<T, K> {
    dir: PathBuf,
    item: TypeDescriptor,
    key_label: String,
    resolver: Then<Module, Arc<dyn Resolver>>,
    options: RawOptions,
    cache: Mutex<Option<Cached<K>>>,
    _items: PhantomData<fn() -> T>,
}

impl<T, K> IndexedStore<T, K>
where
    T: Send + 'static,
    K: Primitive + Eq + Hash + Clone,
{
    /// A store in `dir`. Records are resolved through `resolver`.
    pub fn new(
        dir: impl Into<PathBuf>,
        item: TypeDescriptor,
        key_label: impl Into<String>,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        let key = K::descriptor();
        let long = TypeDescriptor::long();
        let entry = TypeDescriptor::triple(key.clone(), long.clone(), long.clone());
        let module = Module::builder()
            .codec(key.clone(), PrimitiveCodec::<K>::new())
            .codec(long.clone(), PrimitiveCodec::<i64>::new())
            .triple::<K, i64, i64>(key, long.clone(), long)
            .list::<(K, i64, i64)>(entry)
            .list::<T>(item.clone())
            .build();
        Self {
            dir: dir.into(),
            item,
            key_label: key_label.into(),
            resolver: module.then(resolver),
            options: RawOptions::default(),
            cache: Mutex::new(None),
            _items: PhantomData,
        }
    }

    /// Sets the raw options used for both files.
    pub fn with_options(mut self, options: RawOptions) -> Self {
        self.options = options;
        self
    }

    /// The directory holding the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn list_type(&self) -> TypeDescriptor {
        TypeDescriptor::list(self.item.clone())
    }

    fn index_type() -> TypeDescriptor {
        let long = TypeDescriptor::long();
        TypeDescriptor::list(TypeDescriptor::triple(K::descriptor(), long.clone(), long))
    }

    fn stamp(&self) -> io::Result<SystemTime> {
        let data = fs::metadata(self.path(DATA))?.modified()?;
        let index = fs::metadata(self.path(INDEX))?.modified()?;
        Ok(data.max(index))
    }

    /// True if both files exist.
    pub fn exists(&self) -> bool {
        self.path(DATA).is_file() && self.path(INDEX).is_file()
    }

    /// Replaces the content of the store with `items`.
    #[allow(clippy::ptr_arg)]
    pub fn save(&self, items: &Vec<T>) -> Result<(), CodecError> {
        fs::create_dir_all(&self.dir)?;

        let data = BufWriter::new(File::create(self.path(DATA))?);
        let mut sink = IndexedRawSink::<_, K>::new(data, self.key_label.clone(), self.options);
        weft_core::write(&self.resolver, &self.list_type(), &mut sink, items)?;
        let entries: Vec<(K, Span)> = sink
            .entries()
            .map(|(key, span)| (key.clone(), span.clone()))
            .collect();
        sink.finish()?;

        self.write_index(&entries)?;
        debug!(dir = %self.dir.display(), count = entries.len(), "saved store");
        self.remember(entries.into_iter().collect())
    }

    /// Every record, in stored order.
    pub fn load(&self) -> Result<Vec<T>, CodecError> {
        let data = BufReader::new(File::open(self.path(DATA))?);
        let mut source = RawSource::with_options(data, self.options);
        weft_core::read(&self.resolver, &self.list_type(), &mut source)
    }

    /// The record stored under `key`, decoded on its own.
    pub fn find(&self, key: &K) -> Result<Option<T>, CodecError> {
        let Some(span) = self.with_index(|index| index.get(key).cloned())? else {
            return Ok(None);
        };
        let mut data = File::open(self.path(DATA))?;
        data.seek(SeekFrom::Start(span.start))?;
        let mut source = RawSource::with_options(
            BufReader::new(data.take(span.end - span.start)),
            self.options,
        );
        let source: &mut dyn Source = &mut source;
        source
            .get_nested::<T>(&self.resolver, "item", &self.item)
            .map(Some)
    }

    /// Key to byte range of every stored record.
    pub fn indices(&self) -> Result<HashMap<K, Span>, CodecError> {
        self.with_index(HashMap::clone)
    }

    /// Removes the records stored under `keys` and returns the keys that were
    /// present. Records before the first removed one keep their offsets.
    pub fn remove(&self, keys: &[K]) -> Result<Vec<K>, CodecError> {
        let index = self.indices()?;
        let mut seen = HashSet::new();
        let removed: Vec<K> = keys
            .iter()
            .filter(|key| index.contains_key(*key) && seen.insert(*key))
            .cloned()
            .collect();
        if removed.is_empty() {
            return Ok(removed);
        }

        let mut spans: Vec<Span> = removed.iter().map(|key| index[key].clone()).collect();
        spans.sort_by_key(|span| span.start);

        let size = fs::metadata(self.path(DATA))?.len();
        let mut kept = Vec::with_capacity(spans.len() + 1);
        let mut at = 0;
        for span in &spans {
            kept.push(at..span.start);
            at = span.end;
        }
        kept.push(at..size);
        let longest = kept.iter().map(|run| run.end - run.start).max().unwrap_or(0);
        let mut buffer = vec![0; longest.clamp(1, MAX_TRANSFER) as usize];

        {
            let mut data = BufReader::new(File::open(self.path(DATA))?);
            let mut update = BufWriter::new(File::create(self.path(UPDATE))?);
            for run in &kept {
                if run.is_empty() {
                    continue;
                }
                data.seek(SeekFrom::Start(run.start))?;
                transfer(&mut data, &mut update, &mut buffer, run.end - run.start)?;
            }
            update.flush()?;
            update.get_ref().sync_all()?;
        }
        fs::rename(self.path(UPDATE), self.path(DATA))?;

        let mut ordered: Vec<(K, Span)> = index.into_iter().collect();
        ordered.sort_by_key(|(_, span)| span.start);
        let mut shift = 0;
        let mut entries = Vec::with_capacity(ordered.len() - removed.len());
        for (key, span) in ordered {
            if seen.contains(&key) {
                shift += span.end - span.start;
            } else {
                entries.push((key, span.start - shift..span.end - shift));
            }
        }

        self.write_index(&entries)?;
        debug!(
            dir = %self.dir.display(),
            removed = removed.len(),
            kept = entries.len(),
            "removed records"
        );
        self.remember(entries.into_iter().collect())?;
        Ok(removed)
    }

    /// Deletes both files, and the directory if nothing else is left in it.
    pub fn delete(&self) -> Result<(), CodecError> {
        for name in [DATA, INDEX, UPDATE] {
            match fs::remove_file(self.path(name)) {
                Err(error) if error.kind() != io::ErrorKind::NotFound => return Err(error.into()),
                _ => {}
            }
        }
        *self.cache.lock() = None;
        match fs::read_dir(&self.dir) {
            Ok(mut entries) => {
                if entries.next().is_none() {
                    fs::remove_dir(&self.dir)?;
                }
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn with_index<R>(&self, f: impl FnOnce(&HashMap<K, Span>) -> R) -> Result<R, CodecError> {
        let stamp = self.stamp()?;
        let mut cache = self.cache.lock();
        let cached = match cache.take() {
            Some(cached) if cached.stamp >= stamp => cache.insert(cached),
            _ => {
                debug!(dir = %self.dir.display(), "reading index");
                cache.insert(Cached {
                    stamp,
                    index: self.read_index()?,
                })
            }
        };
        Ok(f(&cached.index))
    }

    fn remember(&self, index: HashMap<K, Span>) -> Result<(), CodecError> {
        let stamp = self.stamp()?;
        *self.cache.lock() = Some(Cached { stamp, index });
        Ok(())
    }

    fn read_index(&self) -> Result<HashMap<K, Span>, CodecError> {
        let file = BufReader::new(File::open(self.path(INDEX))?);
        let mut source = RawSource::with_options(file, self.options);
        let entries: Vec<(K, i64, i64)> =
            weft_core::read(&self.resolver, &Self::index_type(), &mut source)?;
        entries
            .into_iter()
            .map(|(key, start, end)| Ok((key, offset(start)?..offset(end)?)))
            .collect()
    }

    fn write_index(&self, entries: &[(K, Span)]) -> Result<(), CodecError> {
        let mut sorted: Vec<(K, i64, i64)> = entries
            .iter()
            .map(|(key, span)| Ok((key.clone(), long(span.start)?, long(span.end)?)))
            .collect::<Result<_, CodecError>>()?;
        sorted.sort_by_key(|(_, start, _)| *start);

        let file = BufWriter::new(File::create(self.path(INDEX))?);
        let mut sink = RawSink::with_options(file, self.options);
        weft_core::write(&self.resolver, &Self::index_type(), &mut sink, &sorted)?;
        sink.into_inner()?;
        Ok(())
    }
}

fn offset(value: i64) -> Result<u64, CodecError> {
    u64::try_from(value)
        .map_err(|_| CodecError::backend(format!("negative offset {value} in index")))
}

fn long(value: u64) -> Result<i64, CodecError> {
    i64::try_from(value).map_err(|_| CodecError::backend(format!("offset {value} exceeds Long")))
}

fn transfer(
    reader: &mut impl Read,
    writer: &mut impl Write,
    buffer: &mut [u8],
    mut remaining: u64,
) -> io::Result<()> {
    while remaining > 0 {
        let chunk = remaining.min(buffer.len() as u64) as usize;
        reader.read_exact(&mut buffer[..chunk])?;
        writer.write_all(&buffer[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

impl<T, K> core::fmt::Debug for IndexedStore<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IndexedStore")
            .field("dir", &self.dir)
            .field("item", &self.item)
            .field("key_label", &self.key_label)
            .finish_non_exhaustive()
    }
}
