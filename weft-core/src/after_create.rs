use core::any::Any;
use core::marker::PhantomData;

use crate::descriptor::TypeDescriptor;
use crate::error::CodecError;
use crate::protocol::{Nested, Source};

/// A source that calls `hook` with every freshly created `T` before it is
/// populated, then forwards the notification to the wrapped source.
///
/// Instances of other types pass through untouched.
pub struct OnAfterCreate<S, T, F> {
    source: S,
    hook: F,
    _instance: PhantomData<fn(&mut T)>,
}

impl<S, T, F> OnAfterCreate<S, T, F>
where
    S: Source,
    T: 'static,
    F: FnMut(&TypeDescriptor, &mut T),
{
    /// Wraps `source`.
    pub fn new(source: S, hook: F) -> Self {
        Self {
            source,
            hook,
            _instance: PhantomData,
        }
    }

    /// Unwraps the inner source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S, T, F> Source for OnAfterCreate<S, T, F>
where
    S: Source,
    T: 'static,
    F: FnMut(&TypeDescriptor, &mut T),
{
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.source.begin(ty)
    }

    fn is_end(&mut self) -> Result<bool, CodecError> {
        self.source.is_end()
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.source.end(ty)
    }

    fn begin_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<Nested, CodecError> {
        self.source.begin_nested(label, ty)
    }

    fn end_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.source.end_nested(label, ty)
    }

    fn is_null(&mut self, label: &str) -> Result<bool, CodecError> {
        self.source.is_null(label)
    }

    fn get_bool(&mut self, label: &str) -> Result<bool, CodecError> {
        self.source.get_bool(label)
    }

    fn get_i8(&mut self, label: &str) -> Result<i8, CodecError> {
        self.source.get_i8(label)
    }

    fn get_i16(&mut self, label: &str) -> Result<i16, CodecError> {
        self.source.get_i16(label)
    }

    fn get_i32(&mut self, label: &str) -> Result<i32, CodecError> {
        self.source.get_i32(label)
    }

    fn get_i64(&mut self, label: &str) -> Result<i64, CodecError> {
        self.source.get_i64(label)
    }

    fn get_f32(&mut self, label: &str) -> Result<f32, CodecError> {
        self.source.get_f32(label)
    }

    fn get_f64(&mut self, label: &str) -> Result<f64, CodecError> {
        self.source.get_f64(label)
    }

    fn get_char(&mut self, label: &str) -> Result<char, CodecError> {
        self.source.get_char(label)
    }

    fn get_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.source.get_unit(label)
    }

    fn get_string(&mut self, label: &str) -> Result<String, CodecError> {
        self.source.get_string(label)
    }

    fn after_create(
        &mut self,
        ty: &TypeDescriptor,
        instance: &mut dyn Any,
    ) -> Result<(), CodecError> {
        if let Some(instance) = instance.downcast_mut::<T>() {
            (self.hook)(ty, instance);
        }
        self.source.after_create(ty, instance)
    }

    fn continue_requested(&self) -> bool {
        self.source.continue_requested()
    }
}

/// Adaptors available on every sized [`Source`].
pub trait SourceAdaptors: Source + Sized {
    /// Wraps this source in an [`OnAfterCreate`] that calls `hook` for every
    /// freshly created `T`.
    fn on_after_create<T, F>(self, hook: F) -> OnAfterCreate<Self, T, F>
    where
        T: 'static,
        F: FnMut(&TypeDescriptor, &mut T),
    {
        OnAfterCreate::new(self, hook)
    }
}

impl<S: Source> SourceAdaptors for S {}
