//! Codecs for open bases: a value type with several concrete members, each
//! handled by the codec registered for its own base.

use core::any::Any;

use tracing::trace;

use crate::codec::{AnyValue, Codec};
use crate::descriptor::{BaseType, TypeDescriptor};
use crate::error::CodecError;
use crate::protocol::{Sink, Source};
use crate::resolver::Resolver;

/// One member of a family, seen from the family's value type `V`.
pub trait MemberOps<V>: Send + Sync {
    /// Base of the member; written as the type tag.
    fn base(&self) -> &BaseType;

    /// The member payload of `value`, if `value` is this member.
    fn view<'a>(&self, value: &'a V) -> Option<&'a dyn Any>;

    /// Converts a decoded member payload back into `V`.
    fn adopt(&self, concrete: AnyValue) -> Result<V, AnyValue>;
}

/// A [`MemberOps`] built from a projection and an injection.
pub struct Member<V, M> {
    base: BaseType,
    view: fn(&V) -> Option<&M>,
    upcast: fn(M) -> V,
}

impl<V, M> Member<V, M> {
    /// Describes member `M` of `V`.
    pub fn new(base: BaseType, view: fn(&V) -> Option<&M>, upcast: fn(M) -> V) -> Self {
        Self { base, view, upcast }
    }
}

impl<V, M> MemberOps<V> for Member<V, M>
where
    V: 'static,
    M: Send + 'static,
{
    fn base(&self) -> &BaseType {
        &self.base
    }

    fn view<'a>(&self, value: &'a V) -> Option<&'a dyn Any> {
        (self.view)(value).map(|member| member as &dyn Any)
    }

    fn adopt(&self, concrete: AnyValue) -> Result<V, AnyValue> {
        concrete
            .downcast::<M>()
            .map(|member| (self.upcast)(*member))
    }
}

/// Codec of an open base whose values are always one of its members.
///
/// Writing dispatches on the member a value holds; the family itself has no
/// body, so reading it without a type tag fails.
pub struct FamilyCodec<V> {
    base: BaseType,
    members: Vec<Box<dyn MemberOps<V>>>,
}

impl<V: Send + 'static> FamilyCodec<V> {
    /// An empty family for `base`.
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            members: Vec::new(),
        }
    }

    /// Adds member `M`, written with the codec registered for `base`.
    pub fn member<M: Send + 'static>(
        mut self,
        base: BaseType,
        view: fn(&V) -> Option<&M>,
        upcast: fn(M) -> V,
    ) -> Self {
        self.members.push(Box::new(Member::new(base, view, upcast)));
        self
    }

    /// Adds a hand-written member.
    pub fn with(mut self, member: impl MemberOps<V> + 'static) -> Self {
        self.members.push(Box::new(member));
        self
    }

    fn no_body(&self) -> CodecError {
        CodecError::backend(format!(
            "open type `{}` has no body of its own; expected one of its members",
            self.base
        ))
    }
}

impl<V: Send + 'static> Codec for FamilyCodec<V> {
    type Value = V;

    fn read(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        _source: &mut dyn Source,
    ) -> Result<V, CodecError> {
        Err(self.no_body())
    }

    fn write(
        &self,
        _resolver: &dyn Resolver,
        _ty: &TypeDescriptor,
        _sink: &mut dyn Sink,
        _value: &V,
    ) -> Result<(), CodecError> {
        Err(self.no_body())
    }

    fn runtime_type(&self, value: &V) -> Option<BaseType> {
        self.members
            .iter()
            .find(|member| member.view(value).is_some())
            .map(|member| member.base().clone())
    }

    fn concrete<'a>(&self, value: &'a V) -> &'a dyn Any {
        self.members
            .iter()
            .find_map(|member| member.view(value))
            .unwrap_or(value as &dyn Any)
    }

    fn adopt(&self, concrete: AnyValue) -> Result<V, AnyValue> {
        let mut concrete = match concrete.downcast::<V>() {
            Ok(value) => return Ok(*value),
            Err(concrete) => concrete,
        };
        for member in &self.members {
            match member.adopt(concrete) {
                Ok(value) => {
                    trace!(family = %self.base, member = %member.base(), "adopted");
                    return Ok(value);
                }
                Err(rejected) => concrete = rejected,
            }
        }
        Err(concrete)
    }
}
