use alloc::sync::Arc;
use core::any::Any;
use core::marker::PhantomData;

use super::nested::{ElementMismatch, Nested, NestedValue, NestedView};
use super::primitive::Primitive;
use crate::WireTypeError;
use crate::wire::Wire;

// -----------------------------------------------------------------------------
// FieldAccess

pub(crate) enum FieldRead<'a> {
    Primitive(Wire),
    Nested(NestedView<'a>),
}

pub(crate) enum FieldWrite {
    Primitive(Wire),
    Nested(NestedValue),
}

#[derive(Debug)]
pub(crate) enum WriteError {
    /// The record is not of the field's owner type.
    Owner,
    /// A nested value was written to a primitive field or the reverse.
    Kind,
    Wire(WireTypeError),
    Element(ElementMismatch),
}

/// Type-erased getter/setter pair of one field.
pub(crate) trait FieldAccess: Send + Sync {
    /// Returns `None` when `record` is not of the owner type.
    fn read<'a>(&self, record: &'a dyn Any) -> Option<FieldRead<'a>>;

    fn write(&self, record: &mut dyn Any, value: FieldWrite) -> Result<(), WriteError>;
}

// -----------------------------------------------------------------------------
// PrimitiveAccess

pub(crate) struct PrimitiveAccess<T, F, G, M> {
    get: G,
    get_mut: M,
    _marker: PhantomData<fn(&T) -> &F>,
}

impl<T, F, G, M> PrimitiveAccess<T, F, G, M> {
    #[inline]
    pub(crate) const fn new(get: G, get_mut: M) -> Self {
        Self {
            get,
            get_mut,
            _marker: PhantomData,
        }
    }
}

impl<T, F, G, M> FieldAccess for PrimitiveAccess<T, F, G, M>
where
    T: 'static,
    F: Primitive,
    G: Fn(&T) -> &F + Send + Sync,
    M: Fn(&mut T) -> &mut F + Send + Sync,
{
    fn read<'a>(&self, record: &'a dyn Any) -> Option<FieldRead<'a>> {
        let this = record.downcast_ref::<T>()?;
        Some(FieldRead::Primitive((self.get)(this).to_wire()))
    }

    fn write(&self, record: &mut dyn Any, value: FieldWrite) -> Result<(), WriteError> {
        let this = record.downcast_mut::<T>().ok_or(WriteError::Owner)?;
        let FieldWrite::Primitive(wire) = value else {
            return Err(WriteError::Kind);
        };
        *(self.get_mut)(this) = F::from_wire(wire).map_err(WriteError::Wire)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// NestedAccess

pub(crate) struct NestedAccess<T, N, G, M> {
    get: G,
    get_mut: M,
    _marker: PhantomData<fn(&T) -> &N>,
}

impl<T, N, G, M> NestedAccess<T, N, G, M> {
    #[inline]
    pub(crate) const fn new(get: G, get_mut: M) -> Self {
        Self {
            get,
            get_mut,
            _marker: PhantomData,
        }
    }
}

impl<T, N, G, M> FieldAccess for NestedAccess<T, N, G, M>
where
    T: 'static,
    N: Nested,
    G: Fn(&T) -> &N + Send + Sync,
    M: Fn(&mut T) -> &mut N + Send + Sync,
{
    fn read<'a>(&self, record: &'a dyn Any) -> Option<FieldRead<'a>> {
        let this = record.downcast_ref::<T>()?;
        Some(FieldRead::Nested((self.get)(this).view()))
    }

    fn write(&self, record: &mut dyn Any, value: FieldWrite) -> Result<(), WriteError> {
        let this = record.downcast_mut::<T>().ok_or(WriteError::Owner)?;
        let FieldWrite::Nested(value) = value else {
            return Err(WriteError::Kind);
        };
        *(self.get_mut)(this) = N::rebuild(value).map_err(WriteError::Element)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Projection

/// Reaches the embedded parent of a record.
pub(crate) trait Projection: Send + Sync {
    fn project<'a>(&self, record: &'a dyn Any) -> Option<&'a dyn Any>;

    fn project_mut<'a>(&self, record: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

pub(crate) struct ParentProjection<T, P, G, M> {
    get: G,
    get_mut: M,
    _marker: PhantomData<fn(&T) -> &P>,
}

impl<T, P, G, M> ParentProjection<T, P, G, M> {
    #[inline]
    pub(crate) const fn new(get: G, get_mut: M) -> Self {
        Self {
            get,
            get_mut,
            _marker: PhantomData,
        }
    }
}

impl<T, P, G, M> Projection for ParentProjection<T, P, G, M>
where
    T: 'static,
    P: 'static,
    G: Fn(&T) -> &P + Send + Sync,
    M: Fn(&mut T) -> &mut P + Send + Sync,
{
    fn project<'a>(&self, record: &'a dyn Any) -> Option<&'a dyn Any> {
        let this = record.downcast_ref::<T>()?;
        Some((self.get)(this) as &dyn Any)
    }

    fn project_mut<'a>(&self, record: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let this = record.downcast_mut::<T>()?;
        Some((self.get_mut)(this) as &mut dyn Any)
    }
}

/// Accesses an inherited field through the child's parent projection.
pub(crate) struct ProjectedAccess {
    pub(crate) projection: Arc<dyn Projection>,
    pub(crate) inner: Arc<dyn FieldAccess>,
}

impl FieldAccess for ProjectedAccess {
    fn read<'a>(&self, record: &'a dyn Any) -> Option<FieldRead<'a>> {
        self.inner.read(self.projection.project(record)?)
    }

    fn write(&self, record: &mut dyn Any, value: FieldWrite) -> Result<(), WriteError> {
        let parent = self
            .projection
            .project_mut(record)
            .ok_or(WriteError::Owner)?;
        self.inner.write(parent, value)
    }
}
