//! Field metadata and the typed accessors behind it.

// -----------------------------------------------------------------------------
// Modules

mod access;
mod nested;
mod primitive;

pub(crate) use access::{FieldAccess, FieldRead, FieldWrite, ParentProjection, Projection};
pub(crate) use access::{NestedAccess, PrimitiveAccess, ProjectedAccess, WriteError};

pub use nested::{Element, ElementMismatch, Nested, NestedValue, NestedView};
pub use primitive::Primitive;

// -----------------------------------------------------------------------------
// Exports

use alloc::sync::Arc;
use core::fmt;

use crate::registry::{Schema, SchemaType, Slot};

/// What a field's values are, as far as the codec cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Passed through unchanged.
    Primitive,
    /// Recursively serialized, viewed as the given type.
    Schema(SchemaType),
    /// Any variant of the given union base, wrapped with its tag.
    Poly(SchemaType),
    /// A record with no declared element schema type.
    Opaque,
}

impl ElementType {
    /// The type members are viewed as, for `Schema` and `Poly`.
    #[inline]
    pub const fn schema_type(self) -> Option<SchemaType> {
        match self {
            ElementType::Schema(ty) | ElementType::Poly(ty) => Some(ty),
            ElementType::Primitive | ElementType::Opaque => None,
        }
    }
}

/// Whether a field holds one value, a sequence or a string-keyed mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar,
    Sequence,
    Mapping,
}

/// Metadata of one declared field.
///
/// Built by [`FieldMeta::primitive`] or [`FieldMeta::nested`], usually
/// through [`TypeDecl`](crate::registry::TypeDecl).
#[derive(Clone)]
pub struct FieldMeta {
    slot: Slot,
    name: &'static str,
    owner: SchemaType,
    element: ElementType,
    shape: FieldShape,
    access: Arc<dyn FieldAccess>,
}

impl FieldMeta {
    /// A field of type `F` on `T` that maps to the wire directly.
    pub fn primitive<T, F, G, M>(slot: Slot, name: &'static str, get: G, get_mut: M) -> Self
    where
        T: Schema,
        F: Primitive,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        Self {
            slot,
            name,
            owner: SchemaType::of::<T>(),
            element: ElementType::Primitive,
            shape: FieldShape::Scalar,
            access: Arc::new(PrimitiveAccess::<T, F, G, M>::new(get, get_mut)),
        }
    }

    /// A field of type `N` on `T` holding records.
    pub fn nested<T, N, G, M>(slot: Slot, name: &'static str, get: G, get_mut: M) -> Self
    where
        T: Schema,
        N: Nested,
        G: Fn(&T) -> &N + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut N + Send + Sync + 'static,
    {
        Self {
            slot,
            name,
            owner: SchemaType::of::<T>(),
            element: N::element(),
            shape: N::SHAPE,
            access: Arc::new(NestedAccess::<T, N, G, M>::new(get, get_mut)),
        }
    }

    /// The same field, reached through a child type's parent projection.
    pub(crate) fn projected(&self, projection: Arc<dyn Projection>) -> Self {
        Self {
            access: Arc::new(ProjectedAccess {
                projection,
                inner: self.access.clone(),
            }),
            ..self.clone()
        }
    }

    #[inline(always)]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Rust field name.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type that declared this field.
    #[inline(always)]
    pub fn owner(&self) -> SchemaType {
        self.owner
    }

    #[inline(always)]
    pub fn element(&self) -> ElementType {
        self.element
    }

    #[inline(always)]
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// A sequence or mapping whose members are schema records.
    pub fn is_collection_element_schema(&self) -> bool {
        self.shape != FieldShape::Scalar && self.element.schema_type().is_some()
    }

    #[inline]
    pub(crate) fn access(&self) -> &dyn FieldAccess {
        &*self.access
    }
}

impl fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("slot", &self.slot)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("element", &self.element)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
