use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;

use crate::SchemaError;
use crate::field::{FieldMeta, Nested, ParentProjection, Primitive, Projection};
use crate::registry::{FieldTable, IntoSlot, IntoTag, Schema, SchemaType, Slot, Tag, UnionTable};

// -----------------------------------------------------------------------------
// DeclParts

pub(crate) struct ParentLink {
    pub ty: SchemaType,
    pub projection: Arc<dyn Projection>,
}

/// Everything one call to [`Schema::declare`] produced.
pub(crate) struct DeclParts {
    pub ty: SchemaType,
    pub fields: FieldTable,
    pub parent: Option<ParentLink>,
    pub union: UnionTable,
}

// -----------------------------------------------------------------------------
// TypeDecl

/// Collects the schema of `T` inside [`Schema::declare`].
///
/// Every method checks what it can locally and returns `&mut Self`, so
/// declarations chain with `?`. Checks that need other types, such as
/// element types or tag kinds against inherited slots, run when the type is
/// first used through a [`SchemaRegistry`](crate::registry::SchemaRegistry).
pub struct TypeDecl<T> {
    fields: FieldTable,
    parent: Option<ParentLink>,
    union: UnionTable,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Schema> TypeDecl<T> {
    fn new() -> Self {
        Self {
            fields: FieldTable::new(),
            parent: None,
            union: UnionTable::new(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn collect() -> Result<DeclParts, SchemaError> {
        let mut decl = Self::new();
        T::declare(&mut decl)?;
        Ok(DeclParts {
            ty: SchemaType::of::<T>(),
            fields: decl.fields,
            parent: decl.parent,
            union: decl.union,
        })
    }

    /// The type being declared.
    #[inline]
    pub fn schema_type(&self) -> SchemaType {
        SchemaType::of::<T>()
    }

    fn slot(slot: impl IntoSlot) -> Result<Slot, SchemaError> {
        slot.into_slot().map_err(|value| SchemaError::InvalidSlot {
            ty: SchemaType::of::<T>().name(),
            value,
        })
    }

    /// Adds a field built by hand.
    ///
    /// Fails if the slot is already declared on `T` itself, if its kind
    /// differs from the other slots of `T`, or if `meta` belongs to
    /// another type. Inherited slots may be redeclared to override them.
    pub fn register_field(&mut self, meta: FieldMeta) -> Result<&mut Self, SchemaError> {
        let ty = SchemaType::of::<T>();
        if meta.owner() != ty {
            return Err(SchemaError::ForeignField {
                ty: ty.name(),
                owner: meta.owner().name(),
                field: meta.name(),
            });
        }
        self.fields.insert(ty.name(), meta)?;
        Ok(self)
    }

    /// Declares a field whose value maps to the wire directly.
    pub fn field<F, G, M>(
        &mut self,
        slot: impl IntoSlot,
        name: &'static str,
        get: G,
        get_mut: M,
    ) -> Result<&mut Self, SchemaError>
    where
        F: Primitive,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let slot = Self::slot(slot)?;
        self.register_field(FieldMeta::primitive::<T, F, G, M>(slot, name, get, get_mut))
    }

    /// Declares a field holding records, or a sequence or mapping of them.
    pub fn nested<N, G, M>(
        &mut self,
        slot: impl IntoSlot,
        name: &'static str,
        get: G,
        get_mut: M,
    ) -> Result<&mut Self, SchemaError>
    where
        N: Nested,
        G: Fn(&T) -> &N + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut N + Send + Sync + 'static,
    {
        let slot = Self::slot(slot)?;
        self.register_field(FieldMeta::nested::<T, N, G, M>(slot, name, get, get_mut))
    }

    /// Declares `P` as the parent of `T`, embedded in `T` and reached
    /// through `get`/`get_mut`. The effective fields of `T` start from those
    /// of `P`.
    pub fn extends<P, G, M>(&mut self, get: G, get_mut: M) -> Result<&mut Self, SchemaError>
    where
        P: Schema,
        G: Fn(&T) -> &P + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        if let Some(existing) = &self.parent {
            return Err(SchemaError::DuplicateParent {
                ty: SchemaType::of::<T>().name(),
                parent: existing.ty.name(),
            });
        }
        self.parent = Some(ParentLink {
            ty: SchemaType::of::<P>(),
            projection: Arc::new(ParentProjection::<T, P, G, M>::new(get, get_mut)),
        });
        Ok(self)
    }

    /// Binds `tag` to `variant` in the union `T` is the base of.
    pub fn register_union(&mut self, tag: Tag, variant: SchemaType) -> Result<&mut Self, SchemaError> {
        self.union
            .insert(SchemaType::of::<T>().name(), tag, variant)?;
        Ok(self)
    }

    /// Typed form of [`register_union`](Self::register_union).
    pub fn variant<C: Schema>(&mut self, tag: impl IntoTag) -> Result<&mut Self, SchemaError> {
        let tag = tag.into_tag().map_err(|value| SchemaError::InvalidTag {
            base: SchemaType::of::<T>().name(),
            value,
        })?;
        self.register_union(tag, SchemaType::of::<C>())
    }
}

impl<T> fmt::Debug for TypeDecl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDecl")
            .field("fields", &self.fields)
            .field("parent", &self.parent.as_ref().map(|link| link.ty))
            .field("union", &self.union)
            .finish_non_exhaustive()
    }
}
