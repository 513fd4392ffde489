use alloc::sync::Arc;
use std::sync::OnceLock;

use crate::SchemaError;
use crate::registry::decl::DeclParts;
use crate::registry::{FieldTable, SchemaType, SlotKind, UnionTable};

// -----------------------------------------------------------------------------
// SchemaEntry

/// The registered schema of one type.
///
/// Immutable once built. `fields` is the effective table: the parent's
/// fields, projected into this type, overridden and extended by the type's
/// own fields.
pub struct SchemaEntry {
    ty: SchemaType,
    own: FieldTable,
    parent: Option<SchemaType>,
    fields: Arc<FieldTable>,
    union: Option<Arc<UnionTable>>,
    pub(super) validated: OnceLock<Result<(), SchemaError>>,
}

impl SchemaEntry {
    /// `parent` must be the entry of the type `parts` extends, if any.
    pub(super) fn build(parts: DeclParts, parent: Option<&SchemaEntry>) -> Result<Self, SchemaError> {
        let DeclParts {
            ty,
            fields: own,
            parent: link,
            union,
        } = parts;

        let mut fields = FieldTable::new();
        if let (Some(link), Some(parent)) = (&link, parent) {
            for field in parent.fields() {
                fields.upsert(ty.name(), field.projected(link.projection.clone()))?;
            }
        }
        for field in &own {
            fields.upsert(ty.name(), field.clone())?;
        }
        fields.sort_positional();

        Ok(Self {
            ty,
            own,
            parent: link.map(|link| link.ty),
            fields: Arc::new(fields),
            union: (!union.is_empty()).then(|| Arc::new(union)),
            validated: OnceLock::new(),
        })
    }

    #[inline(always)]
    pub fn schema_type(&self) -> SchemaType {
        self.ty
    }

    /// Fields declared directly on this type, in declaration order.
    #[inline]
    pub fn own_fields(&self) -> &FieldTable {
        &self.own
    }

    #[inline]
    pub fn parent(&self) -> Option<SchemaType> {
        self.parent
    }

    /// Effective fields, ordered by index for positional types and by
    /// declaration for keyed ones.
    #[inline]
    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    #[inline]
    pub(crate) fn fields_arc(&self) -> Arc<FieldTable> {
        self.fields.clone()
    }

    /// The union table, if this type is a union base.
    #[inline]
    pub fn union(&self) -> Option<&UnionTable> {
        self.union.as_deref()
    }

    #[inline]
    pub(crate) fn union_arc(&self) -> Option<Arc<UnionTable>> {
        self.union.clone()
    }

    #[inline]
    pub fn kind(&self) -> Option<SlotKind> {
        self.fields.kind()
    }

    /// Has at least one field or one union variant.
    ///
    /// Union membership is declared on the base, so it is tracked by the
    /// registry instead, see
    /// [`SchemaRegistry::is_schema_type`](crate::SchemaRegistry::is_schema_type).
    #[inline]
    pub fn is_schema_type(&self) -> bool {
        !self.fields.is_empty() || self.union.is_some()
    }
}

impl core::fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("ty", &self.ty)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("union", &self.union)
            .finish_non_exhaustive()
    }
}
