use alloc::borrow::ToOwned;
use alloc::vec::Vec;

use crate::PackError;
use crate::field::{FieldMeta, FieldRead, NestedView};
use crate::record::{Poly, RecordRef};
use crate::registry::{Schema, SchemaEntry, SchemaRegistry, SchemaType, Slot, SlotKind};
use crate::union;
use crate::wire::Wire;

// -----------------------------------------------------------------------------
// Serialize

impl SchemaRegistry {
    /// Serializes a type-erased record, optionally viewed as `view`.
    ///
    /// When `view` is a union base, the result is wrapped with the tag of
    /// the record's concrete type. `None` becomes [`Wire::Nil`].
    pub fn serialize_record(
        &self,
        record: Option<RecordRef<'_>>,
        view: Option<SchemaType>,
    ) -> Result<Wire, PackError> {
        match record {
            Some(record) => self.write_record(record, view, 0),
            None => Ok(Wire::Nil),
        }
    }

    /// Serializes `value` as its own type.
    #[inline]
    pub fn serialize<T: Schema>(&self, value: &T) -> Result<Wire, PackError> {
        self.write_record(RecordRef::of(value), None, 0)
    }

    /// Serializes `value` viewed as `B`, adding the union tag if `B` is a
    /// union base.
    #[inline]
    pub fn serialize_as<B: Schema, T: Schema>(&self, value: &T) -> Result<Wire, PackError> {
        self.write_record(RecordRef::of(value), Some(SchemaType::of::<B>()), 0)
    }

    #[inline]
    pub fn serialize_poly<B: Schema>(&self, value: &Poly<B>) -> Result<Wire, PackError> {
        self.write_record(value.as_dyn().as_record(), Some(Poly::<B>::base()), 0)
    }

    fn write_record(
        &self,
        record: RecordRef<'_>,
        view: Option<SchemaType>,
        depth: usize,
    ) -> Result<Wire, PackError> {
        if depth >= self.max_depth() {
            return Err(PackError::DepthLimitExceeded {
                limit: self.max_depth(),
            });
        }

        let concrete = record.schema_type();
        let entry = self.entry(concrete)?;

        // A listed variant needs no fields of its own.
        if let Some(view) = view
            && let Some(union) = self.union_of(view)?
        {
            let tag = union
                .tag_of(concrete)
                .ok_or(PackError::MissingUnionKey {
                    base: view.name(),
                    concrete: concrete.name(),
                })?;
            let inner = self.write_fields(&entry, record, tag.kind(), depth)?;
            return Ok(union::wrap(tag, inner));
        }

        if !self.has_schema(&entry) {
            return Err(PackError::NotSchemaType {
                ty: concrete.name(),
            });
        }
        self.write_fields(&entry, record, SlotKind::Positional, depth)
    }

    /// `fallback` is the shape of a record without fields.
    fn write_fields(
        &self,
        entry: &SchemaEntry,
        record: RecordRef<'_>,
        fallback: SlotKind,
        depth: usize,
    ) -> Result<Wire, PackError> {
        let fields = entry.fields();

        match fields.kind().unwrap_or(fallback) {
            SlotKind::Positional => {
                let mut items = Vec::new();
                for field in fields {
                    let value = self.write_field(entry, field, record, depth)?;
                    if value.is_nil() {
                        continue;
                    }
                    if let Slot::Index(index) = field.slot() {
                        let at = index as usize;
                        if items.len() <= at {
                            items.resize(at + 1, Wire::Nil);
                        }
                        items[at] = value;
                    }
                }
                Ok(Wire::Seq(items))
            }
            SlotKind::Keyed => {
                let mut entries = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self.write_field(entry, field, record, depth)?;
                    if value.is_nil() {
                        continue;
                    }
                    if let Slot::Key(key) = field.slot() {
                        entries.push((key.to_owned(), value));
                    }
                }
                Ok(Wire::Map(entries))
            }
        }
    }

    fn write_field(
        &self,
        entry: &SchemaEntry,
        field: &FieldMeta,
        record: RecordRef<'_>,
        depth: usize,
    ) -> Result<Wire, PackError> {
        let read = field
            .access()
            .read(record.as_any())
            .ok_or(PackError::TypeMismatch {
                expected: field.owner().name(),
                found: record.schema_type().name(),
            })?;

        let view = match read {
            FieldRead::Primitive(wire) => return Ok(wire),
            FieldRead::Nested(view) => view,
        };

        let element = field.element().schema_type();
        let one = |member: Option<RecordRef<'_>>| match (member, element) {
            (None, _) => Ok(Wire::Nil),
            (Some(member), Some(element)) => self.write_record(member, Some(element), depth + 1),
            (Some(member), None) => Err(PackError::UnannotatedObjectField {
                ty: entry.schema_type().name(),
                field: field.name(),
                value: member.schema_type().name(),
            }),
        };

        match view {
            NestedView::Absent => Ok(Wire::Nil),
            NestedView::One(member) => one(Some(member)),
            NestedView::Seq(members) => members
                .into_iter()
                .map(one)
                .collect::<Result<_, PackError>>()
                .map(Wire::Seq),
            NestedView::Map(members) => members
                .into_iter()
                .map(|(key, member)| Ok((key.to_owned(), one(member)?)))
                .collect::<Result<_, PackError>>()
                .map(Wire::Map),
        }
    }
}
