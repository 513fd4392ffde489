use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::field::{ElementType, FieldMeta, FieldShape, FieldWrite, NestedValue, WriteError};
use crate::record::{DynRecord, Poly};
use crate::registry::{Ident, Schema, SchemaEntry, SchemaRegistry, SchemaType, SlotKind};
use crate::union;
use crate::wire::Wire;
use crate::{Diagnostic, PackError, WireTypeError};

// -----------------------------------------------------------------------------
// Deserialize

impl SchemaRegistry {
    /// Deserializes `wire` as `ty`, or as one of its variants if `ty` is a
    /// union base. [`Wire::Nil`] and unknown variants give `None`.
    pub fn deserialize_record(&self, wire: &Wire, ty: SchemaType) -> Result<Option<DynRecord>, PackError> {
        Reader::new(self).read(wire, ty, 0)
    }

    /// Deserializes a `T`.
    ///
    /// Fails with [`PackError::TypeMismatch`] if the data picks a variant
    /// other than `T`; use [`deserialize_poly`](Self::deserialize_poly) to
    /// accept any variant.
    #[inline]
    pub fn deserialize<T: Schema>(&self, wire: &Wire) -> Result<Option<T>, PackError> {
        Ok(self.deserialize_with_report::<T>(wire)?.0)
    }

    /// Like [`deserialize`](Self::deserialize), also returning what was
    /// skipped along the way.
    pub fn deserialize_with_report<T: Schema>(
        &self,
        wire: &Wire,
    ) -> Result<(Option<T>, Vec<Diagnostic>), PackError> {
        let mut reader = Reader::new(self);
        let value = reader
            .read(wire, SchemaType::of::<T>(), 0)?
            .map(|record| {
                record.downcast::<T>().map_err(|record| PackError::TypeMismatch {
                    expected: type_name::<T>(),
                    found: record.schema_type().name(),
                })
            })
            .transpose()?;
        Ok((value, reader.diagnostics))
    }

    /// Deserializes a value of the union `B`, keeping its concrete type.
    pub fn deserialize_poly<B: Schema>(&self, wire: &Wire) -> Result<Option<Poly<B>>, PackError> {
        Ok(self.deserialize_poly_with_report::<B>(wire)?.0)
    }

    pub fn deserialize_poly_with_report<B: Schema>(
        &self,
        wire: &Wire,
    ) -> Result<(Option<Poly<B>>, Vec<Diagnostic>), PackError> {
        let mut reader = Reader::new(self);
        let value = reader.read(wire, Poly::<B>::base(), 0)?.map(Poly::from_dyn);
        Ok((value, reader.diagnostics))
    }
}

// -----------------------------------------------------------------------------
// Reader

struct Reader<'r> {
    registry: &'r SchemaRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> Reader<'r> {
    #[inline]
    fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            diagnostics: Vec::new(),
        }
    }

    fn read(&mut self, wire: &Wire, ty: SchemaType, depth: usize) -> Result<Option<DynRecord>, PackError> {
        if wire.is_nil() {
            return Ok(None);
        }
        if depth >= self.registry.max_depth() {
            return Err(PackError::DepthLimitExceeded {
                limit: self.registry.max_depth(),
            });
        }

        let entry = self.registry.entry(ty)?;
        let Some(union) = entry.union() else {
            if !self.registry.has_schema(&entry) {
                return Err(PackError::NotSchemaType { ty: ty.name() });
            }
            return self.instantiate(&entry, wire, depth).map(Some);
        };

        let (tag, inner) = union::split(ty, wire)?;
        let Some(variant) = tag.ident().and_then(|ident| union.resolve(ident)) else {
            log::warn!("skipping unknown variant {tag} of union `{}`", ty.name());
            self.diagnostics.push(Diagnostic::UnknownVariant {
                base: ty.name(),
                tag: tag.to_string(),
            });
            return Ok(None);
        };

        let entry = self.registry.entry(variant)?;
        self.instantiate(&entry, inner, depth).map(Some)
    }

    /// Default-constructs the entry's type and fills in the slots present
    /// in `wire`.
    fn instantiate(&mut self, entry: &SchemaEntry, wire: &Wire, depth: usize) -> Result<DynRecord, PackError> {
        let ty = entry.schema_type();
        let fields = entry.fields();
        let mut record = DynRecord::from_parts(ty, ty.construct());

        match (wire, fields.kind()) {
            (Wire::Nil, _) => {}
            (Wire::Seq(items), None | Some(SlotKind::Positional)) => {
                for (index, item) in items.iter().enumerate() {
                    if item.is_nil() {
                        continue;
                    }
                    let field = u32::try_from(index)
                        .ok()
                        .and_then(|index| fields.find(Ident::Index(index)));
                    match field {
                        Some(field) => self.assign(entry, field, record.as_any_mut(), item, depth)?,
                        None => self.unknown_slot(ty, index.to_string()),
                    }
                }
            }
            (Wire::Map(entries), None | Some(SlotKind::Keyed)) => {
                for (key, item) in entries {
                    if item.is_nil() {
                        continue;
                    }
                    match fields.find(Ident::Key(key)) {
                        Some(field) => self.assign(entry, field, record.as_any_mut(), item, depth)?,
                        None => self.unknown_slot(ty, format!("{key:?}")),
                    }
                }
            }
            (other, kind) => {
                return Err(PackError::MalformedRecord {
                    ty: ty.name(),
                    expected: kind.unwrap_or(SlotKind::Positional).name(),
                    found: other.kind(),
                });
            }
        }

        Ok(record)
    }

    fn unknown_slot(&mut self, ty: SchemaType, slot: String) {
        log::debug!("ignoring unknown slot {slot} of `{}`", ty.name());
        self.diagnostics.push(Diagnostic::UnknownSlot { ty: ty.name(), slot });
    }

    fn assign(
        &mut self,
        entry: &SchemaEntry,
        field: &FieldMeta,
        target: &mut dyn Any,
        wire: &Wire,
        depth: usize,
    ) -> Result<(), PackError> {
        let ty = entry.schema_type().name();

        let value = match field.element() {
            ElementType::Primitive => FieldWrite::Primitive(wire.clone()),
            ElementType::Opaque => {
                return Err(PackError::UnannotatedObjectField {
                    ty,
                    field: field.name(),
                    value: wire.kind(),
                });
            }
            ElementType::Schema(element) | ElementType::Poly(element) => {
                match self.read_nested(entry, field, element, wire, depth)? {
                    Some(value) => FieldWrite::Nested(value),
                    None => return Ok(()),
                }
            }
        };

        field.access().write(target, value).map_err(|err| match err {
            WriteError::Wire(source) => PackError::FieldType {
                ty,
                field: field.name(),
                source,
            },
            WriteError::Element(mismatch) => PackError::TypeMismatch {
                expected: field
                    .element()
                    .schema_type()
                    .map_or(field.name(), |element| element.name()),
                found: mismatch.found,
            },
            WriteError::Owner | WriteError::Kind => PackError::TypeMismatch {
                expected: field.owner().name(),
                found: ty,
            },
        })
    }

    /// `None` when a scalar member resolved to nothing.
    fn read_nested(
        &mut self,
        entry: &SchemaEntry,
        field: &FieldMeta,
        element: SchemaType,
        wire: &Wire,
        depth: usize,
    ) -> Result<Option<NestedValue>, PackError> {
        let mismatch = |expected: &'static str| PackError::FieldType {
            ty: entry.schema_type().name(),
            field: field.name(),
            source: WireTypeError::new(expected, wire.kind()),
        };

        match field.shape() {
            FieldShape::Scalar => Ok(self.read(wire, element, depth + 1)?.map(NestedValue::One)),
            FieldShape::Sequence => {
                let items = wire.as_seq().ok_or_else(|| mismatch("sequence"))?;
                let members = items
                    .iter()
                    .map(|item| self.read(item, element, depth + 1))
                    .collect::<Result<_, _>>()?;
                Ok(Some(NestedValue::Seq(members)))
            }
            FieldShape::Mapping => {
                let entries = wire.as_map().ok_or_else(|| mismatch("map"))?;
                let members = entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.read(item, element, depth + 1)?)))
                    .collect::<Result<_, PackError>>()?;
                Ok(Some(NestedValue::Map(members)))
            }
        }
    }
}
