use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use std::collections::HashMap;

use super::{ElementType, FieldShape};
use crate::record::{DynRecord, Poly, RecordRef};
use crate::registry::{Schema, SchemaType};

// -----------------------------------------------------------------------------
// Element

/// A value that can sit in a nested field: a schema type, a [`Poly`]
/// view of a union, or an unannotated [`DynRecord`].
pub trait Element: Sized + Send + Sync + 'static {
    /// Element type recorded in the field metadata.
    fn element() -> ElementType;

    fn record(&self) -> RecordRef<'_>;

    /// Returns the record back when it does not fit `Self`.
    fn from_dyn(record: DynRecord) -> Result<Self, DynRecord>;
}

impl<T: Schema> Element for T {
    #[inline]
    fn element() -> ElementType {
        ElementType::Schema(SchemaType::of::<T>())
    }

    #[inline]
    fn record(&self) -> RecordRef<'_> {
        RecordRef::of(self)
    }

    #[inline]
    fn from_dyn(record: DynRecord) -> Result<Self, DynRecord> {
        record.downcast()
    }
}

impl<B: Schema> Element for Poly<B> {
    #[inline]
    fn element() -> ElementType {
        ElementType::Poly(SchemaType::of::<B>())
    }

    #[inline]
    fn record(&self) -> RecordRef<'_> {
        self.as_dyn().as_record()
    }

    #[inline]
    fn from_dyn(record: DynRecord) -> Result<Self, DynRecord> {
        Ok(Poly::from_dyn(record))
    }
}

impl Element for DynRecord {
    #[inline]
    fn element() -> ElementType {
        ElementType::Opaque
    }

    #[inline]
    fn record(&self) -> RecordRef<'_> {
        self.as_record()
    }

    #[inline]
    fn from_dyn(record: DynRecord) -> Result<Self, DynRecord> {
        Ok(record)
    }
}

// -----------------------------------------------------------------------------
// NestedView & NestedValue

/// Borrowed records read out of a nested field.
#[derive(Debug)]
pub enum NestedView<'a> {
    Absent,
    One(RecordRef<'a>),
    Seq(Vec<Option<RecordRef<'a>>>),
    Map(Vec<(&'a str, Option<RecordRef<'a>>)>),
}

/// Decoded records to be stored into a nested field.
#[derive(Debug)]
pub enum NestedValue {
    One(DynRecord),
    Seq(Vec<Option<DynRecord>>),
    Map(Vec<(String, Option<DynRecord>)>),
}

/// A decoded record did not fit the field's element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMismatch {
    pub found: &'static str,
}

impl ElementMismatch {
    fn of(record: &DynRecord) -> Self {
        Self {
            found: record.schema_type().name(),
        }
    }

    const SHAPE: Self = Self { found: "collection" };
}

fn rebuild_one<E: Element>(record: Option<DynRecord>) -> Result<Option<E>, ElementMismatch> {
    record
        .map(|r| E::from_dyn(r).map_err(|r| ElementMismatch::of(&r)))
        .transpose()
}

// -----------------------------------------------------------------------------
// Nested

/// The declared type of a nested field.
///
/// Absent members are kept as `None`, both in sequences and mappings, so the
/// member types are always `Option<E>`.
pub trait Nested: Sized + Send + Sync + 'static {
    const SHAPE: FieldShape;

    fn element() -> ElementType;

    fn view(&self) -> NestedView<'_>;

    fn rebuild(value: NestedValue) -> Result<Self, ElementMismatch>;
}

impl<E: Element> Nested for Option<E> {
    const SHAPE: FieldShape = FieldShape::Scalar;

    #[inline]
    fn element() -> ElementType {
        E::element()
    }

    fn view(&self) -> NestedView<'_> {
        match self {
            Some(value) => NestedView::One(value.record()),
            None => NestedView::Absent,
        }
    }

    fn rebuild(value: NestedValue) -> Result<Self, ElementMismatch> {
        match value {
            NestedValue::One(record) => rebuild_one(Some(record)),
            _ => Err(ElementMismatch::SHAPE),
        }
    }
}

impl<E: Element> Nested for Vec<Option<E>> {
    const SHAPE: FieldShape = FieldShape::Sequence;

    #[inline]
    fn element() -> ElementType {
        E::element()
    }

    fn view(&self) -> NestedView<'_> {
        NestedView::Seq(
            self.iter()
                .map(|item| item.as_ref().map(E::record))
                .collect(),
        )
    }

    fn rebuild(value: NestedValue) -> Result<Self, ElementMismatch> {
        match value {
            NestedValue::Seq(items) => items.into_iter().map(rebuild_one).collect(),
            _ => Err(ElementMismatch::SHAPE),
        }
    }
}

impl<E: Element> Nested for BTreeMap<String, Option<E>> {
    const SHAPE: FieldShape = FieldShape::Mapping;

    #[inline]
    fn element() -> ElementType {
        E::element()
    }

    fn view(&self) -> NestedView<'_> {
        NestedView::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v.as_ref().map(E::record)))
                .collect(),
        )
    }

    fn rebuild(value: NestedValue) -> Result<Self, ElementMismatch> {
        match value {
            NestedValue::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, rebuild_one(v)?)))
                .collect(),
            _ => Err(ElementMismatch::SHAPE),
        }
    }
}

impl<E, S> Nested for HashMap<String, Option<E>, S>
where
    E: Element,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    const SHAPE: FieldShape = FieldShape::Mapping;

    #[inline]
    fn element() -> ElementType {
        E::element()
    }

    fn view(&self) -> NestedView<'_> {
        NestedView::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v.as_ref().map(E::record)))
                .collect(),
        )
    }

    fn rebuild(value: NestedValue) -> Result<Self, ElementMismatch> {
        match value {
            NestedValue::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, rebuild_one(v)?)))
                .collect(),
            _ => Err(ElementMismatch::SHAPE),
        }
    }
}
