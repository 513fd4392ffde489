use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::registry::{Slot, SlotKind, Tag};

// -----------------------------------------------------------------------------
// SchemaError

/// A mistake in a schema declaration.
///
/// These are programming errors: they are reported when a type is first
/// registered (or first used) and never tolerated, since the resulting wire
/// shape would be corrupt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("slot {value} of type `{ty}` is negative")]
    InvalidSlot { ty: &'static str, value: i64 },

    #[error("tag {value} of union `{base}` is negative")]
    InvalidTag { base: &'static str, value: i64 },

    #[error("slot {index} of type `{ty}` is above the largest index {max}")]
    SlotTooLarge { ty: &'static str, index: u32, max: u32 },

    #[error("slot {slot} is already in use on type `{ty}`")]
    DuplicateSlot { ty: &'static str, slot: Slot },

    #[error("tag {tag} of union `{base}` is already bound to `{existing}`, cannot bind `{variant}`")]
    DuplicateTag {
        base: &'static str,
        tag: Tag,
        existing: &'static str,
        variant: &'static str,
    },

    #[error("`{variant}` is already a variant of union `{base}` under tag {existing}, cannot rebind it to {tag}")]
    DuplicateVariant {
        base: &'static str,
        variant: &'static str,
        existing: Tag,
        tag: Tag,
    },

    #[error("type `{ty}` mixes {} and {} slots", .expected.name(), .found.name())]
    MixedSlotKinds {
        ty: &'static str,
        expected: SlotKind,
        found: SlotKind,
    },

    #[error("tag {tag} of union `{base}` does not match its {} slots", .expected.name())]
    TagKindMismatch {
        base: &'static str,
        tag: Tag,
        expected: SlotKind,
    },

    #[error("field `{ty}::{field}` declares element type `{element}`, which has no schema")]
    UnregisteredElementType {
        ty: &'static str,
        field: &'static str,
        element: &'static str,
    },

    #[error("field `{ty}::{field}` holds union base `{base}` directly, declare it as `Poly<{base}>`")]
    UnionElementNotPoly {
        ty: &'static str,
        field: &'static str,
        base: &'static str,
    },

    #[error("field `{ty}::{field}` is a collection of objects without a declared element schema type")]
    MissingCollectionElementType { ty: &'static str, field: &'static str },

    #[error("field `{field}` was declared for `{owner}`, not for `{ty}`")]
    ForeignField {
        ty: &'static str,
        owner: &'static str,
        field: &'static str,
    },

    #[error("type `{ty}` already extends `{parent}`")]
    DuplicateParent {
        ty: &'static str,
        parent: &'static str,
    },

    #[error("type `{ty}` inherits from itself")]
    InheritanceCycle { ty: &'static str },
}

// -----------------------------------------------------------------------------
// WireTypeError

/// A wire value could not be converted into a field's Rust type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct WireTypeError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl WireTypeError {
    #[inline]
    pub const fn new(expected: &'static str, found: &'static str) -> Self {
        Self { expected, found }
    }
}

// -----------------------------------------------------------------------------
// PackError

/// An error raised while converting between records and wire shapes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("type `{ty}` has no schema")]
    NotSchemaType { ty: &'static str },

    #[error("`{concrete}` is not a variant of union `{base}`")]
    MissingUnionKey {
        base: &'static str,
        concrete: &'static str,
    },

    #[error("field `{ty}::{field}` holds a `{value}` object but declares no schema element type")]
    UnannotatedObjectField {
        ty: &'static str,
        field: &'static str,
        value: &'static str,
    },

    #[error("union `{base}` expects a [tag, value] pair or a single-key map, found {found}")]
    MalformedUnion {
        base: &'static str,
        found: &'static str,
    },

    #[error("record `{ty}` expects a {expected}, found {found}")]
    MalformedRecord {
        ty: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{ty}::{field}`: {source}")]
    FieldType {
        ty: &'static str,
        field: &'static str,
        source: WireTypeError,
    },

    #[error("expected a `{expected}` record, found `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("object graph is deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },

    #[cfg(feature = "msgpack")]
    #[error("msgpack encode: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[cfg(feature = "msgpack")]
    #[error("msgpack decode: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

// -----------------------------------------------------------------------------
// Diagnostic

/// A recoverable condition met while decoding.
///
/// Newer producers may add union variants or trailing fields; those are
/// skipped rather than failing the whole decode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// The union tag is not registered; the subtree decoded to nothing.
    UnknownVariant { base: &'static str, tag: String },
    /// The slot is not declared on the type; the value was ignored.
    UnknownSlot { ty: &'static str, slot: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownVariant { base, tag } => {
                write!(f, "unknown variant {tag} of union `{base}`")
            }
            Diagnostic::UnknownSlot { ty, slot } => {
                write!(f, "unknown slot {slot} on type `{ty}`")
            }
        }
    }
}
