//! Schema declarations and the registry that caches them.
//!
//! A type describes itself once in [`Schema::declare`], through a
//! [`TypeDecl`]: its fields and their wire slots, the parent it extends and,
//! for a union base, the variants it may be viewed as. A
//! [`SchemaRegistry`] turns that into a [`SchemaEntry`] the first time the
//! type is used, with inherited fields merged in.

// -----------------------------------------------------------------------------
// Modules

mod decl;
mod entry;
mod schema_registry;
mod schema_type;
mod slot;
mod table;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use table::Ident;

pub use decl::TypeDecl;
pub use entry::SchemaEntry;
pub use schema_registry::{DEFAULT_MAX_DEPTH, SchemaRegistry};
pub use schema_type::{Schema, SchemaType};
pub use slot::{IntoSlot, IntoTag, MAX_SLOT_INDEX, Slot, SlotKind, Tag};
pub use table::{FieldTable, UnionTable};
