#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `vc_schema`, inside the crate too.
extern crate self as vc_schema;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod api;
mod de;
mod error;
mod field;
mod hash;
mod record;
mod ser;

pub mod registry;
pub mod union;
pub mod wire;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use api::{deserialize, deserialize_poly, deserialize_with_report};
pub use api::{serialize, serialize_as, serialize_poly};
pub use error::{Diagnostic, PackError, SchemaError, WireTypeError};
pub use field::{Element, ElementMismatch, ElementType, FieldMeta, FieldShape};
pub use field::{Nested, NestedValue, NestedView, Primitive};
pub use record::{DynRecord, Poly, Record, RecordRef};
pub use registry::{Schema, SchemaRegistry, SchemaType};
pub use vc_schema_derive as derive;

#[cfg(feature = "msgpack")]
pub use api::{decode, decode_poly, encode, encode_as, encode_poly};
