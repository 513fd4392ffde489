#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_schema as schema;

pub use vc_schema::{Poly, Schema, SchemaRegistry};
pub use vc_schema::{deserialize, deserialize_poly, serialize, serialize_as, serialize_poly};

#[cfg(feature = "msgpack")]
pub use vc_schema::{decode, decode_poly, encode, encode_as, encode_poly};
