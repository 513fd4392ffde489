//! See [`Schema`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};
use vc_macro_utils::Manifest;

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod derive_data;
mod impls;

// -----------------------------------------------------------------------------
// Macros

/// Implements `Schema` for a struct.
///
/// The type must also implement `Default`, `Clone`, `Debug` and `PartialEq`.
///
/// ## Fields
///
/// Only fields carrying `#[key(..)]` are part of the schema, the others keep
/// their default value after deserialization.
///
/// - `#[key(0)]`: positional slot, the field is written at index `0`.
/// - `#[key("name")]`: keyed slot, the field is written under `"name"`.
/// - `#[key(0, nested)]`: the field holds records, e.g. `Option<Child>`,
///   `Vec<Option<Poly<Base>>>` or `BTreeMap<String, Option<Child>>`.
///
/// All slots of a type, inherited ones included, are of one kind.
///
/// ## Inheritance
///
/// A field marked `#[schema(extends)]` embeds the parent. The parent's slots
/// become slots of this type; a slot declared again here overrides it.
///
/// ## Unions
///
/// `#[schema(variant(tag, Type))]` on a base type lists its concrete types.
/// Tags are indices or names, like slots.
///
/// ## Example
///
/// ```rust, ignore
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// #[schema(variant(0, Child))]
/// struct Parent {
///     #[key(0)]
///     num: i32,
///     #[key(1)]
///     text: String,
/// }
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// struct Child {
///     #[schema(extends)]
///     base: Parent,
///     #[key(2)]
///     child_num: i32,
/// }
/// ```
#[proc_macro_derive(Schema, attributes(key, schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let data = match derive_data::SchemaStruct::from_input(&ast) {
        Ok(data) => data,
        Err(err) => return err.into_compile_error().into(),
    };

    let vc_schema = Manifest::shared(|m| m.crate_path("vc_schema"));

    impls::impl_schema(&data, &vc_schema).into()
}
