use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Ident, Member, Type};

use crate::attributes::{FieldAttributes, SlotLit, TypeAttributes, Variant};

/// A declared field of the deriving struct.
pub(crate) struct SchemaField {
    pub member: Member,
    pub name: String,
    pub slot: SlotLit,
    pub nested: bool,
}

/// The embedded parent, `#[schema(extends)]`.
pub(crate) struct ParentField {
    pub member: Member,
    pub ty: Type,
}

pub(crate) struct SchemaStruct<'a> {
    pub ident: &'a Ident,
    pub parent: Option<ParentField>,
    pub fields: Vec<SchemaField>,
    pub variants: Vec<Variant>,
}

impl<'a> SchemaStruct<'a> {
    pub(crate) fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let fields = match &input.data {
            Data::Struct(data) => &data.fields,
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span(),
                    "`Schema` can only be derived for structs, declare variants with `#[schema(variant(..))]`",
                ));
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "`Schema` cannot be derived for unions",
                ));
            }
        };

        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "`Schema` cannot be derived for generic types",
            ));
        }

        let type_attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        let mut this = Self {
            ident: &input.ident,
            parent: None,
            fields: Vec::new(),
            variants: type_attrs.variants,
        };

        let members = match fields {
            Fields::Named(_) | Fields::Unnamed(_) => fields.members(),
            Fields::Unit => return this.check_tags().map(|()| this),
        };

        for (field, member) in fields.iter().zip(members) {
            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;

            if let Some(span) = attrs.extends {
                if this.parent.is_some() {
                    return Err(syn::Error::new(span, "a type extends at most one parent"));
                }
                this.parent = Some(ParentField {
                    member,
                    ty: field.ty.clone(),
                });
                continue;
            }

            let Some(slot) = attrs.slot else {
                continue;
            };
            let name = match &member {
                Member::Named(ident) => ident.to_string(),
                Member::Unnamed(index) => index.index.to_string(),
            };
            this.fields.push(SchemaField {
                member,
                name,
                slot,
                nested: attrs.nested,
            });
        }

        this.check_slots()?;
        this.check_tags()?;
        Ok(this)
    }

    /// Own slots share one kind. Inherited slots are checked at registration.
    fn check_slots(&self) -> syn::Result<()> {
        let Some(first) = self.fields.first() else {
            return Ok(());
        };
        match self
            .fields
            .iter()
            .find(|field| field.slot.is_index() != first.slot.is_index())
        {
            Some(field) => Err(syn::Error::new(
                field.slot.span(),
                "all `#[key]`s of a type are either indices or names",
            )),
            None => Ok(()),
        }
    }

    fn check_tags(&self) -> syn::Result<()> {
        let Some(first) = self.variants.first() else {
            return Ok(());
        };
        match self
            .variants
            .iter()
            .find(|variant| variant.tag.is_index() != first.tag.is_index())
        {
            Some(variant) => Err(syn::Error::new(
                variant.tag.span(),
                "all variant tags of a type are either indices or names",
            )),
            None => Ok(()),
        }
    }
}
