use proc_macro2::Span;
use syn::parse::ParseStream;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, Lit, LitInt, LitStr, Token, Type};

pub(crate) const KEY_ATTRIBUTE_NAME: &str = "key";
pub(crate) const SCHEMA_ATTRIBUTE_NAME: &str = "schema";

// -----------------------------------------------------------------------------
// SlotLit

/// A slot or tag literal: `0` or `"name"`.
pub(crate) enum SlotLit {
    Index(LitInt),
    Key(LitStr),
}

impl SlotLit {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        match input.parse::<Lit>()? {
            Lit::Int(lit) => {
                // Reject out of range values here, not at registration.
                lit.base10_parse::<u32>()?;
                Ok(SlotLit::Index(lit))
            }
            Lit::Str(lit) => Ok(SlotLit::Key(lit)),
            other => Err(syn::Error::new(
                other.span(),
                "expected an unsigned integer or a string literal",
            )),
        }
    }

    pub(crate) fn is_index(&self) -> bool {
        matches!(self, SlotLit::Index(_))
    }

    pub(crate) fn span(&self) -> Span {
        match self {
            SlotLit::Index(lit) => lit.span(),
            SlotLit::Key(lit) => lit.span(),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// `#[key(..)]` and `#[schema(..)]` on a field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub slot: Option<SlotLit>,
    /// `#[key(0, nested)]`: the field holds records.
    pub nested: bool,
    /// `#[schema(extends)]`: the field is the embedded parent.
    pub extends: Option<Span>,
}

impl FieldAttributes {
    pub(crate) fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        for attr in attrs {
            if attr.path().is_ident(KEY_ATTRIBUTE_NAME) {
                if this.slot.is_some() {
                    return Err(syn::Error::new(attr.span(), "duplicate `#[key]` attribute"));
                }
                attr.parse_args_with(|input: ParseStream| {
                    this.slot = Some(SlotLit::parse(input)?);
                    if input.parse::<Option<Token![,]>>()?.is_some() {
                        let flag: Ident = input.parse()?;
                        if flag != "nested" {
                            return Err(syn::Error::new(flag.span(), "expected `nested`"));
                        }
                        this.nested = true;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident(SCHEMA_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("extends") {
                        this.extends = Some(meta.path.span());
                        Ok(())
                    } else {
                        Err(meta.error("unsupported field attribute, expected `extends`"))
                    }
                })?;
            }
        }

        if let (Some(span), Some(_)) = (this.extends, &this.slot) {
            return Err(syn::Error::new(
                span,
                "a parent field is inherited as a whole and cannot have a `#[key]`",
            ));
        }

        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// TypeAttributes

pub(crate) struct Variant {
    pub tag: SlotLit,
    pub ty: Type,
}

/// `#[schema(variant(tag, Type), ..)]` on the type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub variants: Vec<Variant>,
}

impl TypeAttributes {
    pub(crate) fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        for attr in attrs {
            if attr.path().is_ident(KEY_ATTRIBUTE_NAME) {
                return Err(syn::Error::new(
                    attr.span(),
                    "`#[key]` belongs on fields, not on the type",
                ));
            }
            if !attr.path().is_ident(SCHEMA_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("variant") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let tag = SlotLit::parse(&content)?;
                    content.parse::<Token![,]>()?;
                    let ty: Type = content.parse()?;
                    this.variants.push(Variant { tag, ty });
                    Ok(())
                } else {
                    Err(meta.error("unsupported type attribute, expected `variant(tag, Type)`"))
                }
            })?;
        }

        Ok(this)
    }
}
