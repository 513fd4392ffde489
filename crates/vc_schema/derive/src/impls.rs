use proc_macro2::TokenStream;
use quote::quote;

use crate::attributes::SlotLit;
use crate::derive_data::SchemaStruct;

fn slot_tokens(slot: &SlotLit) -> TokenStream {
    match slot {
        SlotLit::Index(lit) => {
            // Suffixed, so the literal never infers as `i32`.
            let value = lit.base10_digits();
            let lit = syn::LitInt::new(&format!("{value}u32"), lit.span());
            quote!(#lit)
        }
        SlotLit::Key(lit) => quote!(#lit),
    }
}

/// `impl Schema for T`, declaring the parent first, then fields in source
/// order, then variants.
pub(crate) fn impl_schema(data: &SchemaStruct, vc_schema: &syn::Path) -> TokenStream {
    let ident = data.ident;

    let parent = data.parent.as_ref().map(|parent| {
        let member = &parent.member;
        let ty = &parent.ty;
        quote! {
            decl.extends::<#ty, _, _>(|this| &this.#member, |this| &mut this.#member)?;
        }
    });

    let fields = data.fields.iter().map(|field| {
        let member = &field.member;
        let name = &field.name;
        let slot = slot_tokens(&field.slot);
        let method = if field.nested {
            quote!(nested)
        } else {
            quote!(field)
        };
        quote! {
            decl.#method(#slot, #name, |this| &this.#member, |this| &mut this.#member)?;
        }
    });

    let variants = data.variants.iter().map(|variant| {
        let ty = &variant.ty;
        let tag = slot_tokens(&variant.tag);
        quote! {
            decl.variant::<#ty>(#tag)?;
        }
    });

    quote! {
        impl #vc_schema::Schema for #ident {
            #[allow(unused_variables)]
            fn declare(
                decl: &mut #vc_schema::registry::TypeDecl<Self>,
            ) -> ::core::result::Result<(), #vc_schema::SchemaError> {
                #parent
                #(#fields)*
                #(#variants)*
                ::core::result::Result::Ok(())
            }
        }
    }
}
