//! `#[derive(WalkAst)]` — generates `trygo_parser::walk::Walk` impls.
//!
//! For a struct, the generated impl walks every field in declaration
//! order; for an enum, it matches each variant and walks its payload.
//! Leaf types (spans, symbols, operator enums) opt out via the no-op
//! impls in `walk.rs`.

use proc_macro::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Fields, Index};

#[proc_macro_derive(WalkAst)]
pub fn derive_walk_ast(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let span = input.span();

    let body = match walk_body(&input.data) {
        Ok(body) => body,
        Err(err) => return err.into_compile_error().into(),
    };

    let expanded = quote_spanned! {span =>
        impl<'ast> crate::walk::Walk<'ast> for #name {
            #[inline]
            fn walk<V: crate::walk::Visitor<'ast> + ?Sized>(
                &self,
                a: &'ast crate::ast::AstArena,
                v: &mut V
            ) {
                #body
            }
        }
    };

    expanded.into()
}

fn walk_body(data: &Data) -> syn::Result<proc_macro2::TokenStream> {
    match data {
        Data::Struct(s) => Ok(walk_fields(&s.fields)),
        Data::Enum(e) => {
            let arms = e.variants.iter().map(|variant| {
                let ident = &variant.ident;
                variant_arm(ident, &variant.fields)
            });
            Ok(quote! {
                match self {
                    #(#arms)*
                }
            })
        }
        Data::Union(u) => Err(syn::Error::new_spanned(
            u.union_token,
            "WalkAst cannot be derived for unions",
        )),
    }
}

fn walk_fields(fields: &Fields) -> proc_macro2::TokenStream {
    let calls = fields.iter().enumerate().map(|(i, field)| {
        let access = match &field.ident {
            Some(ident) => quote! { &self.#ident },
            None => {
                let index = Index::from(i);
                quote! { &self.#index }
            }
        };
        quote! { crate::walk::Walk::walk(#access, a, v); }
    });
    quote! { #(#calls)* }
}

fn variant_arm(variant: &syn::Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Unit => quote! { Self::#variant => {} },
        Fields::Named(named) => {
            let bindings: Vec<_> = named
                .named
                .iter()
                .map(|f| f.ident.as_ref().unwrap())
                .collect();
            let calls = bindings
                .iter()
                .map(|name| quote! { crate::walk::Walk::walk(#name, a, v); });
            quote! {
                Self::#variant { #(#bindings),* } => {
                    #(#calls)*
                }
            }
        }
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("f{}", i))
                .collect();
            let calls = bindings
                .iter()
                .map(|var| quote! { crate::walk::Walk::walk(#var, a, v); });
            quote! {
                Self::#variant(#(#bindings),*) => {
                    #(#calls)*
                }
            }
        }
    }
}
