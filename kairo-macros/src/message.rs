//! `#[derive(Message)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Implementation of `#[derive(Message)]`.
pub fn derive_message_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let parallel = match parse_parallel(&input) {
        Ok(parallel) => parallel,
        Err(e) => return e.to_compile_error().into(),
    };

    let body = if parallel {
        quote! { const PARALLEL: bool = true; }
    } else {
        quote! {}
    };

    let expanded = quote! {
        impl #impl_generics ::kairo::Message for #name #ty_generics #where_clause {
            #body
        }
    };

    TokenStream::from(expanded)
}

fn parse_parallel(input: &DeriveInput) -> syn::Result<bool> {
    let mut parallel = false;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("message")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("parallel") {
                parallel = if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<syn::LitBool>()?.value
                } else {
                    true
                };
                Ok(())
            } else {
                Err(meta.error("unknown message option, expected `parallel`"))
            }
        })?;
    }
    Ok(parallel)
}
