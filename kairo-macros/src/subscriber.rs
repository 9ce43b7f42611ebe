//! `#[subscriber]` and `#[listener]`.
//!
//! `#[subscriber]` strips the `#[listener]` attributes from the methods of an
//! inherent `impl` block and generates a `Subscriber` implementation that
//! declares one handler per marked method, in declaration order.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Expr, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitBool, Meta, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Options of one `#[listener(...)]` attribute.
#[derive(Default)]
pub(crate) struct ListenerArgs {
    pub priority: Option<Expr>,
    pub parallel: Option<bool>,
}

impl Parse for ListenerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ListenerArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "priority" => {
                    if args.priority.is_some() {
                        return Err(syn::Error::new(ident.span(), "duplicate `priority`"));
                    }
                    input.parse::<Token![=]>()?;
                    args.priority = Some(input.parse()?);
                }
                "parallel" => {
                    if args.parallel.is_some() {
                        return Err(syn::Error::new(ident.span(), "duplicate `parallel`"));
                    }
                    let value = if input.peek(Token![=]) {
                        input.parse::<Token![=]>()?;
                        input.parse::<LitBool>()?.value
                    } else {
                        true
                    };
                    args.parallel = Some(value);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!(
                            "unknown listener option `{}`, expected `priority` or `parallel`",
                            other
                        ),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// A validated listener method.
struct Listener {
    method: Ident,
    event: Type,
    args: ListenerArgs,
}

impl Listener {
    fn registration(&self) -> TokenStream2 {
        let Listener {
            method,
            event,
            args,
        } = self;
        let priority = match &args.priority {
            Some(expr) => quote! { #expr },
            None => quote! { 0 },
        };
        let parallel = args.parallel.unwrap_or(false);

        quote! {
            subscriptions.on_with::<#event, _, _>(
                ::kairo::ListenerOptions::new()
                    .priority(#priority)
                    .parallel(#parallel),
                Self::#method,
            );
        }
    }
}

/// Implementation of the `#[subscriber]` attribute macro.
pub fn subscriber_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "#[subscriber] takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut input = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &input.trait_ {
        return syn::Error::new_spanned(
            path,
            "#[subscriber] must be used on an inherent impl block, not a trait impl",
        )
        .to_compile_error()
        .into();
    }

    let mut listeners = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        match take_listener(method) {
            Ok(Some(listener)) => listeners.push(listener),
            Ok(None) => {}
            Err(error) => {
                if let Some(existing) = errors.as_mut() {
                    existing.combine(error);
                } else {
                    errors = Some(error);
                }
            }
        }
    }

    if let Some(errors) = errors {
        return errors.to_compile_error().into();
    }

    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let self_ty = &input.self_ty;
    let registrations = listeners.iter().map(Listener::registration);

    let expanded = quote! {
        #input

        impl #impl_generics ::kairo::Subscriber for #self_ty #where_clause {
            #[allow(unused_variables)]
            fn subscribe(subscriptions: &mut ::kairo::Subscriptions<Self>) {
                #(#registrations)*
            }
        }
    };

    TokenStream::from(expanded)
}

/// Remove the `#[listener]` attribute from `method` and validate it.
///
/// Returns `Ok(None)` for methods without the attribute.
fn take_listener(method: &mut ImplItemFn) -> syn::Result<Option<Listener>> {
    let mut marks: Vec<Attribute> = Vec::new();
    method.attrs.retain(|attr| {
        if attr.path().is_ident("listener") {
            marks.push(attr.clone());
            false
        } else {
            true
        }
    });

    let Some(mark) = marks.first() else {
        return Ok(None);
    };
    if let Some(extra) = marks.get(1) {
        return Err(syn::Error::new_spanned(extra, "duplicate #[listener] attribute"));
    }

    let args = match &mark.meta {
        Meta::Path(_) => ListenerArgs::default(),
        Meta::List(_) => mark.parse_args::<ListenerArgs>()?,
        Meta::NameValue(nv) => {
            return Err(syn::Error::new_spanned(
                nv,
                "expected #[listener] or #[listener(priority = ..., parallel)]",
            ));
        }
    };

    let event = event_type(method)?;
    Ok(Some(Listener {
        method: method.sig.ident.clone(),
        event,
        args,
    }))
}

/// Check the listener signature `fn(&self, &Event) -> R` and extract `Event`.
fn event_type(method: &ImplItemFn) -> syn::Result<Type> {
    let sig = &method.sig;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "listener methods must not be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "listener methods must not be generic",
        ));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        Some(other) => {
            return Err(syn::Error::new_spanned(
                other,
                "the first listener parameter must be `&self`",
            ));
        }
        None => {
            return Err(syn::Error::new_spanned(
                sig,
                "listener methods take `&self` and a reference to the event",
            ));
        }
    }

    let event = match inputs.next() {
        Some(FnArg::Typed(pat_type)) => match &*pat_type.ty {
            Type::Reference(reference) if reference.mutability.is_none() => {
                (*reference.elem).clone()
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "the event parameter must be a shared reference, e.g. `&Login`",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                sig,
                "listener methods take `&self` and a reference to the event",
            ));
        }
    };

    if let Some(extra) = inputs.next() {
        return Err(syn::Error::new_spanned(
            extra,
            "listener methods take exactly one event parameter",
        ));
    }

    Ok(event)
}
