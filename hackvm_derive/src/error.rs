//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations.
//! Replacement for `thiserror` crate.
//!
//! # Usage
//!
//! ```ignore
//! use hackvm_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum MyError {
//!     #[error("unknown segment: {segment}")]
//!     UnknownSegment { segment: String, column: usize },
//!
//!     #[error("cannot read {0}")]
//!     Read(String, #[source] std::io::Error),
//!
//!     #[error("empty input")]
//!     Empty,
//! }
//! ```
//!
//! # Supported Features
//!
//! - Unit variants: `#[error("message")]`
//! - Tuple variants with positional args: `#[error("error: {0}")]`
//! - Struct variants with named args: `#[error("expected {expected}")]`
//! - Messages may mention any subset of the fields; unmentioned fields are ignored
//! - Format specs are kept: `{index:?}`, `{0:>4}`
//! - One `#[source]` field per variant feeds `Error::source`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derives `Display` and `Error` for an enum or struct.
///
/// Each variant (or the struct itself) must carry an `#[error("...")]`
/// attribute with the display message.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut display_arms = Vec::new();
    let mut source_arms = Vec::new();

    match &input.data {
        Data::Enum(data_enum) => {
            for variant in &data_enum.variants {
                let ident = &variant.ident;
                let path = quote!(Self::#ident);
                let message = error_message(
                    &variant.attrs,
                    ident,
                    &format!("variant `{}`", ident),
                )?;
                display_arms.push(display_arm(&path, &variant.fields, &message));
                if let Some(arm) = source_arm(&path, &variant.fields)? {
                    source_arms.push(arm);
                }
            }
        }
        Data::Struct(data_struct) => {
            let path = quote!(Self);
            let message = error_message(&input.attrs, name, &format!("type `{}`", name))?;
            display_arms.push(display_arm(&path, &data_struct.fields, &message));
            if let Some(arm) = source_arm(&path, &data_struct.fields)? {
                source_arms.push(arm);
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error derive does not support unions",
            ));
        }
    }

    let source_fn = if source_arms.is_empty() {
        quote!()
    } else {
        quote! {
            fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                match self {
                    #(#source_arms)*
                    #[allow(unreachable_patterns)]
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#display_arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {
            #source_fn
        }
    })
}

/// Builds one `Display` match arm, binding only the fields the message mentions.
fn display_arm(path: &TokenStream2, fields: &Fields, message: &LitStr) -> TokenStream2 {
    match fields {
        Fields::Unit => {
            quote! { #path => ::std::write!(f, #message), }
        }
        Fields::Named(named) => {
            let (format, mentioned) = rewrite_placeholders(&message.value(), false);
            let used: Vec<_> = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| mentioned.contains(&ident.to_string()))
                .collect();
            let format = LitStr::new(&format, message.span());
            quote! {
                #path { #(#used,)* .. } => ::std::write!(f, #format #(, #used = #used)*),
            }
        }
        Fields::Unnamed(unnamed) => {
            let (format, mentioned) = rewrite_placeholders(&message.value(), true);
            let mut patterns = Vec::new();
            let mut used = Vec::new();
            for i in 0..unnamed.unnamed.len() {
                let ident = format_ident!("f{}", i);
                if mentioned.contains(&ident.to_string()) {
                    patterns.push(ident.to_token_stream());
                    used.push(ident);
                } else {
                    patterns.push(quote!(_));
                }
            }
            let format = LitStr::new(&format, message.span());
            quote! {
                #path(#(#patterns),*) => ::std::write!(f, #format #(, #used = #used)*),
            }
        }
    }
}

/// Builds the `Error::source` match arm for the field marked `#[source]`, if any.
fn source_arm(path: &TokenStream2, fields: &Fields) -> syn::Result<Option<TokenStream2>> {
    let marked: Vec<_> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.attrs.iter().any(|a| a.path().is_ident("source")))
        .collect();

    let (index, field) = match marked.as_slice() {
        [] => return Ok(None),
        [one] => *one,
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(
                second.1,
                "only one field per variant may be marked #[source]",
            ));
        }
    };

    let arm = match &field.ident {
        Some(ident) => quote! {
            #path { #ident, .. } => ::std::option::Option::Some(
                #ident as &(dyn ::std::error::Error + 'static)
            ),
        },
        None => {
            let patterns = (0..fields.len()).map(|i| {
                if i == index {
                    quote!(source)
                } else {
                    quote!(_)
                }
            });
            quote! {
                #path(#(#patterns),*) => ::std::option::Option::Some(
                    source as &(dyn ::std::error::Error + 'static)
                ),
            }
        }
    };
    Ok(Some(arm))
}

/// Reads the string literal out of an `#[error("...")]` attribute.
fn error_message<T: ToTokens>(
    attrs: &[Attribute],
    target: &T,
    target_desc: &str,
) -> syn::Result<LitStr> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("error")) else {
        return Err(syn::Error::new_spanned(
            target,
            format!(
                "missing #[error(\"...\")] attribute on {}; every error variant must declare a display message",
                target_desc
            ),
        ));
    };

    attr.parse_args::<LitStr>().map_err(|_| {
        syn::Error::new_spanned(
            &attr.meta,
            "invalid #[error] attribute; expected a string literal like #[error(\"unknown segment: {segment}\")]",
        )
    })
}

/// Collects the argument names a format string mentions.
///
/// For tuple fields the positional `{0}` placeholders are renamed to `{f0}` so
/// they can be passed as named arguments. Escaped braces are left untouched.
fn rewrite_placeholders(message: &str, positional: bool) -> (String, Vec<String>) {
    let mut out = String::with_capacity(message.len());
    let mut names: Vec<String> = Vec::new();
    let mut rest = message;

    while let Some(start) = rest.find(['{', '}']) {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);

        // `{{` and `}}`
        if tail[1..].starts_with(&tail[..1]) {
            out.push_str(&tail[..2]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };

        let inner = &tail[1..end];
        let (name, spec) = inner.split_at(inner.find(':').unwrap_or(inner.len()));
        let name = name.trim();
        let name = if positional && !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            format!("f{name}")
        } else {
            name.to_string()
        };

        out.push('{');
        out.push_str(&name);
        out.push_str(spec);
        out.push('}');
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);

    (out, names)
}
