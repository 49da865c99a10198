//! Macros for lifetime tags

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident};

pub(super) mod attr;

/// Greatest arity of a generated constructor
const MAX_FIELDS: usize = 5;

/// Lifetime tag applied by a derive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TagKind {
    Transient,
    Singleton,
    Scoped,
    ThreadScoped,
    Pooled,
}

impl TagKind {
    fn ident(self) -> Ident {
        let name = match self {
            TagKind::Transient => "Transient",
            TagKind::Singleton => "Singleton",
            TagKind::Scoped => "Scoped",
            TagKind::ThreadScoped => "ThreadScoped",
            TagKind::Pooled => "Pooled",
        };
        Ident::new(name, Span::call_site())
    }
}

/// Expands a struct into an `Injectable` implementation carrying the tag
pub(super) fn expand_injectable(input: &DeriveInput, tag: TagKind) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "lifetime derives support structs only"));
    };

    let options = attr::Options::from_attrs(&input.attrs)?;
    let pool_size = match options.pool_size {
        Some(_) if tag != TagKind::Pooled => {
            return Err(syn::Error::new_spanned(name, "`pool_size` is supported by `Pooled` only"));
        }
        Some(size) => Some(quote! {
            #[inline]
            fn pool_size() -> Option<usize> {
                Some(#size)
            }
        }),
        None => None,
    };

    let construction = expand_construction(&data.fields)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let tag = tag.ident();

    Ok(quote! {
        impl #impl_generics ::tenure::Injectable for #name #ty_generics #where_clause {
            const TAG: Option<::tenure::Tag> = Some(::tenure::Tag::#tag);

            #pool_size

            #construction
        }
    })
}

/// A struct without fields is instantiated directly,
/// otherwise every field becomes a constructor parameter
fn expand_construction(fields: &Fields) -> syn::Result<TokenStream> {
    if fields.is_empty() {
        let value = match fields {
            Fields::Named(_) => quote! { Self {} },
            Fields::Unnamed(_) => quote! { Self() },
            Fields::Unit => quote! { Self },
        };
        return Ok(quote! {
            #[inline]
            fn instantiate() -> Result<Self, ::tenure::error::Error> {
                Ok(#value)
            }
        });
    }

    if fields.len() > MAX_FIELDS {
        return Err(syn::Error::new_spanned(
            fields,
            format!("at most {MAX_FIELDS} fields can be injected")));
    }

    let params = (0..fields.len())
        .map(|i| format_ident!("arg{i}"))
        .collect::<Vec<_>>();
    let types = fields.iter().map(|field| &field.ty);
    let value = match fields {
        Fields::Named(named) => {
            let names = named.named.iter().map(|field| &field.ident);
            quote! { Self { #(#names: #params),* } }
        }
        _ => quote! { Self(#(#params),*) },
    };

    Ok(quote! {
        fn constructors() -> Vec<::tenure::Constructor<Self>> {
            vec![::tenure::Constructor::new(
                |#(#params: #types),*| Ok::<Self, ::tenure::error::Error>(#value)
            )]
        }
    })
}
