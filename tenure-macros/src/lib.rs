//! Derive macros that tag a type with a lifetime
//!

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod di;

/// Tags the type with the `Transient` lifetime
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use tenure::Transient;
///
/// #[derive(Transient)]
/// struct Handler {
///     config: Arc<Config>,
/// }
///
/// // This expands to:
/// // impl Injectable for Handler {
/// //     const TAG: Option<Tag> = Some(Tag::Transient);
/// //
/// //     fn constructors() -> Vec<Constructor<Self>> {
/// //         vec![Constructor::new(|config: Arc<Config>| Ok(Self { config }))]
/// //     }
/// // }
/// ```
#[proc_macro_derive(Transient, attributes(tenure))]
pub fn derive_transient(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_injectable(&input, di::TagKind::Transient)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Tags the type with the `Singleton` lifetime
///
/// # Example
/// ```ignore
/// use tenure::Singleton;
///
/// #[derive(Singleton)]
/// struct Clock;
/// ```
#[proc_macro_derive(Singleton, attributes(tenure))]
pub fn derive_singleton(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_injectable(&input, di::TagKind::Singleton)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Tags the type with the `Scoped` lifetime
#[proc_macro_derive(Scoped, attributes(tenure))]
pub fn derive_scoped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_injectable(&input, di::TagKind::Scoped)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Tags the type with the `ThreadScoped` lifetime
#[proc_macro_derive(ThreadScoped, attributes(tenure))]
pub fn derive_thread_scoped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_injectable(&input, di::TagKind::ThreadScoped)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Tags the type with the `Pooled` lifetime
///
/// The pool capacity can be set with `#[tenure(pool_size = N)]`.
///
/// # Example
/// ```ignore
/// use tenure::Pooled;
///
/// #[derive(Pooled)]
/// #[tenure(pool_size = 4)]
/// struct Connection;
/// ```
#[proc_macro_derive(Pooled, attributes(tenure))]
pub fn derive_pooled(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_injectable(&input, di::TagKind::Pooled)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
