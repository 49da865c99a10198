//! Traits that describe how a type is classified and constructed

use crate::{
    error::Error,
    factory::Constructor,
    key::ServiceKey,
    lifetime::{Lifetime, Tag}
};

/// A concrete type that can be constructed by the [`Resolver`](crate::Resolver).
///
/// The lifetime is declared either as a capability with [`Injectable::CAPABILITY`]
/// or as a tag with [`Injectable::TAG`]. When both are absent the lifetime is taken
/// from the contracts the type is bound to.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tenure::{Constructor, Injectable, Lifetime, Resolver};
///
/// #[derive(Default)]
/// struct Config;
///
/// struct Repository {
///     config: Arc<Config>
/// }
///
/// impl Injectable for Config {
///     const CAPABILITY: Option<Lifetime> = Some(Lifetime::Singleton);
///
///     fn instantiate() -> Result<Self, tenure::Error> {
///         Ok(Config)
///     }
/// }
///
/// impl Injectable for Repository {
///     const CAPABILITY: Option<Lifetime> = Some(Lifetime::Transient);
///
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|config: Arc<Config>| Ok(Repository { config }))]
///     }
/// }
///
/// let mut builder = Resolver::builder();
/// builder.register::<Config>();
/// builder.register::<Repository>();
/// let resolver = builder.build();
///
/// let first = resolver.get::<Repository>().unwrap();
/// let second = resolver.get::<Repository>().unwrap();
///
/// assert!(!Arc::ptr_eq(&first, &second));
/// assert!(Arc::ptr_eq(&first.config, &second.config));
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Lifetime capability implemented by this type
    const CAPABILITY: Option<Lifetime> = None;

    /// Lifetime tag carried by this type
    const TAG: Option<Tag> = None;

    /// Capacity of the pool for a pooled service
    #[inline]
    fn pool_size() -> Option<usize> {
        None
    }

    /// Discriminator of a keyed service
    #[inline]
    fn service_key() -> Option<ServiceKey> {
        None
    }

    /// Public constructors, the one with the most parameters is used
    #[inline]
    fn constructors() -> Vec<Constructor<Self>> {
        Vec::new()
    }

    /// Constructs the type with no arguments when there are no [`Injectable::constructors`]
    #[inline]
    fn instantiate() -> Result<Self, Error> {
        Err(Error::construction::<Self>("no constructor declared"))
    }
}

/// An abstract type, normally a `dyn Trait`, that concrete types are bound to.
///
/// # Example
/// ```
/// use tenure::{Contract, Lifetime};
///
/// trait UserService: Send + Sync {
///     fn name(&self) -> &str;
/// }
///
/// impl Contract for dyn UserService {
///     const CAPABILITY: Option<Lifetime> = Some(Lifetime::Transient);
/// }
/// ```
pub trait Contract: Send + Sync + 'static {
    /// Lifetime capability declared by this contract
    const CAPABILITY: Option<Lifetime> = None;

    /// Lifetime tag carried by this contract
    const TAG: Option<Tag> = None;

    /// Capacity of the pool, used when the implementer does not declare one
    #[inline]
    fn pool_size() -> Option<usize> {
        None
    }

    /// Discriminator, used when the implementer does not declare one
    #[inline]
    fn service_key() -> Option<ServiceKey> {
        None
    }
}

/// An `injectable!` macro that tags one or more [`Default`] types with a lifetime.
///
/// # Macro Syntax
/// ```ignore
/// injectable! {
///     Transient => Type1 Type2;
///     Singleton => Type3;
/// }
/// ```
///
/// # Example
/// ```
/// use tenure::{injectable, Injectable, Tag};
///
/// #[derive(Default)]
/// struct PaymentService;
///
/// injectable! {
///     Transient => PaymentService;
/// }
///
/// assert_eq!(PaymentService::TAG, Some(Tag::Transient));
/// ```
#[macro_export]
macro_rules! injectable {
    ($($tag:ident => $($name:ident)*;)*) => {
        $($(impl $crate::Injectable for $name {
            const TAG: Option<$crate::Tag> = Some($crate::Tag::$tag);

            #[inline]
            fn instantiate() -> Result<Self, $crate::error::Error> {
                Ok(<$name as ::core::default::Default>::default())
            }
        })*)*
    };
}

/// A `bind!` macro that binds a concrete type to a contract.
///
/// # Example
/// ```
/// use tenure::{bind, injectable, Contract, Resolver};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// impl Contract for dyn Greeter {}
///
/// #[derive(Default)]
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// injectable! {
///     Singleton => English;
/// }
///
/// let mut builder = Resolver::builder();
/// bind!(builder, dyn Greeter => English);
///
/// let greeter = builder.build().get::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[macro_export]
macro_rules! bind {
    ($builder:expr, $contract:ty => $($implementation:ty),+) => {
        $($builder.bind::<$contract, $implementation, _>(
            |service: ::std::sync::Arc<$implementation>| -> ::std::sync::Arc<$contract> { service }
        );)+
    };
}
