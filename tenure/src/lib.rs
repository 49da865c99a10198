//! Dependency resolution with lazily classified lifetimes
//!
//! Types declare at most a lifetime *capability* and a lifetime *tag*, directly or
//! through the contracts (`dyn Trait` types) they are bound to. The [`Resolver`]
//! works out the effective lifetime of a type on first request and then serves it
//! from the matching cache:
//!
//! | Lifetime       | Instance per                           |
//! |----------------|----------------------------------------|
//! | `Transient`    | resolution                             |
//! | `Singleton`    | resolver                               |
//! | `Scoped`       | active [`ScopeContext`]                |
//! | `ThreadScoped` | OS thread                              |
//! | `Pooled`       | checkout from a bounded [`ObjectPool`] |
//! | `Keyed`        | [`ServiceKey`]                         |
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use tenure::{bind, injectable, Constructor, Contract, Injectable, Lifetime, Resolver};
//!
//! trait UserService: Send + Sync {
//!     fn name(&self) -> String;
//! }
//!
//! impl Contract for dyn UserService {
//!     const CAPABILITY: Option<Lifetime> = Some(Lifetime::Transient);
//! }
//!
//! #[derive(Default)]
//! struct Clock;
//!
//! injectable! { Singleton => Clock; }
//!
//! struct Users {
//!     clock: Arc<Clock>,
//! }
//!
//! impl UserService for Users {
//!     fn name(&self) -> String { "users".into() }
//! }
//!
//! impl Injectable for Users {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|clock: Arc<Clock>| Ok(Users { clock }))]
//!     }
//! }
//!
//! let mut builder = Resolver::builder();
//! builder.register::<Clock>();
//! bind!(builder, dyn UserService => Users);
//!
//! let resolver = builder.build();
//!
//! let a = resolver.get::<dyn UserService>().unwrap();
//! let b = resolver.get::<dyn UserService>().unwrap();
//!
//! assert_eq!(a.name(), "users");
//! assert!(!Arc::ptr_eq(&a, &b));
//! ```

extern crate self as tenure;

pub use crate::{
    factory::{Constructor, Dependency, GenericFactory, Param, ResolvedArgs},
    inject::{Contract, Injectable},
    key::ServiceKey,
    lifetime::{Declaration, Lifetime, LifetimeSource, ResolutionDescriptor, Tag},
    pool::{DEFAULT_POOL_SIZE, ObjectPool},
    resolver::{Resolver, ResolverBuilder},
    scope::{ScopeContext, ScopeGuard},
    error::Error,
};

#[cfg(feature = "macros")]
pub use tenure_macros::{Pooled, Scoped, Singleton, ThreadScoped, Transient};

pub mod error;
pub mod scope;
pub mod pool;
pub mod inject;
pub mod lifetime;
pub mod key;
pub mod factory;
pub mod resolver;
pub(crate) mod registry;
pub(crate) mod cache;
