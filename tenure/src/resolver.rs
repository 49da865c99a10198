//! Resolver and its builder

use crate::{
    cache::{self, LifetimeCaches, ServicePool, TypeIdDashMap},
    error::Error,
    factory::{self, ArcService, BoxedShared},
    inject::{Contract, Injectable},
    key::ServiceKey,
    lifetime::{Lifetime, ResolutionDescriptor, classifier},
    pool::{DEFAULT_POOL_SIZE, ObjectPool},
    registry::{Shape, TypeEntry, TypeRegistry},
    scope::{ScopeContext, ScopeGuard}
};
use std::{
    any::{TypeId, type_name},
    fmt,
    iter,
    sync::{Arc, Weak, atomic::{AtomicU64, Ordering}}
};

static NEXT_RESOLVER_ID: AtomicU64 = AtomicU64::new(1);

/// Collects types and contract bindings before building a [`Resolver`]
///
/// # Example
/// ```
/// use tenure::{injectable, Resolver};
///
/// #[derive(Default)]
/// struct Clock;
///
/// injectable! { Singleton => Clock; }
///
/// let mut builder = Resolver::builder();
/// builder.register::<Clock>();
///
/// let resolver = builder.build();
/// let clock = resolver.get::<Clock>();
///
/// assert!(clock.is_ok());
/// ```
pub struct ResolverBuilder {
    registry: TypeRegistry,
    default_pool_size: usize,
}

impl fmt::Debug for ResolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("registry", &self.registry)
            .field("default_pool_size", &self.default_pool_size)
            .finish()
    }
}

impl Default for ResolverBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::default(),
            default_pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Sets the capacity of pools whose type declares none
    ///
    /// Default: 10
    pub fn with_default_pool_size(mut self, size: usize) -> Self {
        self.default_pool_size = size;
        self
    }

    /// Registers a concrete type
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.registry.register::<T>();
        self
    }

    /// Registers a contract without any implementer
    pub fn contract<C: Contract + ?Sized>(&mut self) -> &mut Self {
        self.registry.contract::<C>();
        self
    }

    /// Binds `T` as an implementer of the contract `C`.
    ///
    /// `upcast` is almost always the identity closure `|t: Arc<T>| -> Arc<C> { t }`,
    /// see [`bind!`](crate::bind) for a shorthand.
    pub fn bind<C, T, F>(&mut self, upcast: F) -> &mut Self
    where
        C: Contract + ?Sized,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static
    {
        self.registry.bind::<C, T, F>(upcast);
        self
    }

    /// Builds the resolver
    pub fn build(self) -> Resolver {
        let id = NEXT_RESOLVER_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(resolver = id, registry = ?self.registry, "resolver built");
        Resolver {
            inner: Arc::new(Inner {
                id,
                registry: self.registry,
                caches: LifetimeCaches::new(),
                descriptors: TypeIdDashMap::default(),
                default_pool_size: self.default_pool_size,
            })
        }
    }
}

struct Inner {
    id: u64,
    registry: TypeRegistry,
    caches: LifetimeCaches,
    descriptors: TypeIdDashMap<ResolutionDescriptor>,
    default_pool_size: usize,
}

/// Resolves services according to their lifetimes.
///
/// Cloning is cheap, all clones share the same caches.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<Inner>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("id", &self.inner.id)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Creates a [`ResolverBuilder`]
    #[inline]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolves a service of type `T`, a concrete type or a `dyn` contract
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.resolve_erased(TypeId::of::<T>(), type_name::<T>())?
            .downcast::<Arc<T>>()
            .map(|shared| *shared)
            .map_err(|_| Error::ResolveFailed(type_name::<T>()))
    }

    /// Resolves a service of type `T` and returns a clone of it
    #[inline]
    pub fn get_cloned<T: Clone + Send + Sync + 'static>(&self) -> Result<T, Error> {
        self.get::<T>().map(|shared| shared.as_ref().clone())
    }

    /// Returns the lifetime `T` resolves with and where it comes from
    pub fn classify<T: ?Sized + 'static>(&self) -> Result<ResolutionDescriptor, Error> {
        let entry = self.inner.registry.get(TypeId::of::<T>(), type_name::<T>())?;
        self.descriptor(entry)
    }

    /// Returns the names of the types bound to the contract `C`
    pub fn implementations<C: Contract + ?Sized>(&self) -> Result<Vec<&'static str>, Error> {
        let entry = self.inner.registry.get(TypeId::of::<C>(), type_name::<C>())?;
        let names = self.inner.registry
            .find_implementations(entry)
            .iter()
            .map(|implementation| implementation.type_name)
            .collect();
        Ok(names)
    }

    /// Returns a pooled instance to its pool.
    ///
    /// `T` is the type the instance was resolved as, a concrete type or a `dyn` contract.
    /// Only instances handed out by [`Resolver::get`] and not returned yet are accepted,
    /// anything else fails with [`Error::NotCheckedOut`].
    ///
    /// Returns `Ok(false)` if the pool is at capacity and the instance has been discarded.
    ///
    /// # Example
    /// ```
    /// use tenure::{injectable, Resolver};
    ///
    /// #[derive(Default)]
    /// struct Buffer;
    ///
    /// injectable! { Pooled => Buffer; }
    ///
    /// let mut builder = Resolver::builder();
    /// builder.register::<Buffer>();
    /// let resolver = builder.build();
    ///
    /// let buffer = resolver.get::<Buffer>().unwrap();
    /// assert!(resolver.put(buffer).unwrap());
    /// ```
    pub fn put<T: ?Sized + Send + Sync + 'static>(&self, instance: Arc<T>) -> Result<bool, Error> {
        let requested = self.inner.registry.get(TypeId::of::<T>(), type_name::<T>())?;
        let descriptor = self.descriptor(requested)?;
        if descriptor.lifetime != Lifetime::Pooled {
            return Err(Error::NotPooled(type_name::<T>()));
        }

        let service = self.inner.caches
            .check_in(descriptor.concrete, cache::address(&instance))
            .ok_or(Error::NotCheckedOut(type_name::<T>()))?;
        drop(instance);

        let concrete = self.inner.registry.get(descriptor.concrete, descriptor.type_name)?;
        let pool = self.pool(requested, concrete);
        let kept = pool.put(service);
        if !kept {
            tracing::debug!(
                service = descriptor.type_name,
                capacity = pool.capacity(),
                "pool is full, instance discarded");
        }
        Ok(kept)
    }

    /// Starts a new scope on the current execution path.
    ///
    /// The scope is released when the returned guard is ended or dropped.
    ///
    /// In async code call it inside [`scope::flow`](crate::scope::flow) or a task started with
    /// [`scope::spawn_task`](crate::scope::spawn_task). Elsewhere the scope is installed on the
    /// OS thread, which every plain `tokio::spawn` task on that worker shares.
    #[inline]
    pub fn begin_scope(&self) -> ScopeGuard {
        ScopeGuard::begin()
    }

    /// Runs `f` inside a new scope which is released on every exit path
    ///
    /// # Example
    /// ```
    /// use tenure::{injectable, Resolver};
    ///
    /// #[derive(Default)]
    /// struct Session;
    ///
    /// injectable! { Scoped => Session; }
    ///
    /// let mut builder = Resolver::builder();
    /// builder.register::<Session>();
    /// let resolver = builder.build();
    ///
    /// let same = resolver.scoped(|| {
    ///     let a = resolver.get::<Session>().unwrap();
    ///     let b = resolver.get::<Session>().unwrap();
    ///     std::sync::Arc::ptr_eq(&a, &b)
    /// });
    ///
    /// assert!(same);
    /// assert!(resolver.get::<Session>().is_err());
    /// ```
    #[inline]
    pub fn scoped<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = self.begin_scope();
        f()
    }

    #[inline]
    pub(crate) fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    /// Resolves a type by id into a boxed `Arc` of that type
    pub(crate) fn resolve_erased(&self, type_id: TypeId, type_name: &'static str) -> Result<BoxedShared, Error> {
        let requested = self.inner.registry.get(type_id, type_name)?;
        let descriptor = self.descriptor(requested)?;

        tracing::trace!(
            service = requested.type_name,
            lifetime = %descriptor.lifetime,
            source = ?descriptor.source,
            "resolving service");

        let instance = self.instance(requested, &descriptor)?;
        self.inner.registry.project(requested, instance)
    }

    /// Memoized classification, failures are not stored
    fn descriptor(&self, requested: &TypeEntry) -> Result<ResolutionDescriptor, Error> {
        if let Some(found) = self.inner.descriptors.get(&requested.type_id) {
            return Ok(*found.value());
        }

        let descriptor = classifier::classify(&self.inner.registry, requested)?;
        self.inner.descriptors.insert(requested.type_id, descriptor);
        Ok(descriptor)
    }

    fn instance(&self, requested: &TypeEntry, descriptor: &ResolutionDescriptor) -> Result<ArcService, Error> {
        let concrete = self.inner.registry.get(descriptor.concrete, descriptor.type_name)?;
        let caches = &self.inner.caches;
        let build = || factory::create(self, concrete);

        match descriptor.lifetime {
            Lifetime::Transient => build(),
            Lifetime::Singleton => caches.singleton(concrete.type_id, build),
            Lifetime::Scoped => ScopeContext::current()
                .ok_or(Error::NoActiveScope(concrete.type_name))?
                .get_or_create_scoped(self.inner.id, concrete.type_id, build),
            Lifetime::ThreadScoped => caches.thread_scoped(concrete.type_id, build),
            Lifetime::Pooled => caches.check_out(concrete.type_id, &self.pool(requested, concrete)),
            Lifetime::Keyed => {
                let key = self.service_key(requested, concrete)?;
                caches.keyed(concrete.type_id, key, build)
            }
        }
    }

    /// Entries consulted for per-type settings: the concrete type, the requested
    /// contract, then every contract the concrete type is bound to
    fn accessors<'a>(&'a self, requested: &'a TypeEntry, concrete: &'a TypeEntry) -> impl Iterator<Item = &'a TypeEntry> {
        let bound = match &concrete.shape {
            Shape::Concrete(shape) => Some(self.inner.registry.contracts_of(shape)),
            Shape::Contract(_) => None,
        };
        iter::once(concrete)
            .chain((requested.type_id != concrete.type_id).then_some(requested))
            .chain(bound.into_iter().flatten())
    }

    #[inline]
    fn service_key(&self, requested: &TypeEntry, concrete: &TypeEntry) -> Result<ServiceKey, Error> {
        self.accessors(requested, concrete)
            .find_map(|entry| (entry.service_key)())
            .ok_or(Error::MissingServiceKey(concrete.type_name))
    }

    fn pool(&self, requested: &TypeEntry, concrete: &TypeEntry) -> Arc<ServicePool> {
        self.inner.caches.pool(concrete.type_id, || {
            let capacity = self.accessors(requested, concrete)
                .find_map(|entry| (entry.pool_size)())
                .unwrap_or(self.inner.default_pool_size);

            tracing::debug!(service = concrete.type_name, capacity, "pool created");

            let inner = Arc::downgrade(&self.inner);
            let (type_id, type_name) = (concrete.type_id, concrete.type_name);
            ObjectPool::new(move || generate(&inner, type_id, type_name), capacity)
        })
    }
}

/// Builds a fresh pooled instance for a resolver that may already be gone
fn generate(inner: &Weak<Inner>, type_id: TypeId, type_name: &'static str) -> Result<ArcService, Error> {
    let inner = inner.upgrade().ok_or(Error::ResolverDropped)?;
    let resolver = Resolver { inner };
    let entry = resolver.registry().get(type_id, type_name)?;
    factory::create(&resolver, entry)
}
