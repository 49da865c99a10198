//! Instance caches of the singleton, thread-scoped, keyed and pooled lifetimes

use crate::{
    error::Error,
    factory::ArcService,
    key::ServiceKey,
    pool::ObjectPool,
    registry::TypeIdHasher
};
use dashmap::DashMap;
use std::{
    any::TypeId,
    hash::{BuildHasher, BuildHasherDefault, Hash},
    sync::Arc
};

pub(crate) use self::{
    checkouts::{Checkouts, address},
    thread_scoped::ThreadScoped
};

mod checkouts;
mod thread_scoped;

pub(crate) type TypeIdDashMap<V> = DashMap<
    TypeId,
    V,
    BuildHasherDefault<TypeIdHasher>
>;

pub(crate) type ServicePool = ObjectPool<ArcService>;

/// Looks up `key`, building and storing on a miss.
///
/// No shard lock is held while `build` runs, so concurrent misses may build more
/// than once, but only the first stored instance is kept and returned to everyone.
pub(crate) fn get_or_build<K, S, F>(map: &DashMap<K, ArcService, S>, key: K, build: F) -> Result<ArcService, Error>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
    F: FnOnce() -> Result<ArcService, Error>
{
    if let Some(found) = map.get(&key) {
        return Ok(found.value().clone());
    }

    let built = build()?;
    let stored = map
        .entry(key)
        .or_insert(built)
        .value()
        .clone();
    Ok(stored)
}

/// Caches owned by a single resolver
#[derive(Debug)]
pub(crate) struct LifetimeCaches {
    singletons: TypeIdDashMap<ArcService>,
    keyed: DashMap<(TypeId, ServiceKey), ArcService>,
    pools: TypeIdDashMap<Arc<ServicePool>>,
    checkouts: Checkouts,
    thread_scoped: ThreadScoped,
}

impl LifetimeCaches {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            singletons: TypeIdDashMap::default(),
            keyed: DashMap::new(),
            pools: TypeIdDashMap::default(),
            checkouts: Checkouts::default(),
            thread_scoped: ThreadScoped::default(),
        }
    }

    #[inline]
    pub(crate) fn singleton<F>(&self, type_id: TypeId, build: F) -> Result<ArcService, Error>
    where
        F: FnOnce() -> Result<ArcService, Error>
    {
        get_or_build(&self.singletons, type_id, build)
    }

    #[inline]
    pub(crate) fn keyed<F>(&self, type_id: TypeId, key: ServiceKey, build: F) -> Result<ArcService, Error>
    where
        F: FnOnce() -> Result<ArcService, Error>
    {
        get_or_build(&self.keyed, (type_id, key), build)
    }

    #[inline]
    pub(crate) fn thread_scoped<F>(&self, type_id: TypeId, build: F) -> Result<ArcService, Error>
    where
        F: FnOnce() -> Result<ArcService, Error>
    {
        self.thread_scoped.get_or_build(type_id, build)
    }

    /// Returns the pool of a type, creating it with `make` on first use
    pub(crate) fn pool<F>(&self, type_id: TypeId, make: F) -> Arc<ServicePool>
    where
        F: FnOnce() -> ServicePool
    {
        if let Some(pool) = self.pools.get(&type_id) {
            return pool.value().clone();
        }

        self.pools
            .entry(type_id)
            .or_insert_with(|| Arc::new(make()))
            .value()
            .clone()
    }

    /// Takes an instance from a pool and records it as handed out
    pub(crate) fn check_out(&self, type_id: TypeId, pool: &ServicePool) -> Result<ArcService, Error> {
        let service = pool.get()?;
        self.checkouts.check_out(type_id, &service);
        Ok(service)
    }

    /// Finds the handed out instance of `type_id` at `address`
    #[inline]
    pub(crate) fn check_in(&self, type_id: TypeId, address: usize) -> Option<ArcService> {
        self.checkouts.check_in(type_id, address)
    }
}
