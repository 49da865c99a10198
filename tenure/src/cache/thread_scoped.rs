//! Per-thread instance cache

use super::get_or_build;
use crate::{error::Error, factory::ArcService};
use dashmap::DashMap;
use std::{
    any::TypeId,
    thread::{self, ThreadId}
};

/// Thread-scoped instances of a single resolver, keyed by the calling thread.
///
/// Entries live as long as the resolver. An instance built for a thread that has
/// exited is released together with the resolver.
#[derive(Debug, Default)]
pub(crate) struct ThreadScoped {
    services: DashMap<(ThreadId, TypeId), ArcService>,
}

impl ThreadScoped {
    /// Looks up the calling thread's instance, building and storing on a miss
    #[inline]
    pub(crate) fn get_or_build<F>(&self, type_id: TypeId, build: F) -> Result<ArcService, Error>
    where
        F: FnOnce() -> Result<ArcService, Error>
    {
        get_or_build(&self.services, (thread::current().id(), type_id), build)
    }

    /// Number of cached instances across all threads
    #[cfg(test)]
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.services.len()
    }
}
