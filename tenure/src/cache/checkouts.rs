//! Pooled instances handed out and not returned yet

use crate::factory::ArcService;
use dashmap::DashMap;
use std::{
    any::{Any, TypeId},
    sync::{Arc, Weak}
};

type WeakService = Weak<dyn Any + Send + Sync>;

/// Checkouts are swept of dropped instances whenever their count reaches a power of two above this
const SWEEP_THRESHOLD: usize = 64;

/// Address of the value behind an `Arc`, the same for every view of one allocation
#[inline]
pub(crate) fn address<T: ?Sized>(shared: &Arc<T>) -> usize {
    Arc::as_ptr(shared).cast::<()>().addr()
}

/// Tracks pooled instances by address, so that they can be returned
/// through any contract they were resolved as.
///
/// An entry holds a `Weak` reference, so the address stays reserved until the
/// entry is removed and can never be taken by another allocation.
#[derive(Debug, Default)]
pub(crate) struct Checkouts {
    handed_out: DashMap<usize, (TypeId, WeakService)>,
}

impl Checkouts {
    /// Records an instance of the concrete type `type_id` leaving its pool
    pub(crate) fn check_out(&self, type_id: TypeId, service: &ArcService) {
        self.handed_out.insert(address(service), (type_id, Arc::downgrade(service)));

        let len = self.handed_out.len();
        if len >= SWEEP_THRESHOLD && len.is_power_of_two() {
            self.handed_out.retain(|_, (_, service)| service.strong_count() > 0);
        }
    }

    /// Takes back the instance at `address` if it was checked out as `type_id`
    pub(crate) fn check_in(&self, type_id: TypeId, address: usize) -> Option<ArcService> {
        self.handed_out
            .remove_if(&address, |_, (checked_out, _)| *checked_out == type_id)
            .and_then(|(_, (_, service))| service.upgrade())
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.handed_out.len()
    }
}
