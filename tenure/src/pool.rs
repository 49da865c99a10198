//! Bounded object pool

use crate::error::Error;
use parking_lot::Mutex;
use std::fmt;

/// Capacity of a pool when the pooled type does not declare one
pub const DEFAULT_POOL_SIZE: usize = 10;

type GeneratorFn<T> = Box<
    dyn Fn() -> Result<T, Error>
    + Send
    + Sync
>;

/// A bounded container of reusable objects.
///
/// [`ObjectPool::get`] hands out any available object or generates a new one,
/// [`ObjectPool::put`] keeps a returned object only while the pool is below capacity.
/// Discarded objects are simply dropped.
///
/// # Example
/// ```
/// use tenure::ObjectPool;
///
/// let pool = ObjectPool::new(|| Ok(Vec::<u8>::with_capacity(1024)), 1);
///
/// let buffer = pool.get().unwrap();
/// assert!(pool.put(buffer));
/// assert!(!pool.put(Vec::new()));
/// assert_eq!(pool.len(), 1);
/// ```
pub struct ObjectPool<T> {
    items: Mutex<Vec<T>>,
    generator: GeneratorFn<T>,
    capacity: usize,
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("available", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> ObjectPool<T> {
    /// Creates an empty pool
    pub fn new<F>(generator: F, capacity: usize) -> Self
    where
        F: Fn() -> Result<T, Error> + Send + Sync + 'static
    {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
            generator: Box::new(generator),
            capacity,
        }
    }

    /// Takes an available object or generates a new one
    pub fn get(&self) -> Result<T, Error> {
        let item = self.items.lock().pop();
        match item {
            Some(item) => Ok(item),
            None => (self.generator)(),
        }
    }

    /// Returns an object to the pool.
    ///
    /// Returns `false` if the pool is at capacity and the object has been dropped.
    pub fn put(&self, item: T) -> bool {
        let mut items = self.items.lock();
        if items.len() < self.capacity {
            items.push(item);
            true
        } else {
            false
        }
    }

    /// Number of available objects
    #[inline]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if no objects are available
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of available objects
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
