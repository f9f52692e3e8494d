//! Bounded pooling of expensive resources.
//!
//! Platform frame-retrieval sessions are costly to construct, so the engine
//! keeps a small number of them around for reuse. [`ResourcePool`] is the
//! generic mechanism: `acquire` hands out a pooled instance (or builds a
//! fresh one when the free list is empty), and dropping the returned
//! [`PooledItem`] lease puts the instance back — unless the pool is already
//! at capacity, in which case the instance is dropped and its own `Drop`
//! releases whatever native state it holds.
//!
//! There is no fairness guarantee: any free instance may be handed to any
//! caller.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

struct PoolShared<T: Send> {
    free: Mutex<Vec<T>>,
    capacity: usize,
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Send> PoolShared<T> {
    fn free_list(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A bounded pool of reusable resources.
///
/// Cloning the pool is cheap and yields another handle onto the same free
/// list, so it can be shared across concurrent extraction calls.
///
/// # Example
///
/// ```
/// use framegrab::ResourcePool;
///
/// let pool: ResourcePool<Vec<u8>> = ResourcePool::new(2, || Vec::with_capacity(1024));
/// let mut buffer = pool.acquire();
/// buffer.extend_from_slice(b"frame data");
/// drop(buffer); // returned to the pool for reuse
/// assert_eq!(pool.idle(), 1);
/// ```
pub struct ResourcePool<T: Send> {
    shared: Arc<PoolShared<T>>,
}

impl<T: Send> Clone for ResourcePool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send> ResourcePool<T> {
    /// Create a pool that retains at most `capacity` idle instances.
    ///
    /// `factory` constructs a fresh instance whenever the free list is
    /// empty at acquire time. Capacity is clamped to a minimum of 1.
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                free: Mutex::new(Vec::new()),
                capacity: capacity.max(1),
                factory: Box::new(factory),
            }),
        }
    }

    /// Take a resource from the pool, constructing one if none is free.
    ///
    /// The resource is leased for the lifetime of the returned
    /// [`PooledItem`]; dropping the lease returns it (or disposes it when
    /// the pool is full).
    pub fn acquire(&self) -> PooledItem<T> {
        let reused = self.shared.free_list().pop();
        let item = match reused {
            Some(item) => item,
            None => {
                log::debug!("resource pool empty, constructing a new instance");
                (self.shared.factory)()
            }
        };
        PooledItem {
            item: Some(item),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of idle instances currently held by the pool.
    pub fn idle(&self) -> usize {
        self.shared.free_list().len()
    }

    /// The maximum number of idle instances the pool retains.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

/// An RAII lease on a pooled resource.
///
/// Dereferences to the resource. On drop, the resource is returned to the
/// pool's free list if the pool is below capacity, otherwise it is dropped
/// in place.
pub struct PooledItem<T: Send> {
    item: Option<T>,
    shared: Arc<PoolShared<T>>,
}

impl<T: Send> Deref for PooledItem<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Invariant: `item` is only `None` after drop has run.
        self.item.as_ref().expect("pooled item accessed after drop")
    }
}

impl<T: Send> DerefMut for PooledItem<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pooled item accessed after drop")
    }
}

impl<T: Send> Drop for PooledItem<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            let mut free = self.shared.free_list();
            if free.len() < self.shared.capacity {
                free.push(item);
            } else {
                log::debug!("resource pool full, disposing returned instance");
                // `item` drops here, releasing any native resources it holds.
            }
        }
    }
}
