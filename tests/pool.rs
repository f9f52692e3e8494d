//! Resource pool integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use framegrab::ResourcePool;

/// A pooled resource that counts constructions and drops, standing in for
/// a native frame-retrieval session.
struct TrackedResource {
    dropped: Arc<AtomicUsize>,
}

impl Drop for TrackedResource {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn released_instance_is_reused() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);
    let pool: ResourcePool<u32> = ResourcePool::new(3, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        0
    });

    let first = pool.acquire();
    drop(first);
    assert_eq!(pool.idle(), 1);

    let _second = pool.acquire();
    assert_eq!(
        constructed.load(Ordering::SeqCst),
        1,
        "an idle instance was available, no new construction expected"
    );
}

#[test]
fn empty_pool_constructs_on_demand() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);
    let pool: ResourcePool<u32> = ResourcePool::new(3, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        0
    });

    let a = pool.acquire();
    let b = pool.acquire();
    let c = pool.acquire();
    assert_eq!(constructed.load(Ordering::SeqCst), 3);
    drop((a, b, c));
    assert_eq!(pool.idle(), 3);
}

#[test]
fn overflow_release_disposes_the_instance() {
    let dropped = Arc::new(AtomicUsize::new(0));
    let drop_counter = Arc::clone(&dropped);
    let pool: ResourcePool<TrackedResource> = ResourcePool::new(1, move || TrackedResource {
        dropped: Arc::clone(&drop_counter),
    });

    let first = pool.acquire();
    let second = pool.acquire();

    drop(first); // fits, retained
    drop(second); // pool already at capacity, disposed

    assert_eq!(pool.idle(), 1, "pool should retain exactly its capacity");
    assert_eq!(
        dropped.load(Ordering::SeqCst),
        1,
        "the overflowing instance should have been dropped"
    );
}

#[test]
fn capacity_is_clamped_to_at_least_one() {
    let pool: ResourcePool<u8> = ResourcePool::new(0, || 0);
    assert_eq!(pool.capacity(), 1);

    drop(pool.acquire());
    assert_eq!(pool.idle(), 1);
}

#[test]
fn concurrent_acquire_release_keeps_free_list_consistent() {
    const THREADS: usize = 8;
    const ITERATIONS: usize = 200;

    let pool: ResourcePool<Vec<u8>> = ResourcePool::new(3, || vec![0u8; 64]);

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = pool.clone();
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    let mut lease = pool.acquire();
                    lease.push(1);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("pool worker panicked");
    }

    assert!(
        pool.idle() <= pool.capacity(),
        "free list grew past capacity: {} > {}",
        pool.idle(),
        pool.capacity()
    );
    assert!(pool.idle() >= 1, "at least one instance should have been retained");
}
