//! Bounded pool of AES-256-GCM cipher contexts.
//!
//! Creating a cipher context per operation is wasteful under concurrent
//! load; creating one per thread is unbounded. The pool caps the number of
//! contexts that ever exist at `max_size` and circulates them: an acquire
//! either pops an idle context, creates a fresh one while under the cap, or
//! blocks until a lease is returned.
//!
//! The created-count is a high-water mark. It is never decremented - once
//! the cap is reached the pool is strictly a circulation pool.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::context::AeadContext;

struct PoolState {
    idle: Vec<AeadContext>,
    created: usize,
}

struct PoolInner {
    state: Mutex<PoolState>,
    available: Condvar,
    max_size: usize,
}

impl PoolInner {
    fn release(&self, mut ctx: AeadContext) {
        ctx.reset();
        let mut state = self.state.lock();
        state.idle.push(ctx);
        self.available.notify_one();
    }
}

/// A bounded pool of [`AeadContext`]s with blocking acquisition.
///
/// Cloning the pool is cheap and shares the same contexts; handles keep the
/// shared state alive, so a lease released after every pool clone is gone
/// still lands safely.
#[derive(Clone)]
pub struct ContextPool {
    inner: Arc<PoolInner>,
}

impl ContextPool {
    /// Creates a pool that will never hold more than `max_size` contexts
    /// alive at once.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    idle: Vec::with_capacity(max_size),
                    created: 0,
                }),
                available: Condvar::new(),
                max_size,
            }),
        }
    }

    /// Acquires a context, blocking until one is available.
    ///
    /// The returned handle owns the context exclusively; dropping it resets
    /// the context and returns it to the pool, waking one waiter.
    pub fn acquire(&self) -> PoolHandle {
        let mut state = self.inner.state.lock();
        loop {
            if let Some(ctx) = state.idle.pop() {
                return PoolHandle::new(Arc::clone(&self.inner), ctx);
            }
            if state.created < self.inner.max_size {
                state.created += 1;
                // Construct outside the lock; the slot is already claimed.
                drop(state);
                return PoolHandle::new(Arc::clone(&self.inner), AeadContext::new());
            }
            self.inner.available.wait(&mut state);
        }
    }

    /// Number of idle contexts currently in the pool. Diagnostic only; the
    /// value may be stale by the time the caller sees it.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.state.lock().idle.len()
    }

    /// Maximum number of contexts this pool will ever create.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }
}

impl std::fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ContextPool")
            .field("max_size", &self.inner.max_size)
            .field("created", &state.created)
            .field("idle", &state.idle.len())
            .finish()
    }
}

/// An exclusive lease of an [`AeadContext`] from a [`ContextPool`].
///
/// The handle is move-only; dropping it returns the context to the pool.
pub struct PoolHandle {
    pool: Arc<PoolInner>,
    ctx: Option<AeadContext>,
}

impl PoolHandle {
    fn new(pool: Arc<PoolInner>, ctx: AeadContext) -> Self {
        Self {
            pool,
            ctx: Some(ctx),
        }
    }

    /// Returns the context to the pool immediately instead of at end of
    /// scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for PoolHandle {
    type Target = AeadContext;

    fn deref(&self) -> &AeadContext {
        self.ctx.as_ref().expect("pool handle already released")
    }
}

impl DerefMut for PoolHandle {
    fn deref_mut(&mut self) -> &mut AeadContext {
        self.ctx.as_mut().expect("pool handle already released")
    }
}

impl Drop for PoolHandle {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use crate::context::Direction;

    #[test]
    fn acquire_creates_up_to_cap_then_circulates() {
        let pool = ContextPool::new(2);
        assert_eq!(pool.available(), 0);

        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.available(), 0);

        drop(a);
        assert_eq!(pool.available(), 1);
        drop(b);
        assert_eq!(pool.available(), 2);

        // Reuse does not create new contexts.
        let c = pool.acquire();
        assert_eq!(pool.available(), 1);
        drop(c);
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.inner.state.lock().created, 2);
    }

    #[test]
    fn released_context_comes_back_clean() {
        let pool = ContextPool::new(1);

        let mut handle = pool.acquire();
        handle.init(&[0x42; 32], Direction::Encrypt).unwrap();
        assert!(handle.is_initialized());
        drop(handle);

        let handle = pool.acquire();
        assert!(!handle.is_initialized());
    }

    #[test]
    fn acquire_blocks_at_cap_and_wakes_on_release() {
        let pool = ContextPool::new(3);
        let held: Vec<PoolHandle> = (0..3).map(|_| pool.acquire()).collect();

        let (tx, rx) = mpsc::channel();
        let waiter_pool = pool.clone();
        let waiter = thread::spawn(move || {
            let handle = waiter_pool.acquire();
            tx.send(()).unwrap();
            drop(handle);
        });

        // The fourth acquire must not complete while all three are held.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        drop(held);
        // One release is enough to wake the waiter.
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        waiter.join().unwrap();
    }

    #[test]
    fn every_release_wakes_a_waiter() {
        let pool = ContextPool::new(2);
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let mut handle = pool.acquire();
                        handle.init(&[0x42; 32], Direction::Encrypt).unwrap();
                        let mut buf = [0u8; 16];
                        handle.seal_in_place(&[0x24; 12], &mut buf).unwrap();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(pool.inner.state.lock().created, 2);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn handle_outlives_other_pool_owners() {
        let pool = ContextPool::new(1);
        let handle = pool.acquire();
        drop(pool);
        // Release through the handle's own strong reference.
        drop(handle);
    }

    #[test]
    fn moved_handle_releases_exactly_once() {
        let pool = ContextPool::new(1);
        let handle = pool.acquire();
        let moved = handle;
        drop(moved);
        assert_eq!(pool.available(), 1);
    }
}
