//! The process-wide secure heap.
//!
//! The heap is a fixed budget of bytes reserved for sensitive data. It is
//! initialized once at startup and torn down at shutdown; teardown refuses
//! to proceed while any allocation is outstanding, so a leaked key buffer is
//! caught rather than silently left behind.
//!
//! Containers do not draw raw pointers from here. They charge their capacity
//! against the budget via [`HeapLease`] and wipe their own memory before the
//! lease is returned. Rounding every charge up to the configured minimum
//! allocation keeps the accounting aligned with what a locked allocator
//! would actually hand out.

use parking_lot::Mutex;

use crate::error::{SecureError, SecureResult};

/// Default heap budget: 64 MiB.
pub const DEFAULT_HEAP_SIZE: usize = 64 * 1024 * 1024;
/// Default minimum allocation granularity: 64 bytes.
pub const DEFAULT_MIN_ALLOCATION: usize = 64;

/// Configuration for the secure heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureHeapConfig {
    /// Total heap budget in bytes.
    pub size: usize,
    /// Minimum allocation granularity in bytes. Every charge is rounded up
    /// to a multiple of this.
    pub min_allocation: usize,
}

impl Default for SecureHeapConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_HEAP_SIZE,
            min_allocation: DEFAULT_MIN_ALLOCATION,
        }
    }
}

impl SecureHeapConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total heap budget.
    #[must_use]
    pub const fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the minimum allocation granularity.
    #[must_use]
    pub const fn min_allocation(mut self, min_allocation: usize) -> Self {
        self.min_allocation = min_allocation;
        self
    }
}

#[derive(Debug)]
struct Heap {
    capacity: usize,
    min_allocation: usize,
    used: usize,
    outstanding: usize,
}

impl Heap {
    fn new(config: SecureHeapConfig) -> Self {
        Self {
            capacity: config.size,
            min_allocation: config.min_allocation.max(1),
            used: 0,
            outstanding: 0,
        }
    }

    /// Charges `bytes` against the budget, returning the rounded amount.
    fn charge(&mut self, bytes: usize) -> SecureResult<usize> {
        let charged = bytes.div_ceil(self.min_allocation) * self.min_allocation;
        let available = self.capacity - self.used;
        if charged > available {
            return Err(SecureError::OutOfMemory {
                requested: bytes,
                available,
            });
        }
        self.used += charged;
        self.outstanding += 1;
        Ok(charged)
    }

    fn release(&mut self, charged: usize) {
        self.used = self.used.saturating_sub(charged);
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}

static HEAP: Mutex<Option<Heap>> = Mutex::new(None);

/// Initializes the secure heap with the given configuration.
///
/// # Errors
///
/// Returns [`SecureError::AlreadyInitialized`] if the heap is already up.
pub fn initialize(config: SecureHeapConfig) -> SecureResult<()> {
    let mut heap = HEAP.lock();
    if heap.is_some() {
        return Err(SecureError::AlreadyInitialized);
    }
    tracing::debug!(
        size = config.size,
        min_allocation = config.min_allocation,
        "initializing secure heap"
    );
    *heap = Some(Heap::new(config));
    Ok(())
}

/// Initializes the secure heap with default size and granularity.
///
/// # Errors
///
/// Returns [`SecureError::AlreadyInitialized`] if the heap is already up.
pub fn initialize_default() -> SecureResult<()> {
    initialize(SecureHeapConfig::default())
}

/// Tears the secure heap down.
///
/// # Errors
///
/// Returns [`SecureError::HeapInUse`] if any allocation is outstanding and
/// [`SecureError::NotInitialized`] if the heap was never initialized (or was
/// already torn down).
pub fn shutdown() -> SecureResult<()> {
    let mut heap = HEAP.lock();
    match heap.as_ref() {
        None => Err(SecureError::NotInitialized),
        Some(state) if state.outstanding > 0 => Err(SecureError::HeapInUse {
            outstanding: state.outstanding,
        }),
        Some(_) => {
            tracing::debug!("secure heap shut down");
            *heap = None;
            Ok(())
        }
    }
}

/// Returns whether the secure heap is currently initialized.
#[must_use]
pub fn is_initialized() -> bool {
    HEAP.lock().is_some()
}

/// Returns the number of bytes currently charged against the heap.
///
/// # Errors
///
/// Returns [`SecureError::NotInitialized`] if the heap is down.
pub fn used_bytes() -> SecureResult<usize> {
    HEAP.lock()
        .as_ref()
        .map(|heap| heap.used)
        .ok_or(SecureError::NotInitialized)
}

/// Returns the total heap budget.
///
/// # Errors
///
/// Returns [`SecureError::NotInitialized`] if the heap is down.
pub fn capacity() -> SecureResult<usize> {
    HEAP.lock()
        .as_ref()
        .map(|heap| heap.capacity)
        .ok_or(SecureError::NotInitialized)
}

/// A charge against the secure heap, released on drop.
#[derive(Debug)]
pub(crate) struct HeapLease {
    charged: usize,
}

impl HeapLease {
    /// A lease that charges nothing; used by empty containers.
    pub(crate) const fn empty() -> Self {
        Self { charged: 0 }
    }

    /// Charges `bytes` against the heap.
    pub(crate) fn reserve(bytes: usize) -> SecureResult<Self> {
        if bytes == 0 {
            return Ok(Self::empty());
        }
        let mut heap = HEAP.lock();
        let heap = heap.as_mut().ok_or(SecureError::NotInitialized)?;
        let charged = heap.charge(bytes)?;
        Ok(Self { charged })
    }
}

impl Default for HeapLease {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for HeapLease {
    fn drop(&mut self) {
        if self.charged > 0 {
            if let Some(heap) = HEAP.lock().as_mut() {
                heap.release(self.charged);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::HEAP_GUARD;
    use crate::SecureBytes;

    #[test]
    fn charge_rounds_up_to_granularity() {
        let mut heap = Heap::new(SecureHeapConfig::new().size(1024).min_allocation(64));

        assert_eq!(heap.charge(1).unwrap(), 64);
        assert_eq!(heap.charge(64).unwrap(), 64);
        assert_eq!(heap.charge(65).unwrap(), 128);
        assert_eq!(heap.used, 256);
        assert_eq!(heap.outstanding, 3);
    }

    #[test]
    fn charge_past_capacity_fails() {
        let mut heap = Heap::new(SecureHeapConfig::new().size(128).min_allocation(64));

        heap.charge(64).unwrap();
        let err = heap.charge(100).unwrap_err();
        match err {
            SecureError::OutOfMemory {
                requested,
                available,
            } => {
                assert_eq!(requested, 100);
                assert_eq!(available, 64);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn release_returns_budget() {
        let mut heap = Heap::new(SecureHeapConfig::new().size(256).min_allocation(64));

        let charged = heap.charge(200).unwrap();
        assert!(heap.charge(100).is_err());
        heap.release(charged);
        assert_eq!(heap.used, 0);
        assert_eq!(heap.outstanding, 0);
        assert!(heap.charge(100).is_ok());
    }

    #[test]
    fn global_heap_lifecycle() {
        // Exclusive access: this test tears the global heap down.
        let _guard = HEAP_GUARD.write();
        let _ = shutdown();

        assert!(!is_initialized());
        assert!(matches!(
            SecureBytes::from_slice(b"key material"),
            Err(SecureError::NotInitialized)
        ));
        assert!(matches!(shutdown(), Err(SecureError::NotInitialized)));

        initialize(SecureHeapConfig::new().size(4096).min_allocation(64)).unwrap();
        assert!(is_initialized());
        assert!(matches!(
            initialize_default(),
            Err(SecureError::AlreadyInitialized)
        ));
        assert_eq!(capacity().unwrap(), 4096);

        // Allocation beyond the arena fails without disturbing accounting.
        assert!(matches!(
            SecureBytes::with_capacity(8192),
            Err(SecureError::OutOfMemory { .. })
        ));
        assert_eq!(used_bytes().unwrap(), 0);

        let buf = SecureBytes::from_slice(&[0xAA; 100]).unwrap();
        assert_eq!(used_bytes().unwrap(), 128);
        assert!(matches!(
            shutdown(),
            Err(SecureError::HeapInUse { outstanding: 1 })
        ));

        drop(buf);
        assert_eq!(used_bytes().unwrap(), 0);
        shutdown().unwrap();
        assert!(matches!(shutdown(), Err(SecureError::NotInitialized)));

        // Leave a heap behind for concurrently queued tests.
        initialize_default().unwrap();
    }
}
