//! Error types for secure memory operations.

use thiserror::Error;

/// Result type for secure memory operations.
pub type SecureResult<T> = Result<T, SecureError>;

/// Errors that can occur in the secure memory substrate.
#[derive(Debug, Error)]
pub enum SecureError {
    /// The secure heap has not been initialized.
    #[error("secure heap is not initialized")]
    NotInitialized,

    /// The secure heap was already initialized.
    #[error("secure heap is already initialized")]
    AlreadyInitialized,

    /// An allocation exceeded the remaining heap budget.
    #[error("secure heap exhausted: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Bytes the allocation asked for.
        requested: usize,
        /// Bytes left in the heap budget.
        available: usize,
    },

    /// Teardown was attempted while allocations are still live.
    #[error("secure heap still in use: {outstanding} outstanding allocations")]
    HeapInUse {
        /// Number of live allocations charged against the heap.
        outstanding: usize,
    },

    /// A byte sequence was not valid UTF-8.
    #[error("secure string is not valid UTF-8")]
    InvalidUtf8,
}
