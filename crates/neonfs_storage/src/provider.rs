//! Storage provider trait.

use crate::error::StorageResult;

/// Capability interface over a fixed-geometry array of blocks.
///
/// Implementations present `block_count()` slots of exactly `block_size()`
/// bytes each and must be safe for concurrent use. Block contents are
/// opaque - encryption framing, if any, is the caller's concern.
///
/// # Implementors
///
/// - [`BlockStorage`](crate::BlockStorage) - container file on disk
/// - [`MemoryStorage`](crate::MemoryStorage) - in-memory, for tests of the
///   layers above
pub trait StorageProvider: Send + Sync {
    /// Reads the full contents of block `block_id`.
    ///
    /// Returns exactly `block_size()` bytes.
    ///
    /// # Errors
    ///
    /// Fails if the provider is not ready for I/O, the ID is out of range,
    /// or the read is short.
    fn read_block(&self, block_id: u64) -> StorageResult<Vec<u8>>;

    /// Writes `data` to block `block_id`.
    ///
    /// A buffer shorter than `block_size()` is zero-padded on the right; a
    /// longer buffer is rejected.
    ///
    /// # Errors
    ///
    /// Fails if the provider is not ready for I/O, the ID is out of range,
    /// the buffer is too large, or the write fails.
    fn write_block(&self, block_id: u64, data: &[u8]) -> StorageResult<()>;

    /// Number of block slots.
    fn block_count(&self) -> u64;

    /// Size of each block in bytes.
    fn block_size(&self) -> u64;
}
