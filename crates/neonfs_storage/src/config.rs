//! Container geometry configuration.

use crate::error::{StorageError, StorageResult};

/// Geometry of a block storage container.
///
/// The container is `block_count()` slots of exactly `block_size` bytes;
/// `total_size` must be a positive multiple of `block_size`. The geometry is
/// not stored in the container file - it must be supplied at every mount and
/// is verified against the file length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStorageConfig {
    /// Size of each block in bytes.
    pub block_size: u64,
    /// Total container size in bytes.
    pub total_size: u64,
}

impl BlockStorageConfig {
    /// Creates a configuration from a block size and total size.
    #[must_use]
    pub const fn new(block_size: u64, total_size: u64) -> Self {
        Self {
            block_size,
            total_size,
        }
    }

    /// Number of block slots the container exposes.
    #[must_use]
    pub const fn block_count(&self) -> u64 {
        if self.block_size == 0 {
            0
        } else {
            self.total_size / self.block_size
        }
    }

    /// Checks the geometry invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidBlockSize`] for a zero block size and
    /// [`StorageError::InvalidTotalSize`] when the total size is zero or not
    /// a multiple of the block size.
    pub fn validate(&self) -> StorageResult<()> {
        if self.block_size == 0 {
            return Err(StorageError::InvalidBlockSize);
        }
        if self.total_size == 0 || self.total_size % self.block_size != 0 {
            return Err(StorageError::InvalidTotalSize {
                total_size: self.total_size,
                block_size: self.block_size,
            });
        }
        Ok(())
    }
}
