//! In-memory storage provider for testing.

use parking_lot::RwLock;

use crate::config::BlockStorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::provider::StorageProvider;

/// An in-memory [`StorageProvider`] with the same geometry and bounds
/// behaviour as [`BlockStorage`](crate::BlockStorage).
///
/// Useful for exercising layers above the storage core (metadata catalogues,
/// encrypted file views) without touching the filesystem.
#[derive(Debug)]
pub struct MemoryStorage {
    config: BlockStorageConfig,
    blocks: RwLock<Vec<u8>>,
}

impl MemoryStorage {
    /// Creates a zeroed in-memory container with the given geometry.
    ///
    /// # Errors
    ///
    /// Fails if the geometry is invalid.
    pub fn new(config: BlockStorageConfig) -> StorageResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            blocks: RwLock::new(vec![0u8; config.total_size as usize]),
        })
    }

    fn check_block_id(&self, block_id: u64) -> StorageResult<()> {
        if block_id >= self.config.block_count() {
            return Err(StorageError::InvalidBlockId {
                block_id,
                block_count: self.config.block_count(),
            });
        }
        Ok(())
    }
}

impl StorageProvider for MemoryStorage {
    fn read_block(&self, block_id: u64) -> StorageResult<Vec<u8>> {
        self.check_block_id(block_id)?;
        let blocks = self.blocks.read();
        let start = (block_id * self.config.block_size) as usize;
        let end = start + self.config.block_size as usize;
        Ok(blocks[start..end].to_vec())
    }

    fn write_block(&self, block_id: u64, data: &[u8]) -> StorageResult<()> {
        self.check_block_id(block_id)?;
        if data.len() as u64 > self.config.block_size {
            return Err(StorageError::DataTooLarge {
                len: data.len(),
                block_size: self.config.block_size,
            });
        }

        let mut blocks = self.blocks.write();
        let start = (block_id * self.config.block_size) as usize;
        let end = start + self.config.block_size as usize;
        blocks[start..start + data.len()].copy_from_slice(data);
        blocks[start + data.len()..end].fill(0);
        Ok(())
    }

    fn block_count(&self) -> u64 {
        self.config.block_count()
    }

    fn block_size(&self) -> u64 {
        self.config.block_size
    }
}
