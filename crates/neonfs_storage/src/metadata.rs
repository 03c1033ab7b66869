//! Metadata layer contract.
//!
//! The storage core exposes a flat array of encrypted blocks; everything
//! that makes those blocks a filesystem - names, directories, timestamps,
//! and the per-block IV/tag catalogue - lives behind this interface. The
//! core defines the contract only; implementations belong to the layer
//! above.

use crate::error::StorageResult;

/// A block belonging to a file, with its encryption framing.
///
/// The storage layer does not frame IVs and tags inside blocks, so the
/// metadata record carries them, indexed by block ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRef {
    /// Block slot in the container.
    pub block_id: u64,
    /// Byte offset of this block's payload within the file.
    pub offset: u64,
    /// IV the block was encrypted with.
    pub iv: Vec<u8>,
    /// Authentication tag produced when the block was encrypted.
    pub tag: Vec<u8>,
}

/// Metadata record for a file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Unique file or directory identifier.
    pub file_id: u64,
    /// Entry name.
    pub name: String,
    /// Total size in bytes (0 for directories).
    pub size: u64,
    /// Creation timestamp, seconds since the epoch.
    pub created: u64,
    /// Last-modified timestamp, seconds since the epoch.
    pub modified: u64,
    /// Permission bitmask.
    pub permissions: u32,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Identifier of the parent directory (0 for the root).
    pub parent_id: u64,
    /// Ordered blocks making up the file contents (empty for directories).
    pub blocks: Vec<BlockRef>,
}

/// Capability interface for the metadata catalogue above the block store.
pub trait MetadataProvider: Send + Sync {
    /// Prepares the provider for use (opens backing state, loads caches).
    fn initialize(&self) -> StorageResult<()>;

    /// Shuts the provider down, flushing pending writes.
    fn shutdown(&self) -> StorageResult<()>;

    /// Stores or updates a metadata record.
    fn upsert(&self, meta: &Metadata) -> StorageResult<()>;

    /// Retrieves a record by file ID.
    fn get(&self, file_id: u64) -> StorageResult<Metadata>;

    /// Deletes a record.
    fn delete(&self, file_id: u64) -> StorageResult<()>;

    /// Lists every stored file ID.
    fn list_ids(&self) -> StorageResult<Vec<u64>>;

    /// Fetches several records at once.
    fn batch_get(&self, ids: &[u64]) -> StorageResult<Vec<Metadata>>;

    /// Checks the integrity of a record (block list, framing lengths).
    fn verify(&self, meta: &Metadata) -> StorageResult<bool>;

    /// Lists the children of a directory.
    fn children(&self, parent_id: u64) -> StorageResult<Vec<Metadata>>;

    /// Whether a directory has no children.
    fn is_directory_empty(&self, directory_id: u64) -> StorageResult<bool>;

    /// Moves an entry under a new parent directory.
    fn move_entry(&self, file_id: u64, new_parent_id: u64) -> StorageResult<()>;

    /// Creates an empty file, returning its new ID.
    fn create_file(&self, name: &str, parent_id: u64, permissions: u32) -> StorageResult<u64>;

    /// Creates a directory, returning its new ID.
    fn create_directory(&self, name: &str, parent_id: u64, permissions: u32) -> StorageResult<u64>;

    /// Renames an entry.
    fn rename(&self, file_id: u64, new_name: &str) -> StorageResult<()>;
}
