//! Error types for block storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in the block storage layer.
///
/// Every variant maps onto one of the stable negative category codes via
/// [`code`](StorageError::code); callers embedding NeonFS behind a foreign
/// interface key their translation off those codes.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Mount was attempted on a mounted instance.
    #[error("storage is already mounted")]
    AlreadyMounted,

    /// An operation requiring a mount ran on an unmounted instance.
    #[error("storage is not mounted")]
    NotMounted,

    /// The container path was empty.
    #[error("storage path cannot be empty")]
    EmptyPath,

    /// A block ID was outside the container geometry.
    #[error("invalid block ID {block_id}: container has {block_count} blocks")]
    InvalidBlockId {
        /// The offending block ID.
        block_id: u64,
        /// Number of blocks the container exposes.
        block_count: u64,
    },

    /// Opening or creating the container file failed.
    #[error("failed to open container file {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A write buffer exceeded the block size.
    #[error("data length {len} exceeds block size {block_size}")]
    DataTooLarge {
        /// Length of the rejected buffer.
        len: usize,
        /// Configured block size.
        block_size: u64,
    },

    /// The mount path does not name a regular file.
    #[error("container path {path} does not exist or is not a regular file")]
    NotAFile {
        /// The offending path.
        path: String,
    },

    /// Seeking to a block offset failed.
    #[error("seek to offset {offset} failed: {source}")]
    Seek {
        /// Byte offset of the failed seek.
        offset: u64,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A block read returned fewer bytes than the block size.
    #[error("incomplete block read: {source}")]
    ShortRead {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The container file length does not match the declared geometry.
    #[error("container length mismatch: expected {expected} bytes, file has {actual}")]
    LengthMismatch {
        /// Length the configuration requires.
        expected: u64,
        /// Length found on disk.
        actual: u64,
    },

    /// Writing a block failed.
    #[error("block write failed: {source}")]
    Write {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Flushing the container to disk failed.
    #[error("flush failed: {source}")]
    Flush {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configured block size was zero.
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// The configured total size was zero or not a multiple of the block
    /// size.
    #[error("total size {total_size} is not a positive multiple of block size {block_size}")]
    InvalidTotalSize {
        /// Configured total size.
        total_size: u64,
        /// Configured block size.
        block_size: u64,
    },
}

impl StorageError {
    /// The stable negative category code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::AlreadyMounted | Self::NotMounted => -1,
            Self::EmptyPath | Self::InvalidBlockId { .. } => -2,
            Self::Open { .. } | Self::DataTooLarge { .. } => -3,
            Self::NotAFile { .. } | Self::Seek { .. } | Self::ShortRead { .. } => -4,
            Self::LengthMismatch { .. } | Self::Write { .. } | Self::Flush { .. } => -5,
            Self::InvalidBlockSize | Self::InvalidTotalSize { .. } => -6,
        }
    }
}
