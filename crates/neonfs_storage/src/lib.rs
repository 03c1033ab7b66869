//! # NeonFS Storage
//!
//! Fixed-geometry block storage for NeonFS.
//!
//! A container file is partitioned into equally sized, individually
//! addressable blocks. This crate presents that file as a thread-safe,
//! random-access array of blocks - create, mount, read, write, flush,
//! unmount - with strict bounds and size invariants. Block contents are
//! **opaque bytes**: the encryption layer hands this crate ciphertext and
//! keeps the IV/tag framing in the metadata catalogue, so blocks stay a
//! power of two on disk.
//!
//! ## Components
//!
//! - [`BlockStorage`] - container file on disk
//! - [`MemoryStorage`] - in-memory provider for tests of higher layers
//! - [`StorageProvider`] - the capability trait both implement
//! - [`metadata`] - the contract for the metadata catalogue above the core
//! - [`paths`] - file-name and path helpers for that catalogue
//!
//! ## Example
//!
//! ```no_run
//! use neonfs_storage::{BlockStorage, BlockStorageConfig, StorageProvider};
//!
//! let config = BlockStorageConfig::new(4096, 4096 * 100);
//! BlockStorage::create("/tmp/container.bin", config)?;
//!
//! let storage = BlockStorage::new();
//! storage.mount("/tmp/container.bin", config)?;
//! storage.write_block(0, b"ciphertext bytes")?;
//! let block = storage.read_block(0)?;
//! storage.flush()?;
//! storage.unmount()?;
//! # Ok::<(), neonfs_storage::StorageError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod config;
mod error;
mod memory;
pub mod metadata;
pub mod paths;
mod provider;

pub use block::BlockStorage;
pub use config::BlockStorageConfig;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use provider::StorageProvider;
