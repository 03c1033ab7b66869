//! Container-file block storage.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::BlockStorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::provider::StorageProvider;

#[derive(Default)]
struct StreamState {
    path: PathBuf,
    config: BlockStorageConfig,
    file: Option<File>,
}

impl StreamState {
    fn file(&mut self) -> StorageResult<&mut File> {
        self.file.as_mut().ok_or(StorageError::NotMounted)
    }
}

/// A container file presented as a fixed-count array of fixed-size blocks.
///
/// An instance starts unmounted. [`create`](Self::create) lays a zero-filled
/// container down on disk; [`mount`](Self::mount) opens it read-write and
/// verifies its length against the declared geometry. Every operation that
/// touches the file handle serializes on one internal mutex, held for the
/// full seek-plus-transfer of a block, so callers may share an instance
/// across any number of threads.
///
/// Block contents are opaque bytes. Per-block IVs and tags are not framed in
/// the block; persisting them belongs to the metadata layer above.
///
/// Dropping a mounted instance closes the handle without flushing; call
/// [`flush`](Self::flush) first if durability is required.
#[derive(Default)]
pub struct BlockStorage {
    state: Mutex<StreamState>,
    mounted: AtomicBool,
}

impl BlockStorage {
    /// Creates a new unmounted instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zero-filled container file of exactly
    /// `config.total_size` bytes at `path`.
    ///
    /// Uses its own short-lived handle; it does not contend with mounted
    /// instances. An existing file at `path` is truncated.
    ///
    /// # Errors
    ///
    /// Fails on an empty path, invalid geometry, or I/O failure.
    pub fn create(path: impl AsRef<Path>, config: BlockStorageConfig) -> StorageResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StorageError::EmptyPath);
        }
        config.validate()?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.display().to_string(),
                source,
            })?;
        file.set_len(config.total_size)
            .map_err(|source| StorageError::Open {
                path: path.display().to_string(),
                source,
            })?;
        file.sync_all()
            .map_err(|source| StorageError::Flush { source })?;

        tracing::debug!(
            path = %path.display(),
            block_size = config.block_size,
            block_count = config.block_count(),
            "created container file"
        );
        Ok(())
    }

    /// Mounts the container at `path` with the declared geometry.
    ///
    /// # Errors
    ///
    /// Fails if already mounted, the path is empty, the geometry is
    /// invalid, the path does not name a regular file, or the file length
    /// does not equal `block_size * block_count`. A failed mount leaves the
    /// instance unmounted and the file untouched.
    pub fn mount(&self, path: impl AsRef<Path>, config: BlockStorageConfig) -> StorageResult<()> {
        let path = path.as_ref();
        let mut state = self.state.lock();
        if state.file.is_some() {
            return Err(StorageError::AlreadyMounted);
        }
        if path.as_os_str().is_empty() {
            return Err(StorageError::EmptyPath);
        }
        config.validate()?;

        let metadata = fs::metadata(path).map_err(|_| StorageError::NotAFile {
            path: path.display().to_string(),
        })?;
        if !metadata.is_file() {
            return Err(StorageError::NotAFile {
                path: path.display().to_string(),
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.display().to_string(),
                source,
            })?;

        let actual = metadata.len();
        if actual != config.total_size {
            return Err(StorageError::LengthMismatch {
                expected: config.total_size,
                actual,
            });
        }

        state.path = path.to_path_buf();
        state.config = config;
        state.file = Some(file);
        self.mounted.store(true, Ordering::SeqCst);

        tracing::debug!(
            path = %path.display(),
            block_size = config.block_size,
            block_count = config.block_count(),
            "mounted container"
        );
        Ok(())
    }

    /// Unmounts the container, closing the file handle.
    ///
    /// Durability is not implied; call [`flush`](Self::flush) first if the
    /// contents must survive a crash.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotMounted`] on an unmounted instance.
    pub fn unmount(&self) -> StorageResult<()> {
        let mut state = self.state.lock();
        let file = state.file.take().ok_or(StorageError::NotMounted)?;
        drop(file);
        self.mounted.store(false, Ordering::SeqCst);
        tracing::debug!(path = %state.path.display(), "unmounted container");
        Ok(())
    }

    /// Whether the instance currently has the container open.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Issues an OS-level flush on the container handle.
    ///
    /// # Errors
    ///
    /// Fails when not mounted or when the flush itself fails.
    pub fn flush(&self) -> StorageResult<()> {
        let mut state = self.state.lock();
        state
            .file()?
            .sync_all()
            .map_err(|source| StorageError::Flush { source })
    }
}

impl StorageProvider for BlockStorage {
    fn read_block(&self, block_id: u64) -> StorageResult<Vec<u8>> {
        let mut state = self.state.lock();
        let config = state.config;
        if state.file.is_none() {
            return Err(StorageError::NotMounted);
        }
        if block_id >= config.block_count() {
            return Err(StorageError::InvalidBlockId {
                block_id,
                block_count: config.block_count(),
            });
        }

        let offset = block_id * config.block_size;
        let file = state.file()?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| StorageError::Seek { offset, source })?;

        let mut data = vec![0u8; config.block_size as usize];
        file.read_exact(&mut data)
            .map_err(|source| StorageError::ShortRead { source })?;
        Ok(data)
    }

    fn write_block(&self, block_id: u64, data: &[u8]) -> StorageResult<()> {
        let mut state = self.state.lock();
        let config = state.config;
        if state.file.is_none() {
            return Err(StorageError::NotMounted);
        }
        if block_id >= config.block_count() {
            return Err(StorageError::InvalidBlockId {
                block_id,
                block_count: config.block_count(),
            });
        }
        if data.len() as u64 > config.block_size {
            return Err(StorageError::DataTooLarge {
                len: data.len(),
                block_size: config.block_size,
            });
        }

        let mut padded = data.to_vec();
        padded.resize(config.block_size as usize, 0);

        let offset = block_id * config.block_size;
        let file = state.file()?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| StorageError::Seek { offset, source })?;
        file.write_all(&padded)
            .map_err(|source| StorageError::Write { source })?;
        Ok(())
    }

    fn block_count(&self) -> u64 {
        self.state.lock().config.block_count()
    }

    fn block_size(&self) -> u64 {
        self.state.lock().config.block_size
    }
}

impl std::fmt::Debug for BlockStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockStorage")
            .field("path", &state.path)
            .field("config", &state.config)
            .field("mounted", &state.file.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use rand::RngCore;
    use tempfile::tempdir;

    const CONFIG: BlockStorageConfig = BlockStorageConfig::new(4096, 4096 * 100);

    fn mounted_storage(dir: &tempfile::TempDir) -> BlockStorage {
        let path = dir.path().join("container.bin");
        BlockStorage::create(&path, CONFIG).unwrap();
        let storage = BlockStorage::new();
        storage.mount(&path, CONFIG).unwrap();
        storage
    }

    #[test]
    fn create_validates_inputs() {
        let err = BlockStorage::create("", CONFIG).unwrap_err();
        assert_eq!(err.code(), -2);

        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        let err = BlockStorage::create(&path, BlockStorageConfig::new(0, 4096)).unwrap_err();
        assert_eq!(err.code(), -6);
        let err = BlockStorage::create(&path, BlockStorageConfig::new(512, 1000)).unwrap_err();
        assert_eq!(err.code(), -6);
        assert!(!path.exists());
    }

    #[test]
    fn create_produces_exact_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("container.bin");

        BlockStorage::create(&path, BlockStorageConfig::new(512, 512 * 10)).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 512 * 10);
    }

    #[test]
    fn create_then_mount_succeeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("container.bin");
        let config = BlockStorageConfig::new(4096, 409_600);

        BlockStorage::create(&path, config).unwrap();
        let storage = BlockStorage::new();
        storage.mount(&path, config).unwrap();
        assert!(storage.is_mounted());
        assert_eq!(storage.block_count(), 100);
        assert_eq!(storage.block_size(), 4096);
    }

    #[test]
    fn mount_state_machine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("container.bin");
        BlockStorage::create(&path, CONFIG).unwrap();

        let storage = BlockStorage::new();
        assert!(!storage.is_mounted());
        assert_eq!(storage.unmount().unwrap_err().code(), -1);
        assert_eq!(storage.mount("", CONFIG).unwrap_err().code(), -2);

        storage.mount(&path, CONFIG).unwrap();
        assert_eq!(storage.mount(&path, CONFIG).unwrap_err().code(), -1);

        storage.unmount().unwrap();
        assert!(!storage.is_mounted());
        storage.mount(&path, CONFIG).unwrap();
    }

    #[test]
    fn mount_missing_file_fails() {
        let dir = tempdir().unwrap();
        let storage = BlockStorage::new();
        let err = storage
            .mount(dir.path().join("missing.bin"), CONFIG)
            .unwrap_err();
        assert_eq!(err.code(), -4);
        assert!(!storage.is_mounted());
    }

    #[test]
    fn mount_directory_fails() {
        let dir = tempdir().unwrap();
        let storage = BlockStorage::new();
        let err = storage.mount(dir.path(), CONFIG).unwrap_err();
        assert_eq!(err.code(), -4);
    }

    #[test]
    fn mount_length_mismatch_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("container.bin");
        let config = BlockStorageConfig::new(4096, 409_600);
        BlockStorage::create(&path, config).unwrap();

        // Same geometry family, one byte more: invalid config (-6).
        let storage = BlockStorage::new();
        let err = storage
            .mount(&path, BlockStorageConfig::new(4096, 409_601))
            .unwrap_err();
        assert_eq!(err.code(), -6);

        // Valid config, wrong length on disk: -5, file untouched.
        let err = storage
            .mount(&path, BlockStorageConfig::new(4096, 409_600 + 4096))
            .unwrap_err();
        assert_eq!(err.code(), -5);
        assert!(!storage.is_mounted());
        assert_eq!(fs::metadata(&path).unwrap().len(), 409_600);

        storage.mount(&path, config).unwrap();
    }

    #[test]
    fn io_requires_mount() {
        let storage = BlockStorage::new();
        assert_eq!(storage.read_block(0).unwrap_err().code(), -1);
        assert_eq!(storage.write_block(0, &[0u8; 16]).unwrap_err().code(), -1);
        assert_eq!(storage.flush().unwrap_err().code(), -1);
    }

    #[test]
    fn block_id_bounds_enforced() {
        let dir = tempdir().unwrap();
        let storage = mounted_storage(&dir);

        assert_eq!(storage.read_block(1000).unwrap_err().code(), -2);
        assert_eq!(
            storage.write_block(1000, &[0xAA; 4096]).unwrap_err().code(),
            -2
        );

        // Last valid slot is fine.
        storage.write_block(99, &[0xAA; 4096]).unwrap();
        assert_eq!(storage.read_block(100).unwrap_err().code(), -2);
    }

    #[test]
    fn oversized_write_rejected() {
        let dir = tempdir().unwrap();
        let storage = mounted_storage(&dir);

        let err = storage.write_block(0, &[0xCC; 5000]).unwrap_err();
        assert!(matches!(err, StorageError::DataTooLarge { len: 5000, .. }));
        assert_eq!(err.code(), -3);
    }

    #[test]
    fn short_write_is_zero_padded() {
        let dir = tempdir().unwrap();
        let storage = mounted_storage(&dir);

        storage.write_block(0, &[0xBB; 100]).unwrap();
        let data = storage.read_block(0).unwrap();
        assert_eq!(data.len(), 4096);
        assert_eq!(&data[..100], &[0xBB; 100][..]);
        assert!(data[100..].iter().all(|&b| b == 0));
    }

    #[test]
    fn full_block_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = mounted_storage(&dir);

        let mut data = vec![0u8; 4096];
        rand::thread_rng().fill_bytes(&mut data);

        storage.write_block(5, &data).unwrap();
        assert_eq!(storage.read_block(5).unwrap(), data);
        storage.flush().unwrap();
        assert_eq!(storage.read_block(5).unwrap(), data);
    }

    #[test]
    fn contents_survive_remount() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("container.bin");
        BlockStorage::create(&path, CONFIG).unwrap();

        let storage = BlockStorage::new();
        storage.mount(&path, CONFIG).unwrap();
        storage.write_block(7, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        storage.flush().unwrap();
        storage.unmount().unwrap();

        storage.mount(&path, CONFIG).unwrap();
        let data = storage.read_block(7).unwrap();
        assert_eq!(&data[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(data[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn fresh_container_reads_zeroes() {
        let dir = tempdir().unwrap();
        let storage = mounted_storage(&dir);

        let data = storage.read_block(42).unwrap();
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn concurrent_disjoint_blocks() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(mounted_storage(&dir));

        const THREADS: u64 = 4;
        const BLOCKS_PER_THREAD: u64 = 10;

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    let data = vec![t as u8 + 1; 4096];
                    for i in 0..BLOCKS_PER_THREAD {
                        let block_id = t * BLOCKS_PER_THREAD + i;
                        storage.write_block(block_id, &data).unwrap();
                        assert_eq!(storage.read_block(block_id).unwrap(), data);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        // Every block holds its writer's byte after the dust settles.
        for t in 0..THREADS {
            for i in 0..BLOCKS_PER_THREAD {
                let data = storage.read_block(t * BLOCKS_PER_THREAD + i).unwrap();
                assert!(data.iter().all(|&b| b == t as u8 + 1));
            }
        }
    }
}
