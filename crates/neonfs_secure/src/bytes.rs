//! Zero-on-free byte buffer.

use std::fmt;
use std::ops::{Deref, DerefMut};

use zeroize::Zeroize;

use crate::error::SecureResult;
use crate::heap::HeapLease;

/// A resizable byte buffer backed by the secure heap.
///
/// The buffer charges its capacity against the process-wide secure heap and
/// overwrites its memory with zeroes before every release: on drop, on
/// truncation, and on reallocation of the old backing store. All keys,
/// plaintexts, IVs and tags crossing the NeonFS encryption boundary use this
/// type.
///
/// Constructors and growing operations are fallible: they fail if the heap
/// is not initialized or if the allocation would exceed the heap budget.
#[derive(Default)]
pub struct SecureBytes {
    buf: Vec<u8>,
    lease: HeapLease,
}

impl SecureBytes {
    /// Creates an empty buffer. Does not touch the heap until the first
    /// allocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Fails if the heap is not initialized or the capacity exceeds the
    /// remaining budget.
    pub fn with_capacity(capacity: usize) -> SecureResult<Self> {
        let lease = HeapLease::reserve(capacity)?;
        Ok(Self {
            buf: Vec::with_capacity(capacity),
            lease,
        })
    }

    /// Creates a buffer holding a copy of `data`.
    ///
    /// # Errors
    ///
    /// Fails if the heap is not initialized or the allocation exceeds the
    /// remaining budget.
    pub fn from_slice(data: &[u8]) -> SecureResult<Self> {
        let mut bytes = Self::with_capacity(data.len())?;
        bytes.buf.extend_from_slice(data);
        Ok(bytes)
    }

    /// Creates a buffer of `len` zero bytes.
    ///
    /// # Errors
    ///
    /// Fails if the heap is not initialized or the allocation exceeds the
    /// remaining budget.
    pub fn zeroed(len: usize) -> SecureResult<Self> {
        let mut bytes = Self::with_capacity(len)?;
        bytes.buf.resize(len, 0);
        Ok(bytes)
    }

    /// Number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The buffer contents as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// The buffer contents as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Resizes the buffer to `new_len` bytes, zero-filling growth and wiping
    /// any truncated tail.
    ///
    /// # Errors
    ///
    /// Fails if growth exceeds the heap budget or the heap is down.
    pub fn resize(&mut self, new_len: usize) -> SecureResult<()> {
        if new_len > self.buf.len() {
            self.grow_to(new_len)?;
            self.buf.resize(new_len, 0);
        } else {
            self.truncate(new_len);
        }
        Ok(())
    }

    /// Appends `data` to the buffer.
    ///
    /// # Errors
    ///
    /// Fails if growth exceeds the heap budget or the heap is down.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> SecureResult<()> {
        self.grow_to(self.buf.len() + data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Shortens the buffer to `len` bytes, wiping the cut-off tail.
    ///
    /// Does nothing if `len` is not smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len < self.buf.len() {
            self.buf[len..].zeroize();
            self.buf.truncate(len);
        }
    }

    /// Empties the buffer, wiping its contents. The capacity stays charged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Ensures capacity for at least `needed` bytes, moving and wiping the
    /// old backing store if a reallocation is required.
    fn grow_to(&mut self, needed: usize) -> SecureResult<()> {
        if needed <= self.buf.capacity() {
            return Ok(());
        }
        let new_cap = needed.max(self.buf.capacity() * 2);
        let new_lease = HeapLease::reserve(new_cap)?;
        let mut new_buf = Vec::with_capacity(new_cap);
        new_buf.extend_from_slice(&self.buf);
        self.buf.zeroize();
        self.buf = new_buf;
        self.lease = new_lease;
        Ok(())
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for SecureBytes {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl AsMut<[u8]> for SecureBytes {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl Eq for SecureBytes {}

impl PartialEq<[u8]> for SecureBytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.buf == other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for SecureBytes {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.buf == other
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.buf.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
