//! Zero-on-free UTF-8 string.

use std::fmt;

use crate::bytes::SecureBytes;
use crate::error::{SecureError, SecureResult};

/// A UTF-8 string backed by the secure heap, for passwords and passphrases.
///
/// Shares the [`SecureBytes`] discipline: capacity charged against the heap,
/// contents wiped before release, redacted `Debug`.
#[derive(Default, PartialEq, Eq)]
pub struct SecureString {
    bytes: SecureBytes,
}

impl SecureString {
    /// Creates an empty string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a string holding a copy of `s`.
    ///
    /// # Errors
    ///
    /// Fails if the heap is not initialized or the allocation exceeds the
    /// remaining budget.
    pub fn from_str(s: &str) -> SecureResult<Self> {
        Ok(Self {
            bytes: SecureBytes::from_slice(s.as_bytes())?,
        })
    }

    /// Creates a string from raw bytes, validating UTF-8.
    ///
    /// # Errors
    ///
    /// Fails with [`SecureError::InvalidUtf8`] on malformed input, or with a
    /// heap error if the allocation fails.
    pub fn from_utf8(bytes: &[u8]) -> SecureResult<Self> {
        if std::str::from_utf8(bytes).is_err() {
            return Err(SecureError::InvalidUtf8);
        }
        Ok(Self {
            bytes: SecureBytes::from_slice(bytes)?,
        })
    }

    /// The string contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Construction validated UTF-8 and the bytes are never mutated.
        std::str::from_utf8(self.bytes.as_slice()).unwrap_or_default()
    }

    /// The string contents as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.bytes.len())
            .field("chars", &"[REDACTED]")
            .finish()
    }
}
