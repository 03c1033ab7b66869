//! The encryption provider: AES-256-GCM keyed once, contexts pooled.

use rand::RngCore;

use neonfs_secure::SecureBytes;

use crate::context::{Direction, IV_SIZE, KEY_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::pool::ContextPool;

/// Capability interface for authenticated encryption of block payloads.
///
/// Implementations must be safe for concurrent use from any number of
/// threads. The production implementation is [`AesGcmProvider`]; tests may
/// substitute a trivial cipher behind the same interface.
pub trait EncryptionProvider: Send + Sync {
    /// Encrypts `plain`, producing ciphertext of the same length.
    ///
    /// If `iv` is empty it is filled with [`iv_size`](Self::iv_size) fresh
    /// random bytes; otherwise it must already have that exact length.
    /// `tag` is rewritten with the authentication tag regardless of its
    /// incoming contents. On failure, `iv` and `tag` are indeterminate.
    fn encrypt(
        &self,
        plain: &SecureBytes,
        iv: &mut SecureBytes,
        tag: &mut SecureBytes,
    ) -> CryptoResult<SecureBytes>;

    /// Decrypts `cipher`, verifying `tag`, producing plaintext of the same
    /// length.
    ///
    /// A ciphertext, IV, or tag modified in any byte fails with an
    /// authentication error; no partial plaintext is ever returned.
    fn decrypt(
        &self,
        cipher: &SecureBytes,
        iv: &SecureBytes,
        tag: &SecureBytes,
    ) -> CryptoResult<SecureBytes>;

    /// IV length in bytes this provider produces and expects.
    fn iv_size(&self) -> usize;

    /// Authentication tag length in bytes this provider produces and
    /// expects.
    fn tag_size(&self) -> usize;
}

/// Default context pool size for [`AesGcmProvider`].
pub const DEFAULT_POOL_SIZE: usize = 5;

/// AES-256-GCM encryption provider.
///
/// Owns a 32-byte master key fixed at construction and a shared
/// [`ContextPool`]. The provider itself has no mutable state; all
/// synchronization lives in the pool, so any number of threads may encrypt
/// and decrypt concurrently.
pub struct AesGcmProvider {
    key: SecureBytes,
    pool: ContextPool,
}

impl AesGcmProvider {
    /// Creates a provider from a 32-byte master key, with a context pool of
    /// `pool_size`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] unless the key is exactly
    /// 32 bytes.
    pub fn new(key: SecureBytes, pool_size: usize) -> CryptoResult<Self> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }
        Ok(Self {
            key,
            pool: ContextPool::new(pool_size),
        })
    }

    /// Creates a provider with the default pool size.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] unless the key is exactly
    /// 32 bytes.
    pub fn with_default_pool(key: SecureBytes) -> CryptoResult<Self> {
        Self::new(key, DEFAULT_POOL_SIZE)
    }

    /// The context pool backing this provider.
    #[must_use]
    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }
}

impl EncryptionProvider for AesGcmProvider {
    fn encrypt(
        &self,
        plain: &SecureBytes,
        iv: &mut SecureBytes,
        tag: &mut SecureBytes,
    ) -> CryptoResult<SecureBytes> {
        if iv.is_empty() {
            iv.resize(IV_SIZE)?;
            rand::thread_rng().fill_bytes(iv.as_mut_slice());
        } else if iv.len() != IV_SIZE {
            return Err(CryptoError::InvalidIvSize {
                expected: IV_SIZE,
                actual: iv.len(),
            });
        }
        tag.resize(TAG_SIZE)?;
        tag.as_mut_slice().fill(0);

        let mut ciphertext = SecureBytes::from_slice(plain.as_slice())?;
        let mut ctx = self.pool.acquire();
        ctx.init(self.key.as_slice(), Direction::Encrypt)?;
        let produced = ctx.seal_in_place(iv.as_slice(), ciphertext.as_mut_slice())?;
        tag.as_mut_slice().copy_from_slice(&produced);
        Ok(ciphertext)
    }

    fn decrypt(
        &self,
        cipher: &SecureBytes,
        iv: &SecureBytes,
        tag: &SecureBytes,
    ) -> CryptoResult<SecureBytes> {
        if iv.len() != IV_SIZE {
            return Err(CryptoError::InvalidIvSize {
                expected: IV_SIZE,
                actual: iv.len(),
            });
        }
        if tag.len() != TAG_SIZE {
            return Err(CryptoError::InvalidTagSize {
                expected: TAG_SIZE,
                actual: tag.len(),
            });
        }

        let mut plaintext = SecureBytes::from_slice(cipher.as_slice())?;
        let mut ctx = self.pool.acquire();
        ctx.init(self.key.as_slice(), Direction::Decrypt)?;
        ctx.open_in_place(iv.as_slice(), plaintext.as_mut_slice(), tag.as_slice())?;
        Ok(plaintext)
    }

    fn iv_size(&self) -> usize {
        IV_SIZE
    }

    fn tag_size(&self) -> usize {
        TAG_SIZE
    }
}

impl std::fmt::Debug for AesGcmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmProvider")
            .field("key", &"[REDACTED]")
            .field("pool", &self.pool)
            .finish()
    }
}
