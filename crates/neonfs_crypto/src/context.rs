//! Single-use AES-256-GCM cipher context.

use std::fmt;

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};

use crate::error::{CryptoError, CryptoResult};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM IV in bytes.
pub const IV_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Direction a cipher context is initialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The context will seal (encrypt) exactly once.
    Encrypt,
    /// The context will open (decrypt) exactly once.
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => f.write_str("encryption"),
            Self::Decrypt => f.write_str("decryption"),
        }
    }
}

/// A configured AES-256-GCM cipher state.
///
/// Lifecycle: freshly constructed, then [`init`](Self::init) with a key and
/// direction, then exactly one [`seal_in_place`](Self::seal_in_place) or
/// [`open_in_place`](Self::open_in_place), after which the context clears
/// itself and must be initialized again. [`reset`](Self::reset) drops any
/// keyed state early. The pool resets every context on release, so a context
/// coming out of the pool never carries a previous caller's key schedule.
pub struct AeadContext {
    cipher: Option<Aes256Gcm>,
    direction: Option<Direction>,
}

impl AeadContext {
    pub(crate) fn new() -> Self {
        Self {
            cipher: None,
            direction: None,
        }
    }

    /// Keys the context for one operation in the given direction.
    ///
    /// Any previous state is discarded first.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] unless `key` is 32 bytes.
    pub fn init(&mut self, key: &[u8], direction: Direction) -> CryptoResult<()> {
        self.reset();
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::cipher_failed("failed to key AES-256-GCM cipher"))?;
        self.cipher = Some(cipher);
        self.direction = Some(direction);
        Ok(())
    }

    /// Encrypts `buffer` in place and returns the 16-byte authentication tag.
    ///
    /// Consumes the context's initialized state; a further operation
    /// requires a fresh [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Fails if the context is not initialized for encryption or the IV is
    /// not 12 bytes.
    pub fn seal_in_place(&mut self, iv: &[u8], buffer: &mut [u8]) -> CryptoResult<[u8; TAG_SIZE]> {
        self.check_direction(Direction::Encrypt)?;
        check_iv(iv)?;
        let cipher = self.cipher.take().ok_or(CryptoError::ContextNotInitialized)?;
        self.direction = None;
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(iv), b"", buffer)
            .map_err(|_| CryptoError::cipher_failed("AES-GCM encryption failed"))?;
        Ok(tag.into())
    }

    /// Decrypts `buffer` in place, verifying the detached tag.
    ///
    /// Consumes the context's initialized state; a further operation
    /// requires a fresh [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AuthenticationFailed`] if the tag does not
    /// verify. The buffer contents are indeterminate on failure.
    pub fn open_in_place(&mut self, iv: &[u8], buffer: &mut [u8], tag: &[u8]) -> CryptoResult<()> {
        self.check_direction(Direction::Decrypt)?;
        check_iv(iv)?;
        if tag.len() != TAG_SIZE {
            return Err(CryptoError::InvalidTagSize {
                expected: TAG_SIZE,
                actual: tag.len(),
            });
        }
        let cipher = self.cipher.take().ok_or(CryptoError::ContextNotInitialized)?;
        self.direction = None;
        cipher
            .decrypt_in_place_detached(Nonce::from_slice(iv), b"", buffer, Tag::from_slice(tag))
            .map_err(|_| CryptoError::AuthenticationFailed)
    }

    /// Clears the key schedule and direction state.
    pub fn reset(&mut self) {
        self.cipher = None;
        self.direction = None;
    }

    /// Whether the context currently holds a keyed cipher.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cipher.is_some()
    }

    fn check_direction(&self, wanted: Direction) -> CryptoResult<()> {
        match self.direction {
            None => Err(CryptoError::ContextNotInitialized),
            Some(dir) if dir == wanted => Ok(()),
            Some(dir) => Err(CryptoError::DirectionMismatch {
                expected: dir,
                actual: wanted,
            }),
        }
    }
}

impl fmt::Debug for AeadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadContext")
            .field("initialized", &self.cipher.is_some())
            .field("direction", &self.direction)
            .finish()
    }
}

fn check_iv(iv: &[u8]) -> CryptoResult<()> {
    if iv.len() != IV_SIZE {
        return Err(CryptoError::InvalidIvSize {
            expected: IV_SIZE,
            actual: iv.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x42; KEY_SIZE];
    const IV: [u8; IV_SIZE] = [0x24; IV_SIZE];

    #[test]
    fn seal_open_roundtrip() {
        let mut ctx = AeadContext::new();

        let mut data = *b"block payload";
        ctx.init(&KEY, Direction::Encrypt).unwrap();
        let tag = ctx.seal_in_place(&IV, &mut data).unwrap();
        assert_ne!(&data, b"block payload");

        ctx.init(&KEY, Direction::Decrypt).unwrap();
        ctx.open_in_place(&IV, &mut data, &tag).unwrap();
        assert_eq!(&data, b"block payload");
    }

    #[test]
    fn context_is_single_use() {
        let mut ctx = AeadContext::new();
        ctx.init(&KEY, Direction::Encrypt).unwrap();

        let mut data = [0u8; 8];
        ctx.seal_in_place(&IV, &mut data).unwrap();
        assert!(!ctx.is_initialized());
        assert!(matches!(
            ctx.seal_in_place(&IV, &mut data),
            Err(CryptoError::ContextNotInitialized)
        ));
    }

    #[test]
    fn uninitialized_context_rejected() {
        let mut ctx = AeadContext::new();
        let mut data = [0u8; 8];
        assert!(matches!(
            ctx.seal_in_place(&IV, &mut data),
            Err(CryptoError::ContextNotInitialized)
        ));
    }

    #[test]
    fn direction_is_enforced() {
        let mut ctx = AeadContext::new();
        ctx.init(&KEY, Direction::Encrypt).unwrap();

        let mut data = [0u8; 8];
        let err = ctx.open_in_place(&IV, &mut data, &[0u8; TAG_SIZE]).unwrap_err();
        assert!(matches!(err, CryptoError::DirectionMismatch { .. }));
        // The failed call did not consume the initialized state.
        assert!(ctx.is_initialized());
    }

    #[test]
    fn short_key_rejected() {
        let mut ctx = AeadContext::new();
        assert!(matches!(
            ctx.init(&[0u8; 16], Direction::Encrypt),
            Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: 16
            })
        ));
    }

    #[test]
    fn wrong_tag_fails_authentication() {
        let mut ctx = AeadContext::new();

        let mut data = *b"sensitive";
        ctx.init(&KEY, Direction::Encrypt).unwrap();
        let mut tag = ctx.seal_in_place(&IV, &mut data).unwrap();
        tag[0] ^= 0x01;

        ctx.init(&KEY, Direction::Decrypt).unwrap();
        assert!(matches!(
            ctx.open_in_place(&IV, &mut data, &tag),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn reset_clears_state() {
        let mut ctx = AeadContext::new();
        ctx.init(&KEY, Direction::Encrypt).unwrap();
        assert!(ctx.is_initialized());
        ctx.reset();
        assert!(!ctx.is_initialized());
    }
}
