//! Master-key generation and password-based key derivation.
//!
//! The master key handed to an [`AesGcmProvider`](crate::AesGcmProvider)
//! typically originates here: either generated at random or derived from a
//! password with PBKDF2. Every output is a [`SecureBytes`], so derived
//! material is wiped when dropped.

use hmac::Hmac;
use rand::RngCore;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use neonfs_secure::SecureBytes;

use crate::error::{CryptoError, CryptoResult};

/// Default PBKDF2 iteration count.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
/// Largest master key this module will generate, in bytes.
pub const MAX_MASTER_KEY_SIZE: usize = 512;
/// Largest salt this module will generate, in bytes.
pub const MAX_SALT_SIZE: usize = 64;
/// Largest derived key accepted for password verification, in bytes.
pub const MAX_VERIFIED_KEY_SIZE: usize = 64;

/// PBKDF2 pseudo-random function choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    /// PBKDF2 with HMAC-SHA-256.
    Pbkdf2HmacSha256,
    /// PBKDF2 with HMAC-SHA-512.
    Pbkdf2HmacSha512,
}

/// Generates a random master key of `size` bytes.
///
/// # Errors
///
/// Fails unless `1 <= size <= 512`, or if secure memory is unavailable.
pub fn generate_master_key(size: usize) -> CryptoResult<SecureBytes> {
    if size == 0 || size > MAX_MASTER_KEY_SIZE {
        return Err(CryptoError::invalid_parameter(format!(
            "master key size must be 1..={MAX_MASTER_KEY_SIZE} bytes, got {size}"
        )));
    }
    let mut key = SecureBytes::zeroed(size)?;
    rand::thread_rng().fill_bytes(key.as_mut_slice());
    Ok(key)
}

/// Generates a random salt of `size` bytes.
///
/// # Errors
///
/// Fails unless `1 <= size <= 64`, or if secure memory is unavailable.
pub fn generate_salt(size: usize) -> CryptoResult<SecureBytes> {
    if size == 0 || size > MAX_SALT_SIZE {
        return Err(CryptoError::invalid_parameter(format!(
            "salt size must be 1..={MAX_SALT_SIZE} bytes, got {size}"
        )));
    }
    let mut salt = SecureBytes::zeroed(size)?;
    rand::thread_rng().fill_bytes(salt.as_mut_slice());
    Ok(salt)
}

/// Derives a key of `size` bytes from `password` and `salt` with PBKDF2.
///
/// # Errors
///
/// Fails on an empty password or salt, a zero output size, or a zero
/// iteration count.
pub fn derive_key(
    password: &SecureBytes,
    salt: &SecureBytes,
    size: usize,
    algorithm: KeyDerivation,
    iterations: u32,
) -> CryptoResult<SecureBytes> {
    if password.is_empty() || salt.is_empty() || size == 0 {
        return Err(CryptoError::invalid_parameter(
            "password, salt and derived key size must be non-empty",
        ));
    }
    if iterations == 0 {
        return Err(CryptoError::invalid_parameter(
            "PBKDF2 iteration count must be at least 1",
        ));
    }

    let mut derived = SecureBytes::zeroed(size)?;
    let result = match algorithm {
        KeyDerivation::Pbkdf2HmacSha256 => pbkdf2::pbkdf2::<Hmac<Sha256>>(
            password.as_slice(),
            salt.as_slice(),
            iterations,
            derived.as_mut_slice(),
        ),
        KeyDerivation::Pbkdf2HmacSha512 => pbkdf2::pbkdf2::<Hmac<Sha512>>(
            password.as_slice(),
            salt.as_slice(),
            iterations,
            derived.as_mut_slice(),
        ),
    };
    result.map_err(|e| CryptoError::key_derivation_failed(format!("PBKDF2 ({algorithm:?}): {e}")))?;
    Ok(derived)
}

/// Re-derives a key from `password` and compares it to `expected` in
/// constant time.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a clean mismatch.
///
/// # Errors
///
/// Fails on an empty password or salt, or an `expected` key outside
/// `1..=64` bytes.
pub fn verify_password(
    password: &SecureBytes,
    salt: &SecureBytes,
    expected: &SecureBytes,
    algorithm: KeyDerivation,
    iterations: u32,
) -> CryptoResult<bool> {
    if expected.is_empty() || expected.len() > MAX_VERIFIED_KEY_SIZE {
        return Err(CryptoError::invalid_parameter(format!(
            "expected derived key must be 1..={MAX_VERIFIED_KEY_SIZE} bytes, got {}",
            expected.len()
        )));
    }

    let derived = derive_key(password, salt, expected.len(), algorithm, iterations)?;
    Ok(derived
        .as_slice()
        .ct_eq(expected.as_slice())
        .into())
}
