//! Error types for cryptographic operations.

use neonfs_secure::SecureError;
use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the NeonFS encryption layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A key had the wrong length.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// An IV had the wrong length.
    #[error("invalid IV size: expected {expected} bytes, got {actual}")]
    InvalidIvSize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// An authentication tag had the wrong length.
    #[error("invalid tag size: expected {expected} bytes, got {actual}")]
    InvalidTagSize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// Tag verification failed during decryption.
    #[error("authentication failed: tag mismatch or corrupted ciphertext")]
    AuthenticationFailed,

    /// A cipher context was used before initialization or after its one
    /// permitted operation.
    #[error("cipher context is not initialized")]
    ContextNotInitialized,

    /// A cipher context was used against its initialized direction.
    #[error("cipher context initialized for {expected}, used for {actual}")]
    DirectionMismatch {
        /// Direction the context was initialized for.
        expected: crate::Direction,
        /// Direction the operation asked for.
        actual: crate::Direction,
    },

    /// The underlying cipher failed outside of tag verification.
    #[error("cipher operation failed: {message}")]
    CipherFailed {
        /// Description of the failure.
        message: String,
    },

    /// An invalid parameter was passed to the key manager.
    #[error("invalid key manager parameter: {message}")]
    InvalidParameter {
        /// Description of the parameter issue.
        message: String,
    },

    /// Key derivation failed.
    #[error("key derivation failed: {message}")]
    KeyDerivationFailed {
        /// Description of the failure.
        message: String,
    },

    /// Secure memory error.
    #[error("secure memory error: {0}")]
    Secure(#[from] SecureError),
}

impl CryptoError {
    /// Creates a cipher failure error.
    pub fn cipher_failed(message: impl Into<String>) -> Self {
        Self::CipherFailed {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a key derivation failure error.
    pub fn key_derivation_failed(message: impl Into<String>) -> Self {
        Self::KeyDerivationFailed {
            message: message.into(),
        }
    }
}
