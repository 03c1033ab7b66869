//! # NeonFS Crypto
//!
//! Authenticated block encryption for NeonFS.
//!
//! This crate provides the AEAD layer between callers and the block storage:
//! AES-256-GCM with a 12-byte IV and a 16-byte detached authentication tag.
//! Cipher contexts are pooled so concurrent encryption operations amortize
//! setup cost while the peak context count stays bounded.
//!
//! ## Components
//!
//! - [`AeadContext`] - A single-use AES-256-GCM cipher state
//! - [`ContextPool`] / [`PoolHandle`] - Bounded pool of contexts with
//!   blocking acquisition
//! - [`EncryptionProvider`] / [`AesGcmProvider`] - The encrypt/decrypt
//!   service, keyed once at construction
//! - [`keys`] - Master-key and salt generation, PBKDF2 derivation, and
//!   constant-time password verification
//!
//! All sensitive buffers crossing this crate's boundary are
//! [`SecureBytes`](neonfs_secure::SecureBytes): the secure heap must be
//! initialized before use.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod error;
pub mod keys;
mod pool;
mod provider;

pub use context::{AeadContext, Direction, IV_SIZE, KEY_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use pool::{ContextPool, PoolHandle};
pub use provider::{AesGcmProvider, EncryptionProvider, DEFAULT_POOL_SIZE};
