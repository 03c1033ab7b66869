//! # NeonFS Secure Memory
//!
//! Secure memory substrate for NeonFS.
//!
//! All sensitive bytes in NeonFS (keys, plaintexts, derived secrets) live in
//! containers backed by a process-wide secure heap. The heap is initialized
//! once at startup with a fixed budget; containers charge their capacity
//! against that budget and overwrite their memory with zeroes before
//! releasing it.
//!
//! ## Components
//!
//! - [`heap`] - The process-wide secure heap: initialization, teardown,
//!   capacity accounting
//! - [`SecureBytes`] - A resizable byte buffer charged against the heap and
//!   zeroized on every release
//! - [`SecureString`] - A UTF-8 string with the same discipline, for
//!   passwords and passphrases
//!
//! ## Example
//!
//! ```rust
//! use neonfs_secure::{heap, SecureBytes};
//!
//! let _ = heap::initialize_default();
//! let mut key = SecureBytes::from_slice(&[0x42; 32]).unwrap();
//! assert_eq!(key.len(), 32);
//! key.resize(16).unwrap(); // truncated tail is wiped before release
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bytes;
mod error;
pub mod heap;
mod string;

pub use bytes::SecureBytes;
pub use error::{SecureError, SecureResult};
pub use heap::SecureHeapConfig;
pub use string::SecureString;
