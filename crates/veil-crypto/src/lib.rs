//! # Veil Crypto
//!
//! Encryption layer between a built trusted operation and the socket.
//!
//! - [`shielding`]: the enclave's RSA-OAEP (SHA-256, no label) shielding key
//! - [`aes`]: AES-256-GCM session encryption, tag appended to the ciphertext
//! - [`envelope`]: `RsaRequest` and `AesRequest` builders
//!
//! Only lengths are ever logged from this crate.

pub mod aes;
pub mod envelope;
pub mod error;
pub mod shielding;

pub use aes::{aes_unwrap, aes_wrap, aes_wrap_with, AesKey, AES_KEY_LEN, AES_TAG_LEN};
pub use envelope::{build_aes_request, build_rsa_request};
pub use error::{CryptoError, Result};
pub use shielding::{rsa_unwrap, rsa_wrap, ShieldingKey};

// For callers holding the private half, such as a mock enclave
pub use rsa::{RsaPrivateKey, RsaPublicKey};
