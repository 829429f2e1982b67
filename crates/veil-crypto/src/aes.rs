//! AES-256-GCM session encryption
//!
//! The 16-byte tag is appended to the ciphertext, matching the enclave's framing:
//!
//! ```text
//! AesOutput.ciphertext = ct ‖ tag(16)
//! AesOutput.nonce      = 12 random bytes
//! AesOutput.aad        = empty by default
//! ```

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use std::fmt;
use veil_types::{AesOutput, AES_NONCE_LEN};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, Result};

/// GCM authentication tag length
pub const AES_TAG_LEN: usize = 16;

/// AES-256 key length
pub const AES_KEY_LEN: usize = 32;

/// Symmetric session key. Read-only once created; zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AesKey([u8; AES_KEY_LEN]);

impl AesKey {
    pub fn generate() -> Self {
        let mut key = [0u8; AES_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }

    pub fn from_bytes(bytes: [u8; AES_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_LEN] {
        &self.0
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.0).map_err(|e| CryptoError::Aes(e.to_string()))
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey(<redacted>)")
    }
}

/// Encrypt with a fresh random nonce and empty aad
pub fn aes_wrap(key: &AesKey, plaintext: &[u8]) -> Result<AesOutput> {
    let mut nonce = [0u8; AES_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    aes_wrap_with(key, nonce, Vec::new(), plaintext)
}

/// Encrypt with an explicit nonce and aad
pub fn aes_wrap_with(
    key: &AesKey,
    nonce: [u8; AES_NONCE_LEN],
    aad: Vec<u8>,
    plaintext: &[u8],
) -> Result<AesOutput> {
    let ciphertext = key
        .cipher()?
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|e| CryptoError::Aes(e.to_string()))?;

    Ok(AesOutput {
        ciphertext,
        aad,
        nonce,
    })
}

/// Decrypt and authenticate. The trailing 16 bytes of `ciphertext` are the tag.
pub fn aes_unwrap(key: &AesKey, output: &AesOutput) -> Result<Vec<u8>> {
    if output.ciphertext.len() < AES_TAG_LEN {
        return Err(CryptoError::AuthenticationFailed);
    }

    key.cipher()?
        .decrypt(
            Nonce::from_slice(&output.nonce),
            Payload {
                msg: &output.ciphertext,
                aad: &output.aad,
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailed)
}
