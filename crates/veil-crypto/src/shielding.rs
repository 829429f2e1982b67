//! Enclave shielding key (RSA-OAEP, SHA-256, no label)

use parity_scale_codec::{Decode, Encode};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::{CryptoError, Result};

/// Key as published by the worker: JSON with little-endian modulus and exponent
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkerRsaKey {
    n: Vec<u8>,
    e: Vec<u8>,
}

/// The enclave's RSA public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldingKey {
    key: RsaPublicKey,
}

impl ShieldingKey {
    pub fn new(key: RsaPublicKey) -> Self {
        Self { key }
    }

    /// From big-endian modulus and exponent
    pub fn from_components(n: &[u8], e: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
            .map_err(|e| CryptoError::InvalidShieldingKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// From the JSON text the worker returns, `{"n":[..],"e":[..]}` little-endian
    pub fn from_worker_json(json: &str) -> Result<Self> {
        let raw: WorkerRsaKey =
            serde_json::from_str(json).map_err(|e| CryptoError::InvalidShieldingKey(e.to_string()))?;
        let key = RsaPublicKey::new(BigUint::from_bytes_le(&raw.n), BigUint::from_bytes_le(&raw.e))
            .map_err(|e| CryptoError::InvalidShieldingKey(e.to_string()))?;
        debug!(bits = key.size() * 8, "Parsed worker shielding key");
        Ok(Self { key })
    }

    /// From the `author_getShieldingKey` reply value: SCALE bytes wrapping the JSON
    pub fn from_worker_bytes(value: &[u8]) -> Result<Self> {
        let bytes = Vec::<u8>::decode(&mut &value[..])
            .map_err(|e| CryptoError::InvalidShieldingKey(e.to_string()))?;
        let json = String::from_utf8(bytes).map_err(|e| CryptoError::InvalidShieldingKey(e.to_string()))?;
        Self::from_worker_json(&json)
    }

    /// Inverse of [`ShieldingKey::from_worker_bytes`]
    pub fn to_worker_bytes(&self) -> Result<Vec<u8>> {
        let raw = WorkerRsaKey {
            n: self.key.n().to_bytes_le(),
            e: self.key.e().to_bytes_le(),
        };
        let json = serde_json::to_string(&raw).map_err(|e| CryptoError::InvalidShieldingKey(e.to_string()))?;
        Ok(json.into_bytes().encode())
    }

    /// Modulus size in bytes
    pub fn size(&self) -> usize {
        self.key.size()
    }

    /// Largest plaintext a single OAEP-SHA256 block can carry
    pub fn max_plaintext_len(&self) -> usize {
        self.size().saturating_sub(2 * 32 + 2)
    }

    pub fn inner(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl From<&RsaPrivateKey> for ShieldingKey {
    fn from(key: &RsaPrivateKey) -> Self {
        Self {
            key: RsaPublicKey::from(key),
        }
    }
}

/// Encrypt `plaintext` to the enclave
pub fn rsa_wrap(key: &ShieldingKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    key.key
        .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| CryptoError::RsaWrap(e.to_string()))
}

/// Decrypt with the private half of a shielding key
pub fn rsa_unwrap(key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    key.decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|e| CryptoError::RsaUnwrap(e.to_string()))
}
