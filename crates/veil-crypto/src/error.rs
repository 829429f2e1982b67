//! Crypto error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("RSA encryption failed: {0}")]
    RsaWrap(String),

    #[error("RSA decryption failed: {0}")]
    RsaUnwrap(String),

    /// Tag mismatch, tampered ciphertext or truncated tag
    #[error("AES-GCM authentication failed")]
    AuthenticationFailed,

    #[error("AES error: {0}")]
    Aes(String),

    #[error("Invalid shielding key: {0}")]
    InvalidShieldingKey(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
