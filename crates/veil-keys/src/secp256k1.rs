//! secp256k1 helpers shared by the ecdsa, Ethereum and Bitcoin signers

use k256::ecdsa::{SigningKey, VerifyingKey};

use crate::error::{KeyError, Result};

pub(crate) fn signing_key_from_seed(seed: &[u8; 32]) -> Result<SigningKey> {
    SigningKey::from_slice(seed).map_err(|e| KeyError::InvalidSeed(e.to_string()))
}

/// Sign a 32-byte digest. Returns the low-S compact signature and the recovery id.
pub(crate) fn sign_recoverable(key: &SigningKey, prehash: &[u8; 32]) -> Result<([u8; 64], u8)> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(prehash)
        .map_err(|e| KeyError::Signing(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact.copy_from_slice(&signature.to_bytes());
    Ok((compact, recovery_id.to_byte()))
}

/// 33-byte SEC1 compressed public key
pub(crate) fn compressed_public(key: &VerifyingKey) -> [u8; 33] {
    let point = key.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(point.as_bytes());
    out
}

/// 64-byte uncompressed public key without the SEC1 tag
pub(crate) fn uncompressed_public(key: &VerifyingKey) -> [u8; 64] {
    let point = key.to_encoded_point(false);
    let mut out = [0u8; 64];
    out.copy_from_slice(&point.as_bytes()[1..]);
    out
}
