//! Substrate signers: sr25519, ed25519 and ecdsa

use ed25519_dalek::Signer as _;
use k256::ecdsa::SigningKey as EcdsaSigningKey;
use schnorrkel::{signing_context, ExpansionMode, Keypair, MiniSecretKey};
use veil_types::blake2_256;

use crate::error::{KeyError, Result};
use crate::secp256k1;

/// Signing context used by Substrate for sr25519
pub const SR25519_SIGNING_CONTEXT: &[u8] = b"substrate";

pub struct Sr25519Key {
    keypair: Keypair,
}

impl Sr25519Key {
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        let mini = MiniSecretKey::from_bytes(seed).map_err(|e| KeyError::InvalidSeed(e.to_string()))?;
        Ok(Self {
            keypair: mini.expand_to_keypair(ExpansionMode::Ed25519),
        })
    }

    pub fn public(&self) -> [u8; 32] {
        self.keypair.public.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let context = signing_context(SR25519_SIGNING_CONTEXT);
        self.keypair.sign(context.bytes(message)).to_bytes()
    }
}

pub struct Ed25519Key {
    key: ed25519_dalek::SigningKey,
}

impl Ed25519Key {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    pub fn public(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

/// Substrate ecdsa: recoverable secp256k1 over `blake2_256(message)`
pub struct EcdsaKey {
    key: EcdsaSigningKey,
}

impl EcdsaKey {
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        Ok(Self {
            key: secp256k1::signing_key_from_seed(seed)?,
        })
    }

    /// Compressed public key
    pub fn public(&self) -> [u8; 33] {
        secp256k1::compressed_public(self.key.verifying_key())
    }

    /// `r ‖ s ‖ recovery_id`
    pub fn sign(&self, message: &[u8]) -> Result<[u8; 65]> {
        let (compact, recovery_id) = secp256k1::sign_recoverable(&self.key, &blake2_256(message))?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id;
        Ok(out)
    }
}
