//! Ethereum personal-message signer (EIP-191)

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::error::Result;
use crate::secp256k1;

const EIP191_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Digest a wallet signs for `personal_sign(message)`
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let length = message.len().to_string();
    let mut data = Vec::with_capacity(EIP191_PREFIX.len() + length.len() + message.len());
    data.extend_from_slice(EIP191_PREFIX);
    data.extend_from_slice(length.as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

pub struct EthereumKey {
    key: SigningKey,
}

impl EthereumKey {
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        Ok(Self {
            key: secp256k1::signing_key_from_seed(seed)?,
        })
    }

    /// 20-byte address: last 20 bytes of keccak256 of the uncompressed key
    pub fn address(&self) -> [u8; 20] {
        let hash = keccak256(&secp256k1::uncompressed_public(self.key.verifying_key()));
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        out
    }

    /// `r ‖ s ‖ v` with `v = 27 + recovery_id`
    pub fn sign(&self, message: &[u8]) -> Result<[u8; 65]> {
        let (compact, recovery_id) =
            secp256k1::sign_recoverable(&self.key, &personal_message_hash(message))?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&compact);
        out[64] = 27 + recovery_id;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    #[test]
    fn test_known_address() {
        // private key 0x...01 maps to the well-known address 0x7e5f...bdf
        let mut seed = [0u8; 32];
        seed[31] = 1;
        let key = EthereumKey::from_seed(&seed).unwrap();
        assert_eq!(
            hex::encode(key.address()),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_signature_recovers_signer_address() {
        let key = EthereumKey::from_seed(&[3; 32]).unwrap();
        let sig = key.sign(b"hello").unwrap();
        assert!(sig[64] == 27 || sig[64] == 28);

        let signature = Signature::from_slice(&sig[..64]).unwrap();
        let recovery_id = RecoveryId::from_byte(sig[64] - 27).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&personal_message_hash(b"hello"), &signature, recovery_id)
                .unwrap();
        let hash = keccak256(&secp256k1::uncompressed_public(&recovered));
        assert_eq!(&hash[12..], &key.address());
    }
}
