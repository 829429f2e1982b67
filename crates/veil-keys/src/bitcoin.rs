//! Bitcoin signed-message signer
//!
//! The verifier expects the signed text to be the lowercase hex of the payload
//! without a `0x` prefix; the hex transform happens in [`crate::Signer::signing_input`].

use k256::ecdsa::SigningKey;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::secp256k1;

const BITCOIN_MESSAGE_MAGIC: &[u8] = b"\x18Bitcoin Signed Message:\n";

/// Header offset for a compact signature made with a compressed key
const COMPRESSED_HEADER: u8 = 27 + 4;

fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Bitcoin compact-size integer
fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Digest signed by `signmessage`
pub fn signed_message_hash(message: &[u8]) -> [u8; 32] {
    let mut data = Vec::with_capacity(BITCOIN_MESSAGE_MAGIC.len() + 9 + message.len());
    data.extend_from_slice(BITCOIN_MESSAGE_MAGIC);
    write_varint(&mut data, message.len() as u64);
    data.extend_from_slice(message);
    sha256d(&data)
}

pub struct BitcoinKey {
    key: SigningKey,
}

impl BitcoinKey {
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        Ok(Self {
            key: secp256k1::signing_key_from_seed(seed)?,
        })
    }

    /// Compressed public key
    pub fn public(&self) -> [u8; 33] {
        secp256k1::compressed_public(self.key.verifying_key())
    }

    /// `header ‖ r ‖ s` with `header = 31 + recovery_id`
    pub fn sign(&self, message: &[u8]) -> Result<[u8; 65]> {
        let (compact, recovery_id) = secp256k1::sign_recoverable(&self.key, &signed_message_hash(message))?;
        let mut out = [0u8; 65];
        out[0] = COMPRESSED_HEADER + recovery_id;
        out[1..].copy_from_slice(&compact);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    #[test]
    fn test_varint_boundaries() {
        let mut out = Vec::new();
        write_varint(&mut out, 0xfc);
        assert_eq!(out, vec![0xfc]);

        let mut out = Vec::new();
        write_varint(&mut out, 0xfd);
        assert_eq!(out, vec![0xfd, 0xfd, 0x00]);

        let mut out = Vec::new();
        write_varint(&mut out, 0x1_0000);
        assert_eq!(out, vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_compact_signature_recovers() {
        let key = BitcoinKey::from_seed(&[5; 32]).unwrap();
        let sig = key.sign(b"deadbeef").unwrap();
        assert!((31..=34).contains(&sig[0]));

        let signature = Signature::from_slice(&sig[1..]).unwrap();
        let recovery_id = RecoveryId::from_byte(sig[0] - COMPRESSED_HEADER).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&signed_message_hash(b"deadbeef"), &signature, recovery_id)
                .unwrap();
        assert_eq!(secp256k1::compressed_public(&recovered), key.public());
    }
}
