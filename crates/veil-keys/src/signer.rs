//! The [`Signer`] enum
//!
//! One closed set of schemes behind a single interface. Every scheme signs the raw
//! message bytes except Bitcoin, which signs the lowercase hex of the message
//! without a `0x` prefix. [`Signer::signing_input`] exposes exactly what reaches the
//! scheme's primitive.

use rand::RngCore;
use std::borrow::Cow;
use std::fmt;
use tracing::trace;
use veil_types::{blake2_256, AccountId, Address20, Address32, Address33, Identity, MultiSignature};
use zeroize::Zeroizing;

use crate::bitcoin::BitcoinKey;
use crate::error::{KeyError, Result};
use crate::ethereum::EthereumKey;
use crate::scheme::SchemeTag;
use crate::ss58::ss58_encode;
use crate::substrate::{EcdsaKey, Ed25519Key, Sr25519Key};

/// Key material for one identity under one scheme
pub enum Signer {
    Sr25519(Sr25519Key),
    Ed25519(Ed25519Key),
    Ecdsa(EcdsaKey),
    Ethereum(EthereumKey),
    Bitcoin(BitcoinKey),
}

impl Signer {
    /// Deterministic signer from a 32-byte seed
    pub fn from_seed(scheme: SchemeTag, seed: &[u8; 32]) -> Result<Self> {
        Ok(match scheme {
            SchemeTag::Sr25519 => Signer::Sr25519(Sr25519Key::from_seed(seed)?),
            SchemeTag::Ed25519 => Signer::Ed25519(Ed25519Key::from_seed(seed)),
            SchemeTag::Ecdsa => Signer::Ecdsa(EcdsaKey::from_seed(seed)?),
            SchemeTag::Ethereum => Signer::Ethereum(EthereumKey::from_seed(seed)?),
            SchemeTag::Bitcoin => Signer::Bitcoin(BitcoinKey::from_seed(seed)?),
        })
    }

    /// Random signer
    pub fn generate(scheme: SchemeTag) -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; 32]);
        // out-of-range secp256k1 scalars are redrawn
        for _ in 0..8 {
            rand::thread_rng().fill_bytes(&mut seed[..]);
            match Self::from_seed(scheme, &seed) {
                Err(KeyError::InvalidSeed(_)) => continue,
                other => return other,
            }
        }
        Err(KeyError::InvalidSeed("could not draw a valid random seed".to_string()))
    }

    /// Parse `"<scheme>:<hex seed>"`, e.g. `sr25519:0x0101...`
    pub fn from_key_str(key: &str) -> Result<Self> {
        let (scheme, seed_hex) = key
            .split_once(':')
            .ok_or_else(|| KeyError::InvalidSeed("expected <scheme>:<hex seed>".to_string()))?;
        let scheme: SchemeTag = scheme.parse()?;

        let bytes = Zeroizing::new(hex::decode(seed_hex.strip_prefix("0x").unwrap_or(seed_hex))?);
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| KeyError::InvalidSeed(format!("seed must be 32 bytes, got {}", bytes.len())))?,
        );
        Self::from_seed(scheme, &seed)
    }

    pub fn scheme(&self) -> SchemeTag {
        match self {
            Signer::Sr25519(_) => SchemeTag::Sr25519,
            Signer::Ed25519(_) => SchemeTag::Ed25519,
            Signer::Ecdsa(_) => SchemeTag::Ecdsa,
            Signer::Ethereum(_) => SchemeTag::Ethereum,
            Signer::Bitcoin(_) => SchemeTag::Bitcoin,
        }
    }

    /// Raw address bytes: public key for Substrate curves and Bitcoin, 20-byte
    /// address for Ethereum
    pub fn address(&self) -> Vec<u8> {
        match self {
            Signer::Sr25519(k) => k.public().to_vec(),
            Signer::Ed25519(k) => k.public().to_vec(),
            Signer::Ecdsa(k) => k.public().to_vec(),
            Signer::Ethereum(k) => k.address().to_vec(),
            Signer::Bitcoin(k) => k.public().to_vec(),
        }
    }

    /// Identity this key signs for
    pub fn identity(&self) -> Identity {
        match self {
            Signer::Sr25519(k) => Identity::Substrate(Address32(k.public())),
            Signer::Ed25519(k) => Identity::Substrate(Address32(k.public())),
            // Substrate ecdsa accounts are the blake2 hash of the compressed key
            Signer::Ecdsa(k) => Identity::Substrate(Address32(blake2_256(&k.public()))),
            Signer::Ethereum(k) => Identity::Evm(Address20(k.address())),
            Signer::Bitcoin(k) => Identity::Bitcoin(Address33(k.public())),
        }
    }

    /// Chain-local account id, translated from the foreign scheme where needed
    pub fn chain_account(&self) -> AccountId {
        let identity = self.identity();
        identity
            .to_native_account()
            .unwrap_or_else(|| identity.to_omni_account())
    }

    /// SS58 text of [`Signer::chain_account`] for a network prefix
    pub fn chain_address(&self, network_prefix: u16) -> String {
        ss58_encode(&self.chain_account(), network_prefix)
    }

    /// Bytes handed to the scheme's signing primitive for `message`
    pub fn signing_input<'a>(&self, message: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Signer::Bitcoin(_) => Cow::Owned(hex::encode(message).into_bytes()),
            _ => Cow::Borrowed(message),
        }
    }

    /// Sign `message` under this signer's scheme
    pub async fn sign(&self, message: &[u8]) -> Result<MultiSignature> {
        let input = self.signing_input(message);
        trace!(scheme = %self.scheme(), len = input.len(), "Signing message");

        Ok(match self {
            Signer::Sr25519(k) => MultiSignature::Sr25519(k.sign(&input)),
            Signer::Ed25519(k) => MultiSignature::Ed25519(k.sign(&input)),
            Signer::Ecdsa(k) => MultiSignature::Ecdsa(k.sign(&input)?),
            Signer::Ethereum(k) => MultiSignature::Ethereum(k.sign(&input)?),
            Signer::Bitcoin(k) => MultiSignature::Bitcoin(k.sign(&input)?),
        })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("scheme", &self.scheme())
            .field("identity", &self.identity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitcoin::signed_message_hash;
    use crate::ethereum::personal_message_hash;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    fn signer(scheme: SchemeTag) -> Signer {
        Signer::from_seed(scheme, &[42; 32]).unwrap()
    }

    #[test]
    fn test_only_bitcoin_transforms_message() {
        let message = [0x01u8, 0xab, 0xff];
        for scheme in SchemeTag::ALL {
            let input = signer(scheme).signing_input(&message).into_owned();
            if scheme == SchemeTag::Bitcoin {
                assert_eq!(input, b"01abff".to_vec());
            } else {
                assert_eq!(input, message.to_vec(), "{}", scheme);
            }
        }
    }

    #[tokio::test]
    async fn test_bitcoin_signs_hex_without_prefix() {
        let signer = signer(SchemeTag::Bitcoin);
        let sig = signer.sign(&[0xde, 0xad]).await.unwrap();
        let MultiSignature::Bitcoin(bytes) = sig else {
            panic!("expected bitcoin signature");
        };

        let signature = Signature::from_slice(&bytes[1..]).unwrap();
        let recovery_id = RecoveryId::from_byte(bytes[0] - 31).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&signed_message_hash(b"dead"), &signature, recovery_id)
                .unwrap();
        assert_eq!(recovered.to_encoded_point(true).as_bytes(), signer.address().as_slice());
    }

    #[tokio::test]
    async fn test_ethereum_signs_raw_bytes() {
        let signer = signer(SchemeTag::Ethereum);
        let sig = signer.sign(&[0xde, 0xad]).await.unwrap();
        let MultiSignature::Ethereum(bytes) = sig else {
            panic!("expected ethereum signature");
        };

        let signature = Signature::from_slice(&bytes[..64]).unwrap();
        let recovery_id = RecoveryId::from_byte(bytes[64] - 27).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&personal_message_hash(&[0xde, 0xad]), &signature, recovery_id)
                .unwrap();
        let hash = crate::ethereum::keccak256(&recovered.to_encoded_point(false).as_bytes()[1..]);
        assert_eq!(&hash[12..], signer.address().as_slice());
    }

    #[tokio::test]
    async fn test_signature_variant_matches_scheme() {
        for scheme in SchemeTag::ALL {
            let sig = signer(scheme).sign(b"m").await.unwrap();
            let expected = match scheme {
                SchemeTag::Sr25519 => "sr25519",
                SchemeTag::Ed25519 => "ed25519",
                SchemeTag::Ecdsa => "ecdsa",
                SchemeTag::Ethereum => "ethereum",
                SchemeTag::Bitcoin => "bitcoin",
            };
            assert_eq!(sig.scheme_name(), expected);
        }
    }

    #[test]
    fn test_identity_and_chain_account() {
        let sr = signer(SchemeTag::Sr25519);
        assert_eq!(sr.chain_account().to_vec(), sr.address());

        let eth = signer(SchemeTag::Ethereum);
        let mut data = b"evm:".to_vec();
        data.extend_from_slice(&eth.address());
        assert_eq!(eth.chain_account(), blake2_256(&data));

        let btc = signer(SchemeTag::Bitcoin);
        assert_eq!(btc.chain_account(), btc.identity().to_omni_account());

        let ecdsa = signer(SchemeTag::Ecdsa);
        assert_eq!(ecdsa.address().len(), 33);
        assert_eq!(ecdsa.chain_account(), blake2_256(&ecdsa.address()));
        assert!(ecdsa.chain_address(42).starts_with('5'));
    }

    #[test]
    fn test_from_key_str() {
        let key = format!("ed25519:0x{}", hex::encode([42u8; 32]));
        let parsed = Signer::from_key_str(&key).unwrap();
        assert_eq!(parsed.scheme(), SchemeTag::Ed25519);
        assert_eq!(parsed.address(), signer(SchemeTag::Ed25519).address());

        assert!(matches!(
            Signer::from_key_str("schnorr:00"),
            Err(KeyError::UnsupportedScheme(_))
        ));
        assert!(matches!(Signer::from_key_str("sr25519:0x0102"), Err(KeyError::InvalidSeed(_))));
    }

    #[test]
    fn test_generate_produces_distinct_keys() {
        let a = Signer::generate(SchemeTag::Sr25519).unwrap();
        let b = Signer::generate(SchemeTag::Sr25519).unwrap();
        assert_ne!(a.address(), b.address());
    }
}
