//! Multi-scheme signature

use parity_scale_codec::{Decode, Encode};
use std::fmt;

use crate::codec::to_hex;

/// Signature produced by one of the supported schemes.
///
/// The secp256k1 variants carry 65 bytes: the 64-byte compact signature plus the
/// recovery byte in the position each scheme expects.
#[derive(Clone, PartialEq, Eq, Encode, Decode)]
pub enum MultiSignature {
    #[codec(index = 0)]
    Ed25519([u8; 64]),
    #[codec(index = 1)]
    Sr25519([u8; 64]),
    #[codec(index = 2)]
    Ecdsa([u8; 65]),
    #[codec(index = 3)]
    Ethereum([u8; 65]),
    #[codec(index = 4)]
    Bitcoin([u8; 65]),
}

impl MultiSignature {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MultiSignature::Ed25519(sig) | MultiSignature::Sr25519(sig) => &sig[..],
            MultiSignature::Ecdsa(sig) | MultiSignature::Ethereum(sig) | MultiSignature::Bitcoin(sig) => {
                &sig[..]
            }
        }
    }

    pub fn scheme_name(&self) -> &'static str {
        match self {
            MultiSignature::Ed25519(_) => "ed25519",
            MultiSignature::Sr25519(_) => "sr25519",
            MultiSignature::Ecdsa(_) => "ecdsa",
            MultiSignature::Ethereum(_) => "ethereum",
            MultiSignature::Bitcoin(_) => "bitcoin",
        }
    }
}

impl fmt::Debug for MultiSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.scheme_name(), to_hex(self.as_bytes()))
    }
}
