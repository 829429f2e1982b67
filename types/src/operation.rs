//! Trusted operations
//!
//! ```text
//! TrustedOperation
//! ├── IndirectCall(TrustedCallSigned)   index 0
//! ├── DirectCall(TrustedCallSigned)     index 1
//! └── Get(Getter)                       index 2
//!       ├── Public(PublicGetter)        index 0
//!       └── Trusted(TrustedGetterSigned) index 1
//! ```
//!
//! Calls and getters are carried as a variant index plus already-encoded arguments,
//! so the client does not need to know the business semantics of any individual call.

use parity_scale_codec::{Encode, Output};

use crate::codec::{blake2_256, to_hex};
use crate::signature::MultiSignature;
use crate::{Nonce, H256};

macro_rules! invocation {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        ///
        /// Encodes as the variant index byte followed by the argument bytes.
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name {
            variant: u8,
            args: Vec<u8>,
        }

        impl $name {
            /// From a variant index and SCALE-encodable arguments
            pub fn new<A: Encode>(variant: u8, args: &A) -> Self {
                Self {
                    variant,
                    args: args.encode(),
                }
            }

            /// From a variant index and pre-encoded argument bytes
            pub fn from_encoded_args(variant: u8, args: Vec<u8>) -> Self {
                Self { variant, args }
            }

            pub fn variant(&self) -> u8 {
                self.variant
            }

            pub fn args(&self) -> &[u8] {
                &self.args
            }
        }

        impl Encode for $name {
            fn size_hint(&self) -> usize {
                1 + self.args.len()
            }

            fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
                dest.push_byte(self.variant);
                dest.write(&self.args);
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("variant", &self.variant)
                    .field("args_len", &self.args.len())
                    .finish()
            }
        }
    };
}

invocation!(TrustedCall, "State-mutating call executed inside the enclave");
invocation!(TrustedGetter, "Read-only query that requires the caller's signature");
invocation!(PublicGetter, "Read-only query that needs no signature");

/// A call bound to a nonce and signed by its sender
#[derive(Debug, Clone, PartialEq, Eq, Encode)]
pub struct TrustedCallSigned {
    pub call: TrustedCall,
    pub nonce: Nonce,
    pub signature: MultiSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode)]
pub struct TrustedGetterSigned {
    pub getter: TrustedGetter,
    pub signature: MultiSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode)]
pub enum Getter {
    #[codec(index = 0)]
    Public(PublicGetter),
    #[codec(index = 1)]
    Trusted(TrustedGetterSigned),
}

impl From<PublicGetter> for Getter {
    fn from(item: PublicGetter) -> Self {
        Getter::Public(item)
    }
}

impl From<TrustedGetterSigned> for Getter {
    fn from(item: TrustedGetterSigned) -> Self {
        Getter::Trusted(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode)]
pub enum TrustedOperation {
    #[codec(index = 0)]
    IndirectCall(TrustedCallSigned),
    #[codec(index = 1)]
    DirectCall(TrustedCallSigned),
    #[codec(index = 2)]
    Get(Getter),
}

impl TrustedOperation {
    /// Top hash: blake2_256 of the encoded operation. The worker reports it back in
    /// `TrustedOperationStatus` replies.
    pub fn hash(&self) -> H256 {
        blake2_256(&self.encode())
    }

    pub fn hash_hex(&self) -> String {
        to_hex(&self.hash())
    }

    pub fn is_call(&self) -> bool {
        !matches!(self, TrustedOperation::Get(_))
    }
}

impl From<Getter> for TrustedOperation {
    fn from(item: Getter) -> Self {
        TrustedOperation::Get(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_call() -> TrustedCallSigned {
        TrustedCallSigned {
            call: TrustedCall::new(7, &(1u8, 2u32)),
            nonce: 5,
            signature: MultiSignature::Ed25519([0; 64]),
        }
    }

    #[test]
    fn test_call_encoding_is_index_then_args() {
        let call = TrustedCall::new(7, &(1u8, 2u32));
        assert_eq!(call.encode(), vec![7, 1, 2, 0, 0, 0]);
        assert_eq!(call.size_hint(), 6);
    }

    #[test]
    fn test_signed_call_layout() {
        let encoded = dummy_call().encode();
        // call (6) + nonce (4) + signature (1 + 64)
        assert_eq!(encoded.len(), 6 + 4 + 65);
        assert_eq!(&encoded[6..10], &5u32.to_le_bytes());
    }

    #[test]
    fn test_operation_indices() {
        assert_eq!(TrustedOperation::IndirectCall(dummy_call()).encode()[0], 0);
        assert_eq!(TrustedOperation::DirectCall(dummy_call()).encode()[0], 1);

        let getter: Getter = PublicGetter::new(1, &[9u8; 4]).into();
        let op = TrustedOperation::from(getter);
        assert_eq!(&op.encode()[..3], &[2, 0, 1]);
        assert!(!op.is_call());
    }

    #[test]
    fn test_top_hash_differs_per_kind() {
        let direct = TrustedOperation::DirectCall(dummy_call());
        let indirect = TrustedOperation::IndirectCall(dummy_call());
        assert_ne!(direct.hash(), indirect.hash());
        assert_eq!(direct.hash(), blake2_256(&direct.encode()));
        assert!(direct.hash_hex().starts_with("0x"));
    }
}
