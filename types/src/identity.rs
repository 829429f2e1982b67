//! Identity types
//!
//! An [`Identity`] is a chain-addressable principal. Web3 variants carry raw key or
//! address bytes; Web2 variants carry a handle. Wire indices are fixed and must match
//! the worker's codec:
//!
//! ```text
//! 0 Twitter   1 Discord   2 Github   3 Substrate(32)
//! 4 Evm(20)   5 Bitcoin(33)   6 Solana(32)   7 Email
//! ```

use parity_scale_codec::{Decode, Encode};
use std::fmt;

use crate::codec::{blake2_256, to_hex};
use crate::H256;

/// 32-byte chain account id
pub type AccountId = [u8; 32];

/// Prefix used by the EVM hashed address mapping
const EVM_ACCOUNT_PREFIX: &[u8] = b"evm:";

macro_rules! fixed_address {
    ($name:ident, $len:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl<'a> TryFrom<&'a [u8]> for $name {
            type Error = ();

            fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
                value.try_into().map(Self).map_err(|_| ())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), to_hex(&self.0))
            }
        }
    };
}

fixed_address!(Address20, 20, "20-byte EVM address");
fixed_address!(Address32, 32, "32-byte Substrate / Solana address");
fixed_address!(Address33, 33, "33-byte compressed secp256k1 public key (Bitcoin)");

/// Web2 handle bytes (username, email)
#[derive(Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct IdentityString(Vec<u8>);

impl IdentityString {
    pub fn new(inner: impl Into<Vec<u8>>) -> Self {
        Self(inner.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for IdentityString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityString({})", String::from_utf8_lossy(&self.0))
    }
}

/// A principal addressable on chain or inside the worker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub enum Identity {
    // web2
    #[codec(index = 0)]
    Twitter(IdentityString),
    #[codec(index = 1)]
    Discord(IdentityString),
    #[codec(index = 2)]
    Github(IdentityString),

    // web3
    #[codec(index = 3)]
    Substrate(Address32),
    #[codec(index = 4)]
    Evm(Address20),
    #[codec(index = 5)]
    Bitcoin(Address33),
    #[codec(index = 6)]
    Solana(Address32),

    #[codec(index = 7)]
    Email(IdentityString),
}

impl Identity {
    pub fn is_web2(&self) -> bool {
        matches!(
            self,
            Self::Twitter(..) | Self::Discord(..) | Self::Github(..) | Self::Email(..)
        )
    }

    pub fn is_web3(&self) -> bool {
        !self.is_web2()
    }

    /// blake2_256 of the SCALE encoding
    pub fn hash(&self) -> H256 {
        blake2_256(&self.encode())
    }

    /// Account derived by hashing the encoded identity. It has no private key.
    pub fn to_omni_account(&self) -> AccountId {
        self.hash()
    }

    /// Native chain account the identity appears as when it originates calls.
    ///
    /// - Substrate: the address itself
    /// - Evm: `blake2_256("evm:" ++ address)`
    /// - Bitcoin / Solana: the omni account
    /// - Web2 handles have no native account
    pub fn to_native_account(&self) -> Option<AccountId> {
        match self {
            Identity::Substrate(address) => Some(address.0),
            Identity::Evm(address) => {
                let mut data = Vec::with_capacity(EVM_ACCOUNT_PREFIX.len() + Address20::LEN);
                data.extend_from_slice(EVM_ACCOUNT_PREFIX);
                data.extend_from_slice(address.as_bytes());
                Some(blake2_256(&data))
            }
            Identity::Bitcoin(_) | Identity::Solana(_) => Some(self.to_omni_account()),
            Identity::Twitter(_) | Identity::Discord(_) | Identity::Github(_) | Identity::Email(_) => {
                None
            }
        }
    }

    /// `0x`-hex of the SCALE encoding, the form used in RPC params
    pub fn to_hex(&self) -> String {
        to_hex(&self.encode())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Twitter(_) => "twitter",
            Identity::Discord(_) => "discord",
            Identity::Github(_) => "github",
            Identity::Substrate(_) => "substrate",
            Identity::Evm(_) => "evm",
            Identity::Bitcoin(_) => "bitcoin",
            Identity::Solana(_) => "solana",
            Identity::Email(_) => "email",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Twitter(s) | Identity::Discord(s) | Identity::Github(s) | Identity::Email(s) => {
                write!(f, "{}:{}", self.kind(), String::from_utf8_lossy(s.as_bytes()))
            }
            Identity::Substrate(a) | Identity::Solana(a) => {
                write!(f, "{}:{}", self.kind(), to_hex(a.as_bytes()))
            }
            Identity::Evm(a) => write!(f, "{}:{}", self.kind(), to_hex(a.as_bytes())),
            Identity::Bitcoin(a) => write!(f, "{}:{}", self.kind(), to_hex(a.as_bytes())),
        }
    }
}
