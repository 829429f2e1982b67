//! Request envelopes
//!
//! The only objects that cross the network carrying an operation. The plaintext
//! operation is never sent; it is either RSA-encrypted into an [`RsaRequest`] or
//! AES-GCM encrypted into an [`AesRequest`] whose session key is RSA-wrapped.

use parity_scale_codec::{Decode, Encode};

use crate::codec::to_hex;
use crate::ShardIdentifier;

/// AES-GCM nonce length in bytes
pub const AES_NONCE_LEN: usize = 12;

/// AES-256-GCM output. The 16-byte authentication tag is appended to `ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AesOutput {
    pub ciphertext: Vec<u8>,
    pub aad: Vec<u8>,
    pub nonce: [u8; AES_NONCE_LEN],
}

/// Payload encrypted with the shielding key
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RsaRequest {
    pub shard: ShardIdentifier,
    pub payload: Vec<u8>,
}

/// Payload encrypted with a session key, which is itself encrypted with the
/// shielding key
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AesRequest {
    pub shard: ShardIdentifier,
    pub key: Vec<u8>,
    pub payload: AesOutput,
}

impl RsaRequest {
    pub fn new(shard: ShardIdentifier, payload: Vec<u8>) -> Self {
        Self { shard, payload }
    }

    /// `0x`-hex of the encoded envelope, the single RPC param
    pub fn to_hex(&self) -> String {
        to_hex(&self.encode())
    }
}

impl AesRequest {
    pub fn new(shard: ShardIdentifier, key: Vec<u8>, payload: AesOutput) -> Self {
        Self {
            shard,
            key,
            payload,
        }
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.encode())
    }
}
