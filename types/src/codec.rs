//! Hashing and hex helpers shared by every crate

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use parity_scale_codec::{Decode, DecodeAll};

use crate::error::{DecodeError, Result};
use crate::ShardIdentifier;

type Blake2b256 = Blake2b<U32>;

/// blake2b with a 256-bit output, as used for account and operation hashes
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    bytes
}

/// `0x`-prefixed lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex with or without a `0x` prefix
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(stripped)?)
}

/// Decode a hex string holding exactly one SCALE value
pub fn decode_hex<T: Decode>(s: &str) -> Result<T> {
    let bytes = from_hex(s)?;
    decode_all(&bytes)
}

/// Decode bytes holding exactly one SCALE value
pub fn decode_all<T: Decode>(bytes: &[u8]) -> Result<T> {
    T::decode_all(&mut &bytes[..]).map_err(DecodeError::from)
}

/// Base58 text of a shard, the form the worker expects in `author_getNextNonce`
/// and `state_getStorage` params
pub fn shard_to_base58(shard: &ShardIdentifier) -> String {
    bs58::encode(shard).into_string()
}

/// Parse a 32-byte shard from hex
pub fn shard_from_hex(s: &str) -> Result<ShardIdentifier> {
    let bytes = from_hex(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::InvalidLength { expected: 32, actual: bytes.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2_256_known_vector() {
        // blake2b-256 of the empty string
        assert_eq!(
            hex::encode(blake2_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_hex_prefix_is_optional() {
        assert_eq!(from_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(from_hex("dead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(to_hex(&[0xde, 0xad]), "0xdead");
    }

    #[test]
    fn test_shard_from_hex_rejects_wrong_length() {
        let err = shard_from_hex("0x0102").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLength { expected: 32, actual: 2 }));
        assert_eq!(shard_from_hex(&to_hex(&[7u8; 32])).unwrap(), [7u8; 32]);
    }

    #[test]
    fn test_decode_all_rejects_trailing_bytes() {
        assert_eq!(decode_all::<u32>(&[5, 0, 0, 0]).unwrap(), 5);
        assert!(decode_all::<u32>(&[5, 0, 0, 0, 1]).is_err());
    }
}
