//! Request envelope builders
//!
//! Two separately named strategies. Getters and legacy calls go through
//! [`build_rsa_request`]; direct calls go through [`build_aes_request`], which also
//! hands the worker a session key for encrypting the response.

use tracing::debug;
use veil_types::{AesRequest, RsaRequest, ShardIdentifier};

use crate::aes::{aes_wrap, AesKey};
use crate::error::Result;
use crate::shielding::{rsa_wrap, ShieldingKey};

/// RSA-encrypt `plaintext` to the enclave
pub fn build_rsa_request(
    shielding_key: &ShieldingKey,
    shard: ShardIdentifier,
    plaintext: &[u8],
) -> Result<RsaRequest> {
    let payload = rsa_wrap(shielding_key, plaintext)?;
    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = payload.len(),
        "Built RSA request"
    );
    Ok(RsaRequest::new(shard, payload))
}

/// RSA-wrap `session_key` and AES-encrypt `plaintext` under it
pub fn build_aes_request(
    shielding_key: &ShieldingKey,
    session_key: &AesKey,
    shard: ShardIdentifier,
    plaintext: &[u8],
) -> Result<AesRequest> {
    let key = rsa_wrap(shielding_key, session_key.as_bytes())?;
    let payload = aes_wrap(session_key, plaintext)?;
    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = payload.ciphertext.len(),
        "Built AES request"
    );
    Ok(AesRequest::new(shard, key, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::aes_unwrap;
    use crate::shielding::rsa_unwrap;
    use crate::shielding::tests::test_private_key;
    use parity_scale_codec::{Decode, Encode};

    #[test]
    fn test_rsa_request_carries_ciphertext() {
        let private = test_private_key();
        let request = build_rsa_request(&ShieldingKey::from(private), [7; 32], b"getter").unwrap();

        assert_eq!(request.shard, [7; 32]);
        assert_ne!(request.payload, b"getter");
        assert_eq!(rsa_unwrap(private, &request.payload).unwrap(), b"getter");
    }

    #[test]
    fn test_aes_request_wraps_session_key() {
        let private = test_private_key();
        let session_key = AesKey::generate();
        let request =
            build_aes_request(&ShieldingKey::from(private), &session_key, [9; 32], b"direct call").unwrap();

        let unwrapped_key = rsa_unwrap(private, &request.key).unwrap();
        assert_eq!(unwrapped_key.as_slice(), session_key.as_bytes());

        let recovered = AesKey::from_bytes(unwrapped_key.try_into().unwrap());
        assert_eq!(aes_unwrap(&recovered, &request.payload).unwrap(), b"direct call");
    }

    #[test]
    fn test_envelope_survives_the_wire() {
        let private = test_private_key();
        let request =
            build_aes_request(&ShieldingKey::from(private), &AesKey::generate(), [1; 32], b"x").unwrap();
        let decoded = AesRequest::decode(&mut &request.encode()[..]).unwrap();
        assert_eq!(decoded, request);
    }
}
