//! SS58 address text for Substrate accounts

use blake2::{Blake2b512, Digest};
use veil_types::AccountId;

const SS58_PREFIX: &[u8] = b"SS58PRE";

/// Generic Substrate network prefix
pub const GENERIC_SUBSTRATE_PREFIX: u16 = 42;

/// Encode a 32-byte account with the given network prefix
pub fn ss58_encode(account: &AccountId, prefix: u16) -> String {
    let ident = prefix & 0b0011_1111_1111_1111;
    let mut data = match ident {
        0..=63 => vec![ident as u8],
        _ => {
            let first = (((ident & 0b0000_0000_1111_1100) as u8) >> 2) | 0b0100_0000;
            let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
            vec![first, second]
        }
    };
    data.extend_from_slice(account);

    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX);
    hasher.update(&data);
    let checksum = hasher.finalize();
    data.extend_from_slice(&checksum[..2]);

    bs58::encode(data).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alice_generic_address() {
        let alice: AccountId = hex::decode("d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d")
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(
            ss58_encode(&alice, GENERIC_SUBSTRATE_PREFIX),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn test_two_byte_prefix_is_longer() {
        let account = [1u8; 32];
        let short = ss58_encode(&account, 31);
        let long = ss58_encode(&account, 131);
        assert!(long.len() > short.len());
    }
}
