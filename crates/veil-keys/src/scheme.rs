//! Signature scheme tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeTag {
    #[serde(rename = "substrate-sr25519")]
    Sr25519,
    #[serde(rename = "substrate-ed25519")]
    Ed25519,
    #[serde(rename = "substrate-ecdsa")]
    Ecdsa,
    #[serde(rename = "ethereum")]
    Ethereum,
    #[serde(rename = "bitcoin")]
    Bitcoin,
}

impl SchemeTag {
    pub const ALL: [SchemeTag; 5] = [
        SchemeTag::Sr25519,
        SchemeTag::Ed25519,
        SchemeTag::Ecdsa,
        SchemeTag::Ethereum,
        SchemeTag::Bitcoin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeTag::Sr25519 => "substrate-sr25519",
            SchemeTag::Ed25519 => "substrate-ed25519",
            SchemeTag::Ecdsa => "substrate-ecdsa",
            SchemeTag::Ethereum => "ethereum",
            SchemeTag::Bitcoin => "bitcoin",
        }
    }

    /// Schemes whose keys live on the Substrate side directly
    pub fn is_substrate(&self) -> bool {
        matches!(self, SchemeTag::Sr25519 | SchemeTag::Ed25519 | SchemeTag::Ecdsa)
    }
}

impl fmt::Display for SchemeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeTag {
    type Err = KeyError;

    /// Accepts the full tag or the short curve name (`sr25519`, `evm`, `btc`...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substrate-sr25519" | "sr25519" => Ok(SchemeTag::Sr25519),
            "substrate-ed25519" | "ed25519" => Ok(SchemeTag::Ed25519),
            "substrate-ecdsa" | "ecdsa" => Ok(SchemeTag::Ecdsa),
            "ethereum" | "evm" => Ok(SchemeTag::Ethereum),
            "bitcoin" | "btc" => Ok(SchemeTag::Bitcoin),
            _ => Err(KeyError::UnsupportedScheme(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        for tag in SchemeTag::ALL {
            assert_eq!(tag.as_str().parse::<SchemeTag>().unwrap(), tag);
        }
        assert_eq!("EVM".parse::<SchemeTag>().unwrap(), SchemeTag::Ethereum);
        assert_eq!("sr25519".parse::<SchemeTag>().unwrap(), SchemeTag::Sr25519);
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let err = "solana".parse::<SchemeTag>().unwrap_err();
        assert!(matches!(err, KeyError::UnsupportedScheme(ref s) if s == "solana"));
    }

    #[test]
    fn test_serde_uses_wire_tag() {
        let json = serde_json::to_string(&SchemeTag::Ecdsa).unwrap();
        assert_eq!(json, "\"substrate-ecdsa\"");
    }
}
