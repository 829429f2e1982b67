//! # Veil Keys
//!
//! Signer abstraction over the five schemes a trusted operation can be signed with:
//!
//! | Scheme              | Primitive                                   | Signed bytes          |
//! |---------------------|---------------------------------------------|-----------------------|
//! | `substrate-sr25519` | schnorrkel, context `substrate`             | message               |
//! | `substrate-ed25519` | ed25519                                     | message               |
//! | `substrate-ecdsa`   | secp256k1 recoverable over blake2_256       | message               |
//! | `ethereum`          | secp256k1 recoverable over EIP-191 keccak   | message               |
//! | `bitcoin`           | secp256k1 compact over signed-message sha256d | hex(message), no `0x` |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use veil_keys::{SchemeTag, Signer};
//!
//! let signer = Signer::generate(SchemeTag::Ethereum)?;
//! let signature = signer.sign(&payload).await?;
//! let account = signer.chain_address(42);
//! ```

pub mod bitcoin;
pub mod error;
pub mod ethereum;
pub mod scheme;
mod secp256k1;
pub mod signer;
pub mod ss58;
pub mod substrate;

pub use error::{KeyError, Result};
pub use scheme::SchemeTag;
pub use signer::Signer;
pub use ss58::{ss58_encode, GENERIC_SUBSTRATE_PREFIX};
