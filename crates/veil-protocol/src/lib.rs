//! # Veil Protocol
//!
//! Builds signed trusted calls and getters from a variant index, SCALE arguments and
//! a [`veil_keys::Signer`].
//!
//! ```rust,ignore
//! let signed = build_call(CALL_LINK_IDENTITY, &args, &signer, &shard, nonce, false).await?;
//! let operation = TrustedOperation::DirectCall(signed);
//! ```

pub mod builder;
pub mod error;
pub mod options;

pub use builder::{
    build_call, build_call_with, build_getter, call_from_hex, call_payload, getter_from_hex,
    parse_signer, public_getter, sign_call, sign_getter,
};
pub use error::{BuildError, Result};
pub use options::{SigningOptions, BYTES_CLOSE, BYTES_OPEN, DEFAULT_PREFIX};
