//! Veil wire types
//!
//! Everything that crosses the boundary between the client and an enclave worker:
//!
//! - **identity**: principals (`Identity`) and their account derivations
//! - **signature**: the multi-scheme signature carried in signed operations
//! - **operation**: trusted calls, getters and the `TrustedOperation` union
//! - **envelope**: `RsaRequest` / `AesRequest` / `AesOutput`
//! - **status**: worker status enums and the status interpreter (`classify`)
//! - **rpc**: JSON-RPC frames and the `RpcReturnValue` reply body
//!
//! All binary types are SCALE encoded with `parity-scale-codec`.

// ========== Core Modules ==========
pub mod codec;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod operation;
pub mod rpc;
pub mod signature;
pub mod status;

pub use codec::{blake2_256, from_hex, shard_to_base58, to_hex};
pub use envelope::{AesOutput, AesRequest, RsaRequest, AES_NONCE_LEN};
pub use error::{DecodeError, Result};
pub use identity::{AccountId, Address20, Address32, Address33, Identity, IdentityString};
pub use operation::{
    Getter, PublicGetter, TrustedCall, TrustedCallSigned, TrustedGetter, TrustedGetterSigned,
    TrustedOperation,
};
pub use rpc::{methods, RpcErrorObject, RpcRequest, RpcResponse, RpcReturnValue};
pub use signature::MultiSignature;
pub use status::{
    classify, Classification, Completion, DirectRequestStatus, ProtocolError,
    TrustedOperationStatus,
};

/// 32-byte hash (blake2_256 output)
pub type H256 = [u8; 32];

/// Shard identifier. Equal to the enclave measurement in a single-shard deployment.
pub type ShardIdentifier = [u8; 32];

/// Per-identity replay counter carried in signed calls
pub type Nonce = u32;
