//! Worker status and the status interpreter
//!
//! Every reply carries a [`DirectRequestStatus`]. `do_watch` only says whether more
//! messages follow on the same request id; whether the operation itself succeeded,
//! failed or is still in flight comes from [`classify`]:
//!
//! ```text
//! Ok                                            -> Terminal(Ok)
//! Error                                         -> Terminal(Err)
//! TrustedOperationStatus(s, top_hash):
//!   Submitted | Future | Ready | Broadcast      -> Pending
//!   InSidechainBlock(h) | Finalized             -> Terminal(Ok)
//!   Invalid | Dropped | Usurped |
//!   FinalityTimeout | Retracted                 -> Terminal(Err)
//! ```

use parity_scale_codec::{Decode, Encode};
use thiserror::Error;

use crate::codec::to_hex;
use crate::H256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum TrustedOperationStatus {
    /// Submitted to the operation pool
    #[codec(index = 0)]
    Submitted,
    /// Part of the future queue
    #[codec(index = 1)]
    Future,
    /// Part of the ready queue
    #[codec(index = 2)]
    Ready,
    /// Broadcast to other workers
    #[codec(index = 3)]
    Broadcast,
    /// Executed and included in the given sidechain block
    #[codec(index = 4)]
    InSidechainBlock(H256),
    /// The including block was retracted
    #[codec(index = 5)]
    Retracted,
    /// Finality was not reached in time
    #[codec(index = 6)]
    FinalityTimeout,
    #[codec(index = 7)]
    Finalized,
    /// Replaced by another operation with the same nonce
    #[codec(index = 8)]
    Usurped,
    /// Dropped from the pool
    #[codec(index = 9)]
    Dropped,
    #[codec(index = 10)]
    Invalid,
}

impl TrustedOperationStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Future => "Future",
            Self::Ready => "Ready",
            Self::Broadcast => "Broadcast",
            Self::InSidechainBlock(_) => "InSidechainBlock",
            Self::Retracted => "Retracted",
            Self::FinalityTimeout => "FinalityTimeout",
            Self::Finalized => "Finalized",
            Self::Usurped => "Usurped",
            Self::Dropped => "Dropped",
            Self::Invalid => "Invalid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum DirectRequestStatus {
    #[codec(index = 0)]
    Ok,
    /// Status of the trusted operation with the given top hash
    #[codec(index = 1)]
    TrustedOperationStatus(TrustedOperationStatus, H256),
    #[codec(index = 2)]
    Error,
}

/// Successful terminal outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Plain `Ok` status (getters, auxiliary reads)
    Ok,
    InSidechainBlock { block_hash: H256, top_hash: H256 },
    Finalized { top_hash: H256 },
}

/// The worker rejected the request.
///
/// This is an expected outcome the caller handles, so it travels as a value inside
/// [`Classification`] rather than as a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Worker returned an error status")]
    Error,

    #[error("Trusted operation {} ended with status {}", to_hex(.top_hash), .status.name())]
    Rejected {
        status: TrustedOperationStatus,
        top_hash: H256,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The operation is still in flight
    Pending,
    Terminal(Result<Completion, ProtocolError>),
}

impl Classification {
    pub fn is_pending(&self) -> bool {
        matches!(self, Classification::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Terminal(Ok(_)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Classification::Terminal(Err(_)))
    }
}

/// Classify a status as pending or terminal
pub fn classify(status: &DirectRequestStatus) -> Classification {
    use TrustedOperationStatus::*;

    match *status {
        DirectRequestStatus::Ok => Classification::Terminal(Ok(Completion::Ok)),
        DirectRequestStatus::Error => Classification::Terminal(Err(ProtocolError::Error)),
        DirectRequestStatus::TrustedOperationStatus(inner, top_hash) => match inner {
            Submitted | Future | Ready | Broadcast => Classification::Pending,
            InSidechainBlock(block_hash) => Classification::Terminal(Ok(Completion::InSidechainBlock {
                block_hash,
                top_hash,
            })),
            Finalized => Classification::Terminal(Ok(Completion::Finalized { top_hash })),
            Invalid | Dropped | Usurped | FinalityTimeout | Retracted => {
                Classification::Terminal(Err(ProtocolError::Rejected {
                    status: inner,
                    top_hash,
                }))
            }
        },
    }
}

impl DirectRequestStatus {
    pub fn classify(&self) -> Classification {
        classify(self)
    }

    /// Top hash carried by operation statuses
    pub fn top_hash(&self) -> Option<H256> {
        match self {
            DirectRequestStatus::TrustedOperationStatus(_, hash) => Some(*hash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP: H256 = [0x11; 32];

    fn op(status: TrustedOperationStatus) -> DirectRequestStatus {
        DirectRequestStatus::TrustedOperationStatus(status, TOP)
    }

    #[test]
    fn test_invalid_is_terminal_error() {
        assert_eq!(
            classify(&op(TrustedOperationStatus::Invalid)),
            Classification::Terminal(Err(ProtocolError::Rejected {
                status: TrustedOperationStatus::Invalid,
                top_hash: TOP,
            }))
        );
    }

    #[test]
    fn test_submitted_is_pending() {
        assert_eq!(classify(&op(TrustedOperationStatus::Submitted)), Classification::Pending);
    }

    #[test]
    fn test_in_sidechain_block_retains_hash() {
        let block = [0xab; 32];
        match classify(&op(TrustedOperationStatus::InSidechainBlock(block))) {
            Classification::Terminal(Ok(Completion::InSidechainBlock { block_hash, top_hash })) => {
                assert_eq!(block_hash, block);
                assert_eq!(top_hash, TOP);
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_full_mapping() {
        use TrustedOperationStatus::*;

        for pending in [Submitted, Future, Ready, Broadcast] {
            assert!(classify(&op(pending)).is_pending(), "{}", pending.name());
        }
        for failed in [Invalid, Dropped, Usurped, FinalityTimeout, Retracted] {
            assert!(classify(&op(failed)).is_error(), "{}", failed.name());
        }
        assert!(classify(&op(Finalized)).is_success());
        assert!(classify(&DirectRequestStatus::Ok).is_success());
        assert_eq!(
            classify(&DirectRequestStatus::Error),
            Classification::Terminal(Err(ProtocolError::Error))
        );
    }

    #[test]
    fn test_status_wire_indices() {
        assert_eq!(DirectRequestStatus::Error.encode(), vec![2]);
        let encoded = op(TrustedOperationStatus::Invalid).encode();
        assert_eq!(encoded[0], 1);
        assert_eq!(encoded[1], 10);
        assert_eq!(encoded.len(), 2 + 32);
        assert_eq!(op(TrustedOperationStatus::Invalid).top_hash(), Some(TOP));
    }
}
