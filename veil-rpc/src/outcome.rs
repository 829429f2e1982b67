//! Final result of a submitted call

use veil_crypto::{aes_unwrap, AesKey};
use veil_types::codec::decode_all;
use veil_types::{AesOutput, Classification, Completion, RpcReturnValue, H256};

use crate::error::{ApiError, Result};

/// Final reply of a call submission together with the hash of what was submitted.
/// A rejection is an ordinary value here; [`CallOutcome::into_result`] converts it.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub reply: RpcReturnValue,
    /// Top hash of the submitted operation
    pub top_hash: H256,
    pub classification: Classification,
}

impl CallOutcome {
    pub fn new(reply: RpcReturnValue, top_hash: H256) -> Self {
        let classification = reply.classify();
        Self {
            reply,
            top_hash,
            classification,
        }
    }

    pub fn is_success(&self) -> bool {
        self.classification.is_success()
    }

    pub fn is_rejected(&self) -> bool {
        self.classification.is_error()
    }

    /// The reply reports a different operation than the one submitted
    pub fn top_hash_mismatch(&self) -> bool {
        matches!(self.reply.status.top_hash(), Some(hash) if hash != self.top_hash)
    }

    /// Sidechain block the operation landed in
    pub fn block_hash(&self) -> Option<H256> {
        match self.classification {
            Classification::Terminal(Ok(Completion::InSidechainBlock { block_hash, .. })) => Some(block_hash),
            _ => None,
        }
    }

    /// Decrypt the reply value, an `AesOutput` under the request's session key
    pub fn decrypt_value(&self, key: &AesKey) -> Result<Vec<u8>> {
        let output: AesOutput = decode_all(&self.reply.value)?;
        Ok(aes_unwrap(key, &output)?)
    }

    pub fn into_result(self) -> Result<RpcReturnValue> {
        match self.classification {
            Classification::Terminal(Err(e)) => Err(ApiError::Protocol(e)),
            _ => Ok(self.reply),
        }
    }
}
