//! Transport error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Reply id mismatch: expected {expected}, got {actual:?}")]
    IdMismatch { expected: u64, actual: Option<u64> },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Send failed: {0}")]
    Send(String),
}

impl TransportError {
    /// Worth reconnecting for
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Connect { .. } | TransportError::ConnectionClosed | TransportError::Send(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
