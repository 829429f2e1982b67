//! Worker API error types

use thiserror::Error;
use veil_crypto::CryptoError;
use veil_keys::KeyError;
use veil_protocol::BuildError;
use veil_transport::TransportError;
use veil_types::{DecodeError, ProtocolError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The worker rejected the operation
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Transport faults that a reconnect may fix. Crypto and protocol failures never are.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_transient())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
