//! Decoding errors for wire types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("SCALE decode error: {0}")]
    Scale(#[from] parity_scale_codec::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unexpected value: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
