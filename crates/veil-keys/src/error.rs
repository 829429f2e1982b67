use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, KeyError>;
