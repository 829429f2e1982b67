//! Builder error types

use thiserror::Error;
use veil_keys::KeyError;

/// Raised while building an operation, always before any network I/O
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<KeyError> for BuildError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::UnsupportedScheme(scheme) => BuildError::UnsupportedScheme(scheme),
            other => BuildError::Signing(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
