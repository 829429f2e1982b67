//! How the canonical payload is turned into the bytes a wallet signs

use veil_types::{blake2_256, to_hex};

/// Opening marker for bracketed signing
pub const BYTES_OPEN: &[u8] = b"<Bytes>";

/// Closing marker for bracketed signing
pub const BYTES_CLOSE: &[u8] = b"</Bytes>";

/// Default human-readable prefix in hashed mode
pub const DEFAULT_PREFIX: &str = "Token: ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningOptions {
    /// Bracket the message with `<Bytes>` / `</Bytes>`
    pub wrap_bytes: bool,
    /// Sign the `0x`-hex text of `blake2_256(payload)` instead of the payload
    pub hashed: bool,
    /// Text placed before the hash in hashed mode
    pub prefix: Option<String>,
}

impl SigningOptions {
    /// Raw payload, optionally bracketed
    pub fn raw(wrap_bytes: bool) -> Self {
        Self {
            wrap_bytes,
            ..Default::default()
        }
    }

    /// Hashed mode with the default prefix
    pub fn hashed() -> Self {
        Self {
            wrap_bytes: false,
            hashed: true,
            prefix: Some(DEFAULT_PREFIX.to_string()),
        }
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_wrap_bytes(mut self, wrap_bytes: bool) -> Self {
        self.wrap_bytes = wrap_bytes;
        self
    }

    /// Message handed to the signer for `payload`
    pub fn message(&self, payload: &[u8]) -> Vec<u8> {
        let body = if self.hashed {
            let mut text = self.prefix.clone().unwrap_or_default();
            text.push_str(&to_hex(&blake2_256(payload)));
            text.into_bytes()
        } else {
            payload.to_vec()
        };

        if !self.wrap_bytes {
            return body;
        }

        let mut wrapped = Vec::with_capacity(BYTES_OPEN.len() + body.len() + BYTES_CLOSE.len());
        wrapped.extend_from_slice(BYTES_OPEN);
        wrapped.extend_from_slice(&body);
        wrapped.extend_from_slice(BYTES_CLOSE);
        wrapped
    }
}
