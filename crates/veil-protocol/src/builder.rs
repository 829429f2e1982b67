//! Operation builder
//!
//! ```text
//! call payload   = encode(call) ‖ nonce (u32 LE) ‖ shard ‖ shard
//! getter payload = encode(getter)
//! ```
//!
//! The shard is appended twice: the verifier reads the second copy as the enclave
//! measurement, which equals the shard in a single-shard deployment. Collapsing it to
//! one copy breaks signature verification on the worker.

use parity_scale_codec::Encode;
use tracing::debug;
use veil_keys::Signer;
use veil_types::{
    Getter, Nonce, PublicGetter, ShardIdentifier, TrustedCall, TrustedCallSigned, TrustedGetter,
    TrustedGetterSigned,
};

use crate::error::{BuildError, Result};
use crate::options::SigningOptions;

/// Canonical bytes a call signature covers, before any signing options
pub fn call_payload(call: &TrustedCall, nonce: Nonce, shard: &ShardIdentifier) -> Vec<u8> {
    let mut payload = call.encode();
    nonce.encode_to(&mut payload);
    payload.extend_from_slice(shard);
    payload.extend_from_slice(shard);
    payload
}

/// Build and sign a call, optionally with `<Bytes>` bracketing
pub async fn build_call<A: Encode>(
    variant: u8,
    args: &A,
    signer: &Signer,
    shard: &ShardIdentifier,
    nonce: Nonce,
    wrap_bytes: bool,
) -> Result<TrustedCallSigned> {
    let call = TrustedCall::new(variant, args);
    sign_call(call, signer, shard, nonce, &SigningOptions::raw(wrap_bytes)).await
}

/// Build and sign a call under explicit signing options
pub async fn build_call_with<A: Encode>(
    variant: u8,
    args: &A,
    signer: &Signer,
    shard: &ShardIdentifier,
    nonce: Nonce,
    options: &SigningOptions,
) -> Result<TrustedCallSigned> {
    sign_call(TrustedCall::new(variant, args), signer, shard, nonce, options).await
}

/// Sign an already assembled call
pub async fn sign_call(
    call: TrustedCall,
    signer: &Signer,
    shard: &ShardIdentifier,
    nonce: Nonce,
    options: &SigningOptions,
) -> Result<TrustedCallSigned> {
    let message = options.message(&call_payload(&call, nonce, shard));
    let signature = signer.sign(&message).await?;

    debug!(
        variant = call.variant(),
        nonce,
        scheme = %signer.scheme(),
        "Built trusted call"
    );

    Ok(TrustedCallSigned {
        call,
        nonce,
        signature,
    })
}

/// Build and sign a trusted getter. The signature covers `encode(getter)` only.
pub async fn build_getter<A: Encode>(variant: u8, args: &A, signer: &Signer) -> Result<TrustedGetterSigned> {
    sign_getter(TrustedGetter::new(variant, args), signer).await
}

pub async fn sign_getter(getter: TrustedGetter, signer: &Signer) -> Result<TrustedGetterSigned> {
    let signature = signer.sign(&getter.encode()).await?;
    debug!(variant = getter.variant(), scheme = %signer.scheme(), "Built trusted getter");
    Ok(TrustedGetterSigned { getter, signature })
}

/// Unsigned getter
pub fn public_getter<A: Encode>(variant: u8, args: &A) -> Getter {
    Getter::Public(PublicGetter::new(variant, args))
}

/// Call from a variant index and `0x`-hex encoded arguments
pub fn call_from_hex(variant: u8, args_hex: &str) -> Result<TrustedCall> {
    Ok(TrustedCall::from_encoded_args(variant, decode_args(args_hex)?))
}

/// Trusted getter from a variant index and `0x`-hex encoded arguments
pub fn getter_from_hex(variant: u8, args_hex: &str) -> Result<TrustedGetter> {
    Ok(TrustedGetter::from_encoded_args(variant, decode_args(args_hex)?))
}

fn decode_args(args_hex: &str) -> Result<Vec<u8>> {
    let stripped = args_hex.strip_prefix("0x").unwrap_or(args_hex);
    hex::decode(stripped).map_err(|e| BuildError::MalformedArguments(e.to_string()))
}

/// Resolve a signer from `"<scheme>:<hex seed>"` before anything touches the network
pub fn parse_signer(key: &str) -> Result<Signer> {
    Ok(Signer::from_key_str(key)?)
}
