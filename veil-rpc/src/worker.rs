//! Typed worker API
//!
//! Combines the builder, the encryption layer and the transport into one call per
//! worker RPC method. Every request addresses the shard chosen at connect time.

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use veil_core::{with_retry, WorkerConfig};
use veil_crypto::{aes_unwrap, build_aes_request, build_rsa_request, AesKey, ShieldingKey};
use veil_transport::{TransportError, WorkerClient};
use veil_types::codec::decode_all;
use veil_types::{
    methods, shard_to_base58, to_hex, AesOutput, Classification, Getter, Identity, Nonce,
    RpcReturnValue, ShardIdentifier, TrustedCallSigned, TrustedOperation, H256,
};

use crate::error::{ApiError, Result};
use crate::outcome::CallOutcome;

/// Legacy RSA submission methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaMethod {
    /// `author_submitAndWatchRsRequest`
    SubmitAndWatch,
    /// `author_submitAndWatchExtrinsic`
    Extrinsic,
}

impl RsaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsaMethod::SubmitAndWatch => methods::AUTHOR_SUBMIT_AND_WATCH_RS_REQUEST,
            RsaMethod::Extrinsic => methods::AUTHOR_SUBMIT_AND_WATCH_EXTRINSIC,
        }
    }
}

/// `(block number, mrenclave)` entries from `state_getScheduledEnclave`
pub type ScheduledEnclaves = Vec<(u64, [u8; 32])>;

/// Result of `sidechain_latestBlock`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidechainBlock {
    pub number: u64,
    pub hash: String,
}

/// Fetch and parse the enclave's shielding key
pub async fn fetch_shielding_key(client: &WorkerClient) -> Result<ShieldingKey> {
    let reply = client
        .request(methods::AUTHOR_GET_SHIELDING_KEY, json!([]))
        .await?;
    ensure_accepted(&reply)?;
    let key = ShieldingKey::from_worker_bytes(&reply.value)?;
    debug!(bits = key.size() * 8, "Fetched shielding key");
    Ok(key)
}

/// Raw sidechain metadata bytes
pub async fn fetch_metadata(client: &WorkerClient) -> Result<Vec<u8>> {
    let reply = client.request(methods::STATE_GET_METADATA, json!([])).await?;
    ensure_accepted(&reply)?;
    Ok(reply.value)
}

pub async fn fetch_scheduled_enclaves(client: &WorkerClient) -> Result<ScheduledEnclaves> {
    let reply = client
        .request(methods::STATE_GET_SCHEDULED_ENCLAVE, json!([]))
        .await?;
    ensure_accepted(&reply)?;
    Ok(reply.decode_value()?)
}

/// Measurement scheduled at the highest block
pub fn latest_enclave(enclaves: &ScheduledEnclaves) -> Option<[u8; 32]> {
    enclaves
        .iter()
        .max_by_key(|(block, _)| *block)
        .map(|(_, mrenclave)| *mrenclave)
}

fn ensure_accepted(reply: &RpcReturnValue) -> Result<()> {
    match reply.classify() {
        Classification::Terminal(Err(e)) => Err(ApiError::Protocol(e)),
        _ => Ok(()),
    }
}

/// Nonce reply value, told apart by length:
///
/// ```text
/// 0 bytes          no nonce yet, 0
/// 4 bytes          bare u32
/// otherwise        public getter form, Option<Vec<u8>> wrapping the u32
///                  (`00` for None, `01 10 <4 bytes>` for Some)
/// ```
fn decode_nonce(value: &[u8]) -> Result<Nonce> {
    match value.len() {
        0 => Ok(0),
        4 => Ok(decode_all(value)?),
        _ => match decode_getter_value(value)? {
            Some(inner) if !inner.is_empty() => Ok(decode_all(&inner)?),
            _ => Ok(0),
        },
    }
}

/// Getter replies carry `Option<Vec<u8>>`
fn decode_getter_value(value: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(decode_all(value)?)
}

/// Connection to a worker with its shielding key and shard resolved
pub struct WorkerApi {
    client: Arc<WorkerClient>,
    shielding_key: ShieldingKey,
    shard: ShardIdentifier,
}

impl WorkerApi {
    /// Connect with retry, fetch the shielding key and resolve the shard
    pub async fn connect(config: &WorkerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let client = with_retry(
            || WorkerClient::connect(&config.endpoint),
            &config.connect_retry,
            TransportError::is_transient,
        )
        .await?;

        Self::from_client(Arc::new(client), config.shard).await
    }

    /// Finish setup over an open connection
    pub async fn from_client(client: Arc<WorkerClient>, shard: Option<ShardIdentifier>) -> Result<Self> {
        let shielding_key = fetch_shielding_key(&client).await?;

        let shard = match shard {
            Some(shard) => shard,
            None => {
                let enclaves = fetch_scheduled_enclaves(&client).await?;
                latest_enclave(&enclaves)
                    .ok_or_else(|| ApiError::Config("no shard configured and no scheduled enclave".to_string()))?
            }
        };

        info!(
            endpoint = %client.endpoint(),
            shard = %shard_to_base58(&shard),
            "Worker API ready"
        );
        Ok(Self::new(client, shielding_key, shard))
    }

    pub fn new(client: Arc<WorkerClient>, shielding_key: ShieldingKey, shard: ShardIdentifier) -> Self {
        Self {
            client,
            shielding_key,
            shard,
        }
    }

    pub fn client(&self) -> &Arc<WorkerClient> {
        &self.client
    }

    pub fn shielding_key(&self) -> &ShieldingKey {
        &self.shielding_key
    }

    pub fn shard(&self) -> &ShardIdentifier {
        &self.shard
    }

    /// Next sidechain nonce for `identity`
    pub async fn next_nonce(&self, identity: &Identity) -> Result<Nonce> {
        let params = json!([shard_to_base58(&self.shard), identity.to_hex()]);
        let reply = self.client.request(methods::AUTHOR_GET_NEXT_NONCE, params).await?;
        ensure_accepted(&reply)?;

        decode_nonce(&reply.value)
    }

    /// Run a getter over `state_executeGetter`, RSA-encrypted to the enclave
    pub async fn execute_getter(&self, getter: &Getter) -> Result<Option<Vec<u8>>> {
        let request = build_rsa_request(&self.shielding_key, self.shard, &getter.encode())?;
        let reply = self
            .client
            .request(methods::STATE_EXECUTE_GETTER, json!([request.to_hex()]))
            .await?;
        ensure_accepted(&reply)?;
        decode_getter_value(&reply.value)
    }

    /// Run a getter over `state_executeAesGetter`. The reply is encrypted with `key`.
    pub async fn execute_aes_getter(&self, getter: &Getter, key: &AesKey) -> Result<Option<Vec<u8>>> {
        let request = build_aes_request(&self.shielding_key, key, self.shard, &getter.encode())?;
        let reply = self
            .client
            .request(methods::STATE_EXECUTE_AES_GETTER, json!([request.to_hex()]))
            .await?;
        ensure_accepted(&reply)?;

        let output: AesOutput = decode_all(&reply.value)?;
        decode_getter_value(&aes_unwrap(key, &output)?)
    }

    /// Submit a direct call under an AES envelope and wait for the final status
    pub async fn submit_call<F>(&self, call: TrustedCallSigned, key: &AesKey, observer: F) -> Result<CallOutcome>
    where
        F: FnMut(&RpcReturnValue),
    {
        self.submit_aes(methods::AUTHOR_SUBMIT_AND_WATCH_AES_REQUEST, call, key, observer)
            .await
    }

    /// Request verifiable credentials. The worker streams one `do_watch` reply per
    /// assertion before the final one.
    pub async fn request_vc<F>(&self, call: TrustedCallSigned, key: &AesKey, observer: F) -> Result<CallOutcome>
    where
        F: FnMut(&RpcReturnValue),
    {
        self.submit_aes(methods::AUTHOR_REQUEST_VC, call, key, observer).await
    }

    /// Submit a direct call under an RSA envelope
    pub async fn submit_call_rsa<F>(&self, call: TrustedCallSigned, method: RsaMethod, observer: F) -> Result<CallOutcome>
    where
        F: FnMut(&RpcReturnValue),
    {
        let operation = TrustedOperation::DirectCall(call);
        let request = build_rsa_request(&self.shielding_key, self.shard, &operation.encode())?;
        self.watch(method.as_str(), request.to_hex(), operation.hash(), observer)
            .await
    }

    /// Raw sidechain metadata
    pub async fn metadata(&self) -> Result<Vec<u8>> {
        fetch_metadata(&self.client).await
    }

    /// Raw storage value under `storage_key` (`0x`-hex)
    pub async fn storage(&self, storage_key: &str) -> Result<Vec<u8>> {
        let params = json!([shard_to_base58(&self.shard), storage_key]);
        let reply = self.client.request(methods::STATE_GET_STORAGE, params).await?;
        ensure_accepted(&reply)?;
        Ok(reply.value)
    }

    pub async fn scheduled_enclave(&self) -> Result<ScheduledEnclaves> {
        fetch_scheduled_enclaves(&self.client).await
    }

    pub async fn latest_block(&self) -> Result<SidechainBlock> {
        let result = self
            .client
            .request_raw(methods::SIDECHAIN_LATEST_BLOCK, json!(to_hex(&self.shard)))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| ApiError::Transport(TransportError::MalformedReply(e.to_string())))
    }

    async fn submit_aes<F>(&self, method: &str, call: TrustedCallSigned, key: &AesKey, observer: F) -> Result<CallOutcome>
    where
        F: FnMut(&RpcReturnValue),
    {
        let operation = TrustedOperation::DirectCall(call);
        let request = build_aes_request(&self.shielding_key, key, self.shard, &operation.encode())?;
        self.watch(method, request.to_hex(), operation.hash(), observer).await
    }

    async fn watch<F>(&self, method: &str, envelope_hex: String, top_hash: H256, observer: F) -> Result<CallOutcome>
    where
        F: FnMut(&RpcReturnValue),
    {
        debug!(method, top_hash = %to_hex(&top_hash), "Submitting trusted call");
        let reply = self
            .client
            .submit_with_observer(method, envelope_hex, observer)
            .await?;

        let outcome = CallOutcome::new(reply, top_hash);
        if outcome.top_hash_mismatch() {
            warn!(
                method,
                expected = %to_hex(&top_hash),
                "Final status refers to a different operation"
            );
        }
        Ok(outcome)
    }
}
