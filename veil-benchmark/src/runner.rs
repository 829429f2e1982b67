//! One benchmark connection
//!
//! ```text
//! socket (retry) ──► shielding key ──► metadata ──► getters ... ──► release in reverse
//! ```

use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use veil_core::{with_retry, ScopeStack, WorkerConfig};
use veil_keys::{SchemeTag, Signer};
use veil_protocol::public_getter;
use veil_rpc::{fetch_metadata, fetch_scheduled_enclaves, fetch_shielding_key, latest_enclave, WorkerApi};
use veil_transport::{TransportError, WorkerClient};
use veil_types::{codec::decode_all, Nonce};

use crate::stats::LatencyStats;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub worker: WorkerConfig,
    pub requests: usize,
    pub scheme: Option<SchemeTag>,
    pub nonce_getter: u8,
}

/// Open one connection through a scope stack, drive the getters and tear it down
pub async fn run_connection(index: usize, config: Arc<RunnerConfig>) -> anyhow::Result<LatencyStats> {
    let mut scope = ScopeStack::new();
    let api = match open(&mut scope, &config.worker).await {
        Ok(api) => api,
        Err(e) => {
            scope.close().await;
            return Err(e);
        }
    };
    info!(connection = index, "Connection ready");

    let stats = drive(index, &api, &config).await;
    scope.close().await;
    stats
}

async fn open(scope: &mut ScopeStack, config: &WorkerConfig) -> anyhow::Result<WorkerApi> {
    let client = scope
        .push(
            "worker socket",
            || async {
                with_retry(
                    || WorkerClient::connect(&config.endpoint),
                    &config.connect_retry,
                    TransportError::is_transient,
                )
                .await
                .map(Arc::new)
            },
            |client: Arc<WorkerClient>| async move { client.disconnect() },
        )
        .await?;

    let shielding_key = scope
        .push("shielding key", || fetch_shielding_key(&client), |_| async {})
        .await?;

    let metadata = scope
        .push("metadata", || fetch_metadata(&client), |_| async {})
        .await?;
    debug!(len = metadata.len(), "Fetched sidechain metadata");

    let shard = match config.shard {
        Some(shard) => shard,
        None => latest_enclave(&fetch_scheduled_enclaves(&client).await?)
            .ok_or_else(|| anyhow::anyhow!("no shard configured and no scheduled enclave"))?,
    };

    Ok(WorkerApi::new(client, shielding_key, shard))
}

async fn drive(index: usize, api: &WorkerApi, config: &RunnerConfig) -> anyhow::Result<LatencyStats> {
    let mut stats = LatencyStats::new()?;

    for _ in 0..config.requests {
        let scheme = match config.scheme {
            Some(scheme) => scheme,
            None => *SchemeTag::ALL
                .choose(&mut rand::thread_rng())
                .unwrap_or(&SchemeTag::Sr25519),
        };
        let identity = Signer::generate(scheme)?.identity();
        let getter = public_getter(config.nonce_getter, &identity);

        let started = Instant::now();
        match api.execute_getter(&getter).await {
            Ok(value) => {
                stats.record(started.elapsed());
                let nonce = value
                    .filter(|bytes| !bytes.is_empty())
                    .map(|bytes| decode_all::<Nonce>(&bytes))
                    .transpose();
                if let Err(e) = nonce {
                    debug!(connection = index, error = %e, "Unexpected nonce encoding");
                }
            }
            Err(e) if e.is_transient() => {
                warn!(connection = index, error = %e, "Connection lost, stopping");
                stats.record_error();
                break;
            }
            Err(e) => {
                warn!(connection = index, error = %e, "Getter failed");
                stats.record_error();
            }
        }
    }

    Ok(stats)
}
