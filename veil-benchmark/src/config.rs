//! Command line

use clap::Parser;
use std::time::Duration;
use veil_core::{RetryConfig, WorkerConfig};
use veil_keys::SchemeTag;
use veil_types::codec::shard_from_hex;

#[derive(Parser, Debug, Clone)]
#[command(name = "veil-benchmark")]
#[command(about = "Drive getters over many concurrent worker connections")]
pub struct BenchmarkArgs {
    /// Worker trusted RPC endpoint
    #[arg(short, long, env = "VEIL_WORKER_URL", default_value = "ws://127.0.0.1:2000")]
    pub url: String,

    /// Shard as hex. Defaults to the latest scheduled enclave.
    #[arg(long, env = "VEIL_SHARD")]
    pub shard: Option<String>,

    /// Concurrent connections
    #[arg(short, long, default_value_t = 8)]
    pub connections: usize,

    /// Getters sent on each connection
    #[arg(short, long, default_value_t = 100)]
    pub requests: usize,

    /// Signer scheme for the queried identities. Random per request when unset.
    #[arg(short, long)]
    pub scheme: Option<SchemeTag>,

    /// Public getter variant for the nonce query
    #[arg(long, default_value_t = 1)]
    pub nonce_getter: u8,

    /// Retries when opening a socket
    #[arg(long, env = "VEIL_CONNECT_RETRIES", default_value_t = 5)]
    pub connect_retries: u32,

    /// First retry delay in milliseconds
    #[arg(long, env = "VEIL_RETRY_DELAY_MS", default_value_t = 500)]
    pub retry_delay_ms: u64,

    /// Backoff factor between retries
    #[arg(long, env = "VEIL_RETRY_BACKOFF", default_value_t = 2.0)]
    pub retry_backoff: f64,
}

impl BenchmarkArgs {
    pub fn worker_config(&self) -> anyhow::Result<WorkerConfig> {
        let retry = RetryConfig::new(
            self.connect_retries,
            Duration::from_millis(self.retry_delay_ms),
            self.retry_backoff,
        )
        .with_jitter();

        let mut config = WorkerConfig::new(self.url.clone()).with_connect_retry(retry);
        if let Some(shard) = &self.shard {
            config = config.with_shard(shard_from_hex(shard)?);
        }
        config.validate()?;
        Ok(config)
    }
}
