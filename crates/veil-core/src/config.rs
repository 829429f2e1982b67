//! Worker connection configuration

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use veil_types::codec::shard_from_hex;
use veil_types::ShardIdentifier;

use crate::retry::RetryConfig;

/// Worker endpoint, shard and connect policy
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// WebSocket endpoint of the worker's trusted RPC server
    pub endpoint: String,
    /// Shard to address. When unset, the worker API falls back to the latest
    /// scheduled enclave measurement.
    pub shard: Option<ShardIdentifier>,
    /// Backoff for opening the socket
    pub connect_retry: RetryConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:2000".to_string(),
            shard: None,
            connect_retry: RetryConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_shard(mut self, shard: ShardIdentifier) -> Self {
        self.shard = Some(shard);
        self
    }

    pub fn with_connect_retry(mut self, retry: RetryConfig) -> Self {
        self.connect_retry = retry;
        self
    }

    /// Load configuration from environment variables
    ///
    /// - `VEIL_WORKER_URL`: worker endpoint (default `ws://127.0.0.1:2000`)
    /// - `VEIL_SHARD`: hex shard id, 32 bytes
    /// - `VEIL_CONNECT_RETRIES`: connect retries (default 5)
    /// - `VEIL_RETRY_DELAY_MS`: first retry delay (default 500)
    /// - `VEIL_RETRY_BACKOFF`: backoff factor (default 2.0)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let endpoint = std::env::var("VEIL_WORKER_URL").unwrap_or(defaults.endpoint);

        let shard = match std::env::var("VEIL_SHARD") {
            Ok(hex) => Some(
                shard_from_hex(&hex).map_err(|e| anyhow::anyhow!("invalid VEIL_SHARD: {}", e))?,
            ),
            Err(_) => None,
        };

        let max_retries: u32 = parse_var(
            "VEIL_CONNECT_RETRIES",
            std::env::var("VEIL_CONNECT_RETRIES").ok(),
            defaults.connect_retry.max_retries,
        )?;

        let delay_ms: u64 = parse_var(
            "VEIL_RETRY_DELAY_MS",
            std::env::var("VEIL_RETRY_DELAY_MS").ok(),
            defaults.connect_retry.initial_delay.as_millis() as u64,
        )?;

        let backoff: f64 = parse_var(
            "VEIL_RETRY_BACKOFF",
            std::env::var("VEIL_RETRY_BACKOFF").ok(),
            defaults.connect_retry.backoff_factor,
        )?;

        let connect_retry = RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(delay_ms),
            backoff_factor: backoff,
            ..defaults.connect_retry
        };

        Ok(Self {
            endpoint,
            shard,
            connect_retry,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            anyhow::bail!("worker endpoint must be a ws:// or wss:// url, got {}", self.endpoint);
        }
        let backoff = self.connect_retry.backoff_factor;
        if !backoff.is_finite() || backoff < 1.0 {
            anyhow::bail!(
                "retry backoff factor must be a finite number >= 1.0, got {}",
                self.connect_retry.backoff_factor
            );
        }
        Ok(())
    }
}

/// Parse an optional variable, falling back to `default` only when it is unset
fn parse_var<T>(name: &str, value: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}={:?}: {}", name, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.shard.is_none());
    }

    #[test]
    fn test_validate_rejects_http_endpoint() {
        let config = WorkerConfig::new("http://localhost:2000");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shrinking_backoff() {
        let config = WorkerConfig::new("wss://worker:2000")
            .with_connect_retry(RetryConfig::new(3, Duration::from_millis(10), 0.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_backoff() {
        for backoff in [f64::NAN, f64::INFINITY] {
            let config = WorkerConfig::new("ws://worker:2000")
                .with_connect_retry(RetryConfig::new(3, Duration::from_millis(100), backoff));
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_malformed_variable_names_the_variable() {
        let err = parse_var::<u32>("VEIL_CONNECT_RETRIES", Some("five".to_string()), 5).unwrap_err();
        assert!(err.to_string().contains("VEIL_CONNECT_RETRIES"));

        assert_eq!(parse_var::<u32>("VEIL_CONNECT_RETRIES", None, 5).unwrap(), 5);
        assert_eq!(parse_var::<u64>("VEIL_RETRY_DELAY_MS", Some(" 250 ".to_string()), 500).unwrap(), 250);
        assert!(parse_var::<f64>("VEIL_RETRY_BACKOFF", Some("fast".to_string()), 2.0).is_err());
    }

    #[test]
    fn test_builder_sets_shard() {
        let config = WorkerConfig::new("ws://w:1").with_shard([9; 32]);
        assert_eq!(config.shard, Some([9; 32]));
    }
}
