//! Veil Core
//!
//! Resilience utilities and configuration shared by the client crates:
//!
//! - [`with_retry`]: exponential backoff around transient failures such as a
//!   socket-open race or lock contention with a restarting worker
//! - [`ScopeStack`]: acquire/release chains torn down in reverse order
//! - [`WorkerConfig`]: endpoint, shard and connect policy, loadable from env

pub mod config;
pub mod retry;
pub mod scope;

pub use config::WorkerConfig;
pub use retry::{with_retry, RetryConfig};
pub use scope::ScopeStack;
