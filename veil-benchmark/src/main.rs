//! Veil stress tool
//!
//! Opens `--connections` independent worker connections and sends `--requests`
//! nonce getters on each, then prints a latency histogram.

mod config;
mod runner;
mod stats;

use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::BenchmarkArgs;
use crate::runner::{run_connection, RunnerConfig};
use crate::stats::LatencyStats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = BenchmarkArgs::parse();
    let worker = args.worker_config()?;

    info!("========== Veil Benchmark ==========");
    info!("Endpoint:    {}", worker.endpoint);
    info!("Connections: {}", args.connections);
    info!("Requests:    {} per connection", args.requests);

    let config = Arc::new(RunnerConfig {
        worker,
        requests: args.requests,
        scheme: args.scheme,
        nonce_getter: args.nonce_getter,
    });

    let started = Instant::now();
    let handles: Vec<_> = (0..args.connections)
        .map(|index| tokio::spawn(run_connection(index, Arc::clone(&config))))
        .collect();

    let mut total = LatencyStats::new()?;
    let mut failed_connections = 0usize;
    for (index, result) in futures::future::join_all(handles).await.into_iter().enumerate() {
        match result {
            Ok(Ok(stats)) => total.merge(&stats)?,
            Ok(Err(e)) => {
                error!(connection = index, error = %e, "Connection failed");
                failed_connections += 1;
            }
            Err(e) => {
                error!(connection = index, error = %e, "Connection task panicked");
                failed_connections += 1;
            }
        }
    }

    total.report(started.elapsed());
    if failed_connections > 0 {
        anyhow::bail!("{} of {} connections failed", failed_connections, args.connections);
    }
    Ok(())
}
