//! Latency statistics

use hdrhistogram::Histogram;
use std::time::Duration;
use tracing::info;

/// Latencies recorded in microseconds, up to one minute
pub struct LatencyStats {
    histogram: Histogram<u64>,
    errors: u64,
}

impl LatencyStats {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            histogram: Histogram::new_with_bounds(1, 60_000_000, 3)?,
            errors: 0,
        })
    }

    pub fn record(&mut self, latency: Duration) {
        self.histogram.saturating_record(latency.as_micros().max(1) as u64);
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn merge(&mut self, other: &LatencyStats) -> anyhow::Result<()> {
        self.histogram.add(&other.histogram)?;
        self.errors += other.errors;
        Ok(())
    }

    pub fn successes(&self) -> u64 {
        self.histogram.len()
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn percentile_ms(&self, quantile: f64) -> f64 {
        self.histogram.value_at_quantile(quantile) as f64 / 1000.0
    }

    pub fn report(&self, elapsed: Duration) {
        let total = self.successes() + self.errors;
        let throughput = if elapsed.is_zero() {
            0.0
        } else {
            self.successes() as f64 / elapsed.as_secs_f64()
        };

        info!("========== Benchmark Results ==========");
        info!("Requests:   {} ({} ok, {} failed)", total, self.successes(), self.errors);
        info!("Elapsed:    {:.2}s", elapsed.as_secs_f64());
        info!("Throughput: {:.1} req/s", throughput);
        if self.successes() > 0 {
            info!("Latency p50: {:.2}ms", self.percentile_ms(0.50));
            info!("Latency p90: {:.2}ms", self.percentile_ms(0.90));
            info!("Latency p99: {:.2}ms", self.percentile_ms(0.99));
            info!("Latency max: {:.2}ms", self.histogram.max() as f64 / 1000.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_merge() {
        let mut a = LatencyStats::new().unwrap();
        let mut b = LatencyStats::new().unwrap();
        for ms in 1..=100 {
            a.record(Duration::from_millis(ms));
        }
        b.record(Duration::from_secs(2));
        b.record_error();

        a.merge(&b).unwrap();
        assert_eq!(a.successes(), 101);
        assert_eq!(a.errors(), 1);
        assert!((a.percentile_ms(0.5) - 51.0).abs() < 1.0);
        assert!(a.percentile_ms(1.0) >= 1999.0);
    }

    #[test]
    fn test_sub_microsecond_latency_is_counted() {
        let mut stats = LatencyStats::new().unwrap();
        stats.record(Duration::from_nanos(10));
        assert_eq!(stats.successes(), 1);
    }
}
