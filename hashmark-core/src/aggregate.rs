// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Measurement collection and statistical reduction.
//!
//! Measurements are append-only observations; summaries are derived from
//! them on demand and recomputable at any time. The reduction uses
//! Welford's incremental algorithm: sample counts are small but elapsed
//! values reach into the billions of nanoseconds, where the naive
//! sum-of-squares formula loses precision.

use serde::{Deserialize, Serialize};

use crate::error::AggregateError;

/// One recorded observation for a (benchmark, size) pair. Never mutated
/// after recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Name of the benchmark function.
    pub benchmark: String,
    /// Input size in bytes.
    pub size: usize,
    /// Wall time of the whole timed iteration.
    pub elapsed_ns: u64,
    /// Number of function calls inside the timed iteration.
    pub calls: u64,
}

impl Measurement {
    /// Bytes processed per second over this iteration.
    pub fn throughput_bps(&self) -> f64 {
        // Coarse clocks can report 0ns for a single cheap call.
        let elapsed_ns = self.elapsed_ns.max(1);
        (self.size as u64 * self.calls) as f64 * 1e9 / elapsed_ns as f64
    }
}

/// Summary statistics for one (benchmark, size) pair, derived from its
/// per-iteration throughput observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Name of the benchmark function.
    pub benchmark: String,
    /// Input size in bytes.
    pub size: usize,
    /// Number of measurements the summary was computed from.
    pub count: u64,
    /// Mean throughput in bytes per second.
    pub mean_bps: f64,
    /// Sample standard deviation of the throughput.
    pub stddev_bps: f64,
    /// Slowest observed iteration throughput.
    pub min_bps: f64,
    /// Fastest observed iteration throughput.
    pub max_bps: f64,
    /// Mean wall time of a single function call.
    pub mean_ns_per_call: f64,
}

impl Summary {
    /// Format a throughput value in human-readable form.
    pub fn format_bps(bps: f64) -> String {
        if bps < 1_000.0 {
            format!("{:.2} B/s", bps)
        } else if bps < 1_000_000.0 {
            format!("{:.2} KB/s", bps / 1_000.0)
        } else if bps < 1_000_000_000.0 {
            format!("{:.2} MB/s", bps / 1_000_000.0)
        } else {
            format!("{:.2} GB/s", bps / 1_000_000_000.0)
        }
    }
}

/// Append-only measurement store with on-demand summarization.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    measurements: Vec<Measurement>,
}

impl ResultAggregator {
    /// Create a new empty aggregator.
    pub fn new() -> Self {
        Self {
            measurements: Vec::new(),
        }
    }

    /// Append one measurement.
    pub fn record(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// Append a batch of measurements.
    pub fn record_all(&mut self, measurements: impl IntoIterator<Item = Measurement>) {
        self.measurements.extend(measurements);
    }

    /// All recorded measurements, in recording order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Total number of recorded measurements.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Check if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Reduce all measurements matching (benchmark, size) to a summary.
    ///
    /// Returns an explicit NoData error when nothing matches - a silent
    /// zero would be indistinguishable from a real measurement.
    pub fn summarize(&self, benchmark: &str, size: usize) -> Result<Summary, AggregateError> {
        let mut count = 0u64;
        let mut mean = 0.0f64;
        let mut m2 = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut total_elapsed_ns = 0u128;
        let mut total_calls = 0u64;

        for m in self
            .measurements
            .iter()
            .filter(|m| m.benchmark == benchmark && m.size == size)
        {
            let bps = m.throughput_bps();
            count += 1;
            let delta = bps - mean;
            mean += delta / count as f64;
            m2 += delta * (bps - mean);
            min = min.min(bps);
            max = max.max(bps);
            total_elapsed_ns += u128::from(m.elapsed_ns);
            total_calls += m.calls;
        }

        if count == 0 {
            return Err(AggregateError::NoData {
                benchmark: benchmark.to_string(),
                size,
            });
        }

        let stddev = if count > 1 {
            (m2 / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Summary {
            benchmark: benchmark.to_string(),
            size,
            count,
            mean_bps: mean,
            stddev_bps: stddev,
            min_bps: min,
            max_bps: max,
            mean_ns_per_call: total_elapsed_ns as f64 / total_calls as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(benchmark: &str, size: usize, elapsed_ns: u64, calls: u64) -> Measurement {
        Measurement {
            benchmark: benchmark.to_string(),
            size,
            elapsed_ns,
            calls,
        }
    }

    #[test]
    fn test_throughput_calculation() {
        // 1024 bytes x 1000 calls in one second = ~1 MB/s
        let m = measurement("crc32", 1024, 1_000_000_000, 1000);
        assert!((m.throughput_bps() - 1_024_000.0).abs() < 0.01);
    }

    #[test]
    fn test_throughput_zero_elapsed_clamped() {
        let m = measurement("crc32", 16, 0, 1);
        assert!(m.throughput_bps().is_finite());
    }

    #[test]
    fn test_summarize_no_data() {
        let aggregator = ResultAggregator::new();
        let result = aggregator.summarize("crc32", 16);
        assert!(matches!(result, Err(AggregateError::NoData { .. })));
    }

    #[test]
    fn test_summarize_count_matches_records() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(measurement("crc32", 16, 100, 1));
        aggregator.record(measurement("crc32", 16, 110, 1));
        aggregator.record(measurement("crc32", 16, 120, 1));
        aggregator.record(measurement("crc32", 1024, 100, 1));
        aggregator.record(measurement("adler32", 16, 100, 1));

        let summary = aggregator.summarize("crc32", 16).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(aggregator.len(), 5);
    }

    #[test]
    fn test_summarize_statistics() {
        let mut aggregator = ResultAggregator::new();
        // Throughputs: 1e9, 2e9, 3e9 bytes/sec.
        aggregator.record(measurement("x", 1000, 1000, 1));
        aggregator.record(measurement("x", 1000, 500, 1));
        aggregator.record(measurement("x", 1000, 1000, 3));

        let summary = aggregator.summarize("x", 1000).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean_bps - 2e9).abs() < 1.0);
        assert!((summary.min_bps - 1e9).abs() < 1.0);
        assert!((summary.max_bps - 3e9).abs() < 1.0);
        // Sample stddev of {1e9, 2e9, 3e9} is exactly 1e9.
        assert!((summary.stddev_bps - 1e9).abs() < 1.0);
        // 2500ns over 5 calls.
        assert!((summary.mean_ns_per_call - 500.0).abs() < 0.01);
    }

    #[test]
    fn test_summarize_single_sample_has_zero_stddev() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(measurement("x", 16, 100, 1));
        let summary = aggregator.summarize("x", 16).unwrap();
        assert_eq!(summary.stddev_bps, 0.0);
        assert_eq!(summary.min_bps, summary.max_bps);
    }

    #[test]
    fn test_summarize_idempotent() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(measurement("x", 1000, 12_345, 7));
        aggregator.record(measurement("x", 1000, 23_456, 9));
        aggregator.record(measurement("x", 1000, 34_567, 11));

        let first = aggregator.summarize("x", 1000).unwrap();
        let second = aggregator.summarize("x", 1000).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.mean_bps.to_bits(), second.mean_bps.to_bits());
        assert_eq!(first.stddev_bps.to_bits(), second.stddev_bps.to_bits());
    }

    #[test]
    fn test_format_bps() {
        assert_eq!(Summary::format_bps(500.0), "500.00 B/s");
        assert_eq!(Summary::format_bps(1_500.0), "1.50 KB/s");
        assert_eq!(Summary::format_bps(1_500_000.0), "1.50 MB/s");
        assert_eq!(Summary::format_bps(1_500_000_000.0), "1.50 GB/s");
    }
}
