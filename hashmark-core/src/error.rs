//! Custom error types for the hashmark harness.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.
//! The taxonomy separates fatal pre-run configuration errors from per-pair
//! errors that are recorded as failures without aborting the run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the harness.
/// Per-pair errors ([`PairError`]) are deliberately absent: they are
/// captured as failure records during a run and never propagate here.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Configuration errors cause immediate termination before any measurement.
/// Nothing meaningful can be produced from an invalid setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Duplicate benchmark name: {name}")]
    DuplicateBenchmark { name: String },

    #[error("Benchmark not found: {name}")]
    BenchmarkNotFound { name: String },

    #[error("No benchmark functions registered")]
    NoBenchmarks,

    #[error("Parameter set is empty - at least one input size is required")]
    EmptySizes,

    #[error("Input size at index {index} is zero - sizes must be positive")]
    ZeroSize { index: usize },

    #[error("Duplicate input size: {size}")]
    DuplicateSize { size: usize },

    #[error("Warmup iteration count must be at least 1")]
    ZeroWarmupIterations,

    #[error("Measurement iteration count must be at least 1")]
    ZeroMeasurementIterations,

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Workload generation errors.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("Invalid workload size: {size} - buffers must be at least one byte")]
    InvalidSize { size: usize },
}

/// Per-pair errors. Each is isolated to one (benchmark, size) pair,
/// recorded as a failure, and never aborts the rest of the run.
#[derive(Debug, Error)]
pub enum PairError {
    #[error("Workload generation failed: {0}")]
    Workload(#[from] WorkloadError),

    #[error("Benchmark function panicked: {message}")]
    Execution { message: String },

    #[error(
        "Benchmark '{benchmark}' is not deterministic: \
         {first:#018x} != {second:#018x} on identical input"
    )]
    NonDeterministic {
        benchmark: String,
        first: u64,
        second: u64,
    },

    #[error("Failed to spawn isolated worker: {reason}")]
    IsolationSpawn { reason: String },

    #[error("Isolated worker did not finish within {timeout_ms}ms")]
    IsolationTimeout { timeout_ms: u64 },

    #[error("Isolated worker exited with {status}: {stderr}")]
    WorkerExit { status: String, stderr: String },

    #[error("Worker protocol error: {reason}")]
    WorkerProtocol { reason: String },
}

/// Aggregation errors.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No measurements recorded for benchmark '{benchmark}' at size {size}")]
    NoData { benchmark: String, size: usize },
}

/// Errors that can occur while emitting reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;
