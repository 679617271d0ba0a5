//! Hashmark Core Library
//!
//! Benchmark execution engine for comparing the throughput of byte-hashing
//! and checksum algorithms over varying input sizes. Provides workload
//! generation, the benchmark registry, warmup/measurement orchestration
//! with optional process isolation, result aggregation, and JSON report
//! output.
//!
//! The functions under test are opaque `(bytes) -> u64` plugins; this crate
//! contains no hash implementations of its own.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod isolation;
pub mod registry;
pub mod report;
pub mod state;
pub mod workload;

// Re-export commonly used types
pub use aggregate::{Measurement, ResultAggregator, Summary};
pub use config::{ConfigLoader, HarnessConfig, IsolationMode};
pub use engine::{CancelToken, ExecutionEngine, RunOutcome};
pub use error::{
    AggregateError, ConfigError, HarnessError, HarnessResult, PairError, WorkloadError,
};
pub use isolation::{WorkerRequest, WorkerSpec};
pub use registry::{BenchmarkEntry, BenchmarkFn, BenchmarkRegistry};
pub use report::{JsonReporter, PairFailure, ReportSink, RunReport, SystemInfo};
pub use state::IterationState;
pub use workload::WorkloadGenerator;
