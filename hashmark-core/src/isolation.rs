// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Forked pair execution.
//!
//! Runs one (benchmark, size) pair in a freshly spawned worker process so
//! that no warm state leaks between pairs. The pair request is handed to
//! the worker through environment variables; the worker prints its raw
//! measurements as JSON on stdout and exits. The controlling process blocks
//! on the child and kills it if it overruns a generous timeout.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::aggregate::Measurement;
use crate::config::{HarnessConfig, IsolationMode};
use crate::error::PairError;

/// Environment variable carrying the benchmark name to a worker.
pub const WORKER_BENCH_ENV: &str = "HASHMARK_WORKER_BENCH";
/// Environment variable carrying the input size to a worker.
pub const WORKER_SIZE_ENV: &str = "HASHMARK_WORKER_SIZE";
/// Environment variable carrying the JSON-encoded config to a worker.
pub const WORKER_CONFIG_ENV: &str = "HASHMARK_WORKER_CONFIG";

/// Poll interval while waiting on a worker.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How to launch a worker process.
#[derive(Debug, Clone)]
pub struct WorkerSpec {
    program: PathBuf,
    args: Vec<String>,
}

impl WorkerSpec {
    /// A worker launched as `program` with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a fixed argument passed before the worker environment applies.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// A pair request decoded from the worker environment.
#[derive(Debug)]
pub struct WorkerRequest {
    /// Benchmark name to run.
    pub benchmark: String,
    /// Input size to run it at.
    pub size: usize,
    /// Harness configuration for the worker.
    pub config: HarnessConfig,
}

impl WorkerRequest {
    /// Decode a request from the process environment.
    ///
    /// Returns `Ok(None)` when the process was not launched as a worker,
    /// and an error when the environment is only partially present or
    /// malformed.
    pub fn from_env() -> Result<Option<Self>, PairError> {
        let benchmark = std::env::var(WORKER_BENCH_ENV).ok();
        let size = std::env::var(WORKER_SIZE_ENV).ok();
        let config = std::env::var(WORKER_CONFIG_ENV).ok();

        match (benchmark, size, config) {
            (None, None, None) => Ok(None),
            (Some(benchmark), Some(size), Some(config)) => {
                let size = size.parse().map_err(|_| PairError::WorkerProtocol {
                    reason: format!("invalid {}: {}", WORKER_SIZE_ENV, size),
                })?;
                let config =
                    serde_json::from_str(&config).map_err(|e| PairError::WorkerProtocol {
                        reason: format!("invalid {}: {}", WORKER_CONFIG_ENV, e),
                    })?;
                Ok(Some(Self {
                    benchmark,
                    size,
                    config,
                }))
            }
            _ => Err(PairError::WorkerProtocol {
                reason: "partial worker environment".to_string(),
            }),
        }
    }
}

/// Run one pair in a forked worker and collect its measurements.
pub fn run_pair(
    spec: &WorkerSpec,
    benchmark: &str,
    size: usize,
    config: &HarnessConfig,
) -> Result<Vec<Measurement>, PairError> {
    // The worker must measure in-process; inheriting Forked would recurse.
    let worker_config = HarnessConfig {
        isolation: IsolationMode::InProcess,
        ..config.clone()
    };
    let config_json =
        serde_json::to_string(&worker_config).map_err(|e| PairError::WorkerProtocol {
            reason: format!("failed to encode worker config: {}", e),
        })?;

    let timeout = worker_timeout(config);

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .env(WORKER_BENCH_ENV, benchmark)
        .env(WORKER_SIZE_ENV, size.to_string())
        .env(WORKER_CONFIG_ENV, config_json)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PairError::IsolationSpawn {
            reason: format!("failed to spawn {}: {}", spec.program.display(), e),
        })?;

    tracing::debug!(
        pid = child.id(),
        benchmark,
        size,
        timeout_ms = timeout.as_millis() as u64,
        "spawned isolated worker"
    );

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PairError::IsolationTimeout {
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PairError::IsolationSpawn {
                    reason: format!("failed to wait on worker: {}", e),
                });
            }
        }
    };

    let stdout = read_pipe(child.stdout.take());
    if !status.success() {
        let stderr = read_pipe(child.stderr.take());
        return Err(PairError::WorkerExit {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    serde_json::from_str(&stdout).map_err(|e| PairError::WorkerProtocol {
        reason: format!("unparseable worker output: {}", e),
    })
}

fn read_pipe(pipe: Option<impl Read>) -> String {
    let mut output = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut output);
    }
    output
}

/// Timeout for one worker: several times the expected phase duration, with
/// a floor generous enough for process startup.
fn worker_timeout(config: &HarnessConfig) -> Duration {
    let per_iteration = config.min_iteration_time.max(Duration::from_millis(100));
    let iterations = (config.warmup_iterations + config.measurement_iterations).max(1);
    per_iteration * iterations * 4 + Duration::from_secs(10)
}
