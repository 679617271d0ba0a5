// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark execution engine.
//!
//! Drives every (benchmark, size) pair through the same protocol: setup
//! (with optional fork isolation), a purity probe, discarded warmup
//! iterations, recorded measurement iterations, teardown. Pairs run
//! strictly sequentially - concurrent execution would invalidate the
//! timings through shared caches and scheduler noise.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::hint;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::aggregate::{Measurement, ResultAggregator, Summary};
use crate::config::{HarnessConfig, IsolationMode};
use crate::error::{ConfigError, HarnessResult, PairError};
use crate::isolation::{self, WorkerSpec};
use crate::registry::{BenchmarkFn, BenchmarkRegistry};
use crate::report::PairFailure;
use crate::state::IterationState;
use crate::workload::WorkloadGenerator;

/// Cooperative cancellation handle. Checked at pair boundaries only -
/// interrupting a measurement mid-iteration would invalidate its timing.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The engine stops before the next pair;
    /// already-recorded measurements are retained.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The outcome of one harness run: a summary or a failure per attempted
/// pair.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// One summary per successfully measured pair, in execution order.
    pub summaries: Vec<Summary>,
    /// One record per pair that could not be measured.
    pub failures: Vec<PairFailure>,
}

impl RunOutcome {
    /// A run succeeds if at least one pair produced a summary.
    pub fn succeeded(&self) -> bool {
        !self.summaries.is_empty()
    }
}

/// Orchestrates benchmark execution over the full benchmark x size matrix.
pub struct ExecutionEngine {
    config: HarnessConfig,
    aggregator: ResultAggregator,
    cancel: CancelToken,
    worker: Option<WorkerSpec>,
}

impl ExecutionEngine {
    /// Create an engine for the given configuration.
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            aggregator: ResultAggregator::new(),
            cancel: CancelToken::new(),
            worker: None,
        }
    }

    /// Provide the worker command used for forked isolation. Required when
    /// the configuration selects [`IsolationMode::Forked`].
    pub fn with_worker(mut self, worker: WorkerSpec) -> Self {
        self.worker = Some(worker);
        self
    }

    /// A handle that can cancel this run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The measurements accumulated so far.
    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    /// Run every registered benchmark against every configured size.
    ///
    /// Pairs execute sequentially: for each benchmark in registration
    /// order, for each size in parameter-set order. Per-pair errors are
    /// recorded as failures; only configuration errors abort the run.
    pub fn run(&mut self, registry: &BenchmarkRegistry) -> HarnessResult<RunOutcome> {
        self.config.validate()?;
        if registry.is_empty() {
            return Err(ConfigError::NoBenchmarks.into());
        }

        tracing::info!(
            benchmarks = registry.len(),
            sizes = self.config.sizes.len(),
            isolation = ?self.config.isolation,
            "starting benchmark run"
        );

        let sizes = self.config.sizes.clone();
        let mut outcome = RunOutcome::default();

        'pairs: for entry in registry.entries() {
            for &size in &sizes {
                if self.cancel.is_cancelled() {
                    tracing::warn!("run cancelled, stopping at pair boundary");
                    break 'pairs;
                }

                let result = match self.config.isolation {
                    IsolationMode::Forked => match &self.worker {
                        Some(spec) => {
                            isolation::run_pair(spec, entry.name(), size, &self.config)
                        }
                        None => Err(PairError::IsolationSpawn {
                            reason: "fork isolation requested but no worker command configured"
                                .to_string(),
                        }),
                    },
                    IsolationMode::InProcess => {
                        self.measure_pair(entry.func(), entry.name(), size)
                    }
                };

                match result {
                    Ok(measurements) => {
                        self.aggregator.record_all(measurements);
                        match self.aggregator.summarize(entry.name(), size) {
                            Ok(summary) => {
                                tracing::info!(
                                    benchmark = %entry.name(),
                                    size,
                                    mean = %Summary::format_bps(summary.mean_bps),
                                    "pair complete"
                                );
                                outcome.summaries.push(summary);
                            }
                            Err(e) => {
                                outcome.failures.push(PairFailure::new(
                                    entry.name(),
                                    size,
                                    e.to_string(),
                                ));
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            benchmark = %entry.name(),
                            size,
                            error = %e,
                            "pair failed"
                        );
                        outcome
                            .failures
                            .push(PairFailure::new(entry.name(), size, e.to_string()));
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Measure one (benchmark, size) pair in-process and return its raw
    /// measurements. Also the entry point used by forked workers.
    pub fn measure_pair(
        &self,
        func: &BenchmarkFn,
        name: &str,
        size: usize,
    ) -> Result<Vec<Measurement>, PairError> {
        let mut generator = WorkloadGenerator::new(self.pair_seed(name, size));

        // Purity probe: a benchmark function must map identical input to
        // identical output, otherwise cross-checks and repeated timing are
        // meaningless.
        let probe = generator.next_buffer(size)?;
        let first = checked_call(func, &probe)?;
        let second = checked_call(func, &probe)?;
        if first != second {
            return Err(PairError::NonDeterministic {
                benchmark: name.to_string(),
                first,
                second,
            });
        }

        let mut state = IterationState::prepare(&mut generator, size)?;

        for iteration in 0..self.config.warmup_iterations {
            let (elapsed_ns, calls) = self.timed_iteration(func, state.buffer())?;
            tracing::debug!(
                benchmark = %name,
                size,
                iteration,
                elapsed_ns,
                calls,
                "warmup iteration discarded"
            );
            state.refresh(&mut generator)?;
        }

        let count = self.config.measurement_iterations;
        let mut measurements = Vec::with_capacity(count as usize);
        for iteration in 0..count {
            let (elapsed_ns, calls) = self.timed_iteration(func, state.buffer())?;
            measurements.push(Measurement {
                benchmark: name.to_string(),
                size,
                elapsed_ns,
                calls,
            });
            if iteration + 1 < count {
                state.refresh(&mut generator)?;
            }
        }

        Ok(measurements)
    }

    /// One timed iteration: loop calls over the buffer until the wall-time
    /// budget elapses. Only the call loop sits inside the timer; the buffer
    /// was generated outside it.
    fn timed_iteration(
        &self,
        func: &BenchmarkFn,
        buffer: &[u8],
    ) -> Result<(u64, u64), PairError> {
        let budget = self.config.min_iteration_time;
        let mut calls = 0u64;

        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| loop {
            hint::black_box(func(hint::black_box(buffer)));
            calls += 1;
            if start.elapsed() >= budget {
                break;
            }
        }));
        let elapsed_ns = start.elapsed().as_nanos() as u64;

        outcome.map_err(|payload| PairError::Execution {
            message: panic_message(payload),
        })?;

        Ok((elapsed_ns, calls))
    }

    /// Derive the workload seed for one pair. Stable across runs and
    /// processes, so a forked worker reproduces the same buffers the
    /// in-process path would see.
    fn pair_seed(&self, name: &str, size: usize) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        size.hash(&mut hasher);
        self.config.seed ^ hasher.finish()
    }
}

/// Invoke the function under test once, converting a panic into a pair
/// error.
fn checked_call(func: &BenchmarkFn, buffer: &[u8]) -> Result<u64, PairError> {
    panic::catch_unwind(AssertUnwindSafe(|| func(buffer))).map_err(|payload| {
        PairError::Execution {
            message: panic_message(payload),
        }
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "benchmark function panicked".to_string()
    }
}
