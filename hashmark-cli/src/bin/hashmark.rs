// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI entry point for the hashmark harness.
//!
//! Registers the adapter roster, runs the execution engine over the
//! configured benchmark x size matrix, prints a summary table, and writes a
//! JSON report. Also serves as its own fork-isolation worker: when the
//! worker environment variables are present the process runs exactly one
//! pair and emits raw measurements as JSON on stdout.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hashmark_cli::algorithms;
use hashmark_core::{
    ConfigLoader, ExecutionEngine, HarnessConfig, IsolationMode, JsonReporter, ReportSink,
    RunOutcome, RunReport, Summary, WorkerRequest, WorkerSpec,
};

#[derive(Parser)]
#[command(name = "hashmark")]
#[command(about = "Compare checksum and hash function throughput")]
struct Args {
    /// Input sizes in bytes, comma separated (default: 16,128,1024,8196,65536,524288)
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Number of discarded warmup iterations per pair
    #[arg(long)]
    warmup: Option<u32>,

    /// Number of recorded measurement iterations per pair
    #[arg(long)]
    measurement: Option<u32>,

    /// Minimum wall time per timed iteration, in milliseconds
    #[arg(long)]
    min_time_ms: Option<u64>,

    /// Root seed for workload generation
    #[arg(long)]
    seed: Option<u64>,

    /// Run each pair in a forked worker process
    #[arg(long)]
    fork: bool,

    /// YAML configuration file (flags override file values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only run the named benchmarks (repeatable)
    #[arg(short, long)]
    bench: Vec<String>,

    /// List registered benchmarks and exit
    #[arg(long)]
    list: bool,

    /// Output directory for JSON reports
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Run in quick mode (1 warmup, 3 measurements, 10ms budget)
    #[arg(long)]
    quick: bool,
}

fn main() -> anyhow::Result<()> {
    // Fork-isolation worker mode: decided by environment, before any
    // argument parsing or logging that could pollute stdout.
    if let Some(request) = WorkerRequest::from_env()? {
        return run_worker(request);
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "hashmark=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry = algorithms::build_registry()?;
    if args.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let registry = if args.bench.is_empty() {
        registry
    } else {
        registry.filtered(&args.bench)?
    };

    let config = build_config(&args)?;

    println!("hashmark {}", env!("CARGO_PKG_VERSION"));
    println!("=============");
    println!("benchmarks:  {}", registry.len());
    println!("sizes:       {:?}", config.sizes);
    println!(
        "iterations:  {} warmup + {} measurement, >={}ms each",
        config.warmup_iterations,
        config.measurement_iterations,
        config.min_iteration_time.as_millis()
    );
    println!("isolation:   {:?}", config.isolation);
    println!();

    let worker = WorkerSpec::new(std::env::current_exe()?);
    let mut engine = ExecutionEngine::new(config).with_worker(worker);
    let outcome = engine.run(&registry)?;

    print_summary(&outcome);

    let reporter = JsonReporter::new(&args.output)?;
    let report = RunReport::from_outcome(&outcome);
    reporter.emit(&report)?;
    println!();
    println!("report written to {}", args.output.display());

    if !outcome.succeeded() {
        anyhow::bail!("no benchmark pair produced a summary");
    }
    Ok(())
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> anyhow::Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => HarnessConfig::default(),
    };

    if args.quick {
        config.warmup_iterations = 1;
        config.measurement_iterations = 3;
        config.min_iteration_time = Duration::from_millis(10);
    }

    if let Some(sizes) = &args.sizes {
        config.sizes = sizes.clone();
    }
    if let Some(warmup) = args.warmup {
        config.warmup_iterations = warmup;
    }
    if let Some(measurement) = args.measurement {
        config.measurement_iterations = measurement;
    }
    if let Some(min_time_ms) = args.min_time_ms {
        config.min_iteration_time = Duration::from_millis(min_time_ms);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.fork {
        config.isolation = IsolationMode::Forked;
    }

    config.validate()?;
    Ok(config)
}

/// Run one pair as a fork-isolation worker and print measurements on
/// stdout.
fn run_worker(request: WorkerRequest) -> anyhow::Result<()> {
    let registry = algorithms::build_registry()?;
    let func = registry.lookup(&request.benchmark)?;

    let engine = ExecutionEngine::new(request.config);
    let measurements = engine
        .measure_pair(&func, &request.benchmark, request.size)
        .map_err(|e| anyhow::anyhow!("pair measurement failed: {}", e))?;

    serde_json::to_writer(std::io::stdout().lock(), &measurements)?;
    Ok(())
}

fn print_summary(outcome: &RunOutcome) {
    println!(
        "{:<12} {:>10} {:>4} {:>14} {:>14} {:>14}",
        "benchmark", "size", "n", "mean", "stddev", "ns/call"
    );
    for s in &outcome.summaries {
        println!(
            "{:<12} {:>10} {:>4} {:>14} {:>14} {:>14.1}",
            s.benchmark,
            s.size,
            s.count,
            Summary::format_bps(s.mean_bps),
            Summary::format_bps(s.stddev_bps),
            s.mean_ns_per_call
        );
    }

    if !outcome.failures.is_empty() {
        println!();
        println!("Failures");
        println!("--------");
        for f in &outcome.failures {
            println!("{} @ {} bytes: {}", f.benchmark, f.size, f.error);
        }
    }
}
