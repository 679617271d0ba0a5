// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run reports and the JSON report sink.
//!
//! The engine produces summaries and failures; this module packages them
//! with host metadata into a serializable report and hands it to a
//! [`ReportSink`]. The provided sink writes timestamped JSON files for
//! later comparison; table formatting lives outside the core.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::aggregate::Summary;
use crate::engine::RunOutcome;
use crate::error::ReportError;

/// Record of a (benchmark, size) pair that could not be measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFailure {
    /// Name of the benchmark function.
    pub benchmark: String,
    /// Input size in bytes.
    pub size: usize,
    /// Rendered cause of the failure.
    pub error: String,
}

impl PairFailure {
    /// Record a failure for one pair.
    pub fn new(benchmark: impl Into<String>, size: usize, error: impl Into<String>) -> Self {
        Self {
            benchmark: benchmark.into(),
            size,
            error: error.into(),
        }
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete report for one harness invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Suite identifier
    pub suite: String,
    /// Harness version
    pub version: String,
    /// Timestamp when the run finished
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Per-pair summaries
    pub summaries: Vec<Summary>,
    /// Per-pair failures
    pub failures: Vec<PairFailure>,
}

impl RunReport {
    /// Create an empty report for this host.
    pub fn new() -> Self {
        Self {
            suite: "hashmark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            summaries: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Build a report from a finished run.
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        Self {
            summaries: outcome.summaries.clone(),
            failures: outcome.failures.clone(),
            ..Self::new()
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// External collaborator that renders aggregated results.
pub trait ReportSink {
    /// Consume one finished report.
    fn emit(&self, report: &RunReport) -> Result<(), ReportError>;
}

/// JSON reporter writing timestamped report files.
pub struct JsonReporter {
    /// Output directory for benchmark data
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a report to a timestamped JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &RunReport) -> Result<PathBuf, ReportError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let filename = format!("hashmark_{}.json", timestamp);
        let filepath = self.output_dir.join(&filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// List all existing report files in the output directory.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReportError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load an existing report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<RunReport, ReportError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

impl ReportSink for JsonReporter {
    fn emit(&self, report: &RunReport) -> Result<(), ReportError> {
        self.save(report).map(|_| ())
    }
}
