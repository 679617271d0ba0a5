// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Harness configuration with strict boot-time validation.
//!
//! Configuration is supplied externally (CLI flags, a YAML file, or the
//! defaults) and validated before any measurement begins. Any invalid field
//! is a ConfigError that prevents the run from starting.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default parameter set of input sizes, in bytes.
pub const DEFAULT_SIZES: &[usize] = &[16, 128, 1024, 8196, 65536, 524288];

/// Default root seed for workload generation.
pub const DEFAULT_SEED: u64 = 0xCAFE_BABE;

/// How each (benchmark, size) pair is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationMode {
    /// Run the pair inside the harness process.
    #[default]
    InProcess,
    /// Run the pair in a freshly spawned worker process.
    Forked,
}

/// Validated harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Ordered set of input sizes every benchmark is run against.
    pub sizes: Vec<usize>,
    /// Timed iterations whose results are discarded.
    pub warmup_iterations: u32,
    /// Timed iterations whose results are recorded.
    pub measurement_iterations: u32,
    /// Wall-time budget per timed iteration. Each iteration loops calls
    /// until at least this much time has elapsed; zero means exactly one
    /// call per iteration.
    pub min_iteration_time: Duration,
    /// Whether pairs run in-process or in forked workers.
    pub isolation: IsolationMode,
    /// Root seed for the workload generator.
    pub seed: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            warmup_iterations: 5,
            measurement_iterations: 5,
            min_iteration_time: Duration::from_secs(1),
            isolation: IsolationMode::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl HarnessConfig {
    /// Validate the configuration. Violations abort the run before any
    /// measurement begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::EmptySizes);
        }

        let mut seen = HashSet::new();
        for (index, &size) in self.sizes.iter().enumerate() {
            if size == 0 {
                return Err(ConfigError::ZeroSize { index });
            }
            if !seen.insert(size) {
                return Err(ConfigError::DuplicateSize { size });
            }
        }

        if self.warmup_iterations == 0 {
            return Err(ConfigError::ZeroWarmupIterations);
        }
        if self.measurement_iterations == 0 {
            return Err(ConfigError::ZeroMeasurementIterations);
        }

        Ok(())
    }
}

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawHarnessConfig {
    #[serde(default = "default_sizes")]
    sizes: Vec<usize>,
    #[serde(default = "default_warmup")]
    warmup_iterations: u32,
    #[serde(default = "default_measurement")]
    measurement_iterations: u32,
    #[serde(default = "default_min_iteration_time_ms")]
    min_iteration_time_ms: u64,
    #[serde(default)]
    isolation: IsolationMode,
    #[serde(default = "default_seed")]
    seed: u64,
}

fn default_sizes() -> Vec<usize> {
    DEFAULT_SIZES.to_vec()
}

fn default_warmup() -> u32 {
    5
}

fn default_measurement() -> u32 {
    5
}

fn default_min_iteration_time_ms() -> u64 {
    1000
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<HarnessConfig, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> Result<HarnessConfig, ConfigError> {
        let raw: RawHarnessConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("YAML parse error: {}", e),
            })?;

        let config = HarnessConfig {
            sizes: raw.sizes,
            warmup_iterations: raw.warmup_iterations,
            measurement_iterations: raw.measurement_iterations,
            min_iteration_time: Duration::from_millis(raw.min_iteration_time_ms),
            isolation: raw.isolation,
            seed: raw.seed,
        };

        config.validate()?;
        Ok(config)
    }
}
