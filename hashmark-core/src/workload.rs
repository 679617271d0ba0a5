// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Deterministic random workload generation.
//!
//! Benchmark inputs are pseudo-random byte buffers. Determinism matters in
//! two opposite directions: a fixed `(size, seed)` pair must always produce
//! the same buffer (so different algorithms can be cross-checked on
//! identical input), while successive refreshes within one run must produce
//! different buffers (so no benchmark ever runs against a cacheable
//! constant).

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::error::WorkloadError;

/// Generate exactly `size` bytes from a seeded pseudo-random sequence.
///
/// Deterministic for a fixed `(size, seed)` pair. Fails only on a zero
/// size.
pub fn generate(size: usize, seed: u64) -> Result<Vec<u8>, WorkloadError> {
    if size == 0 {
        return Err(WorkloadError::InvalidSize { size });
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut buffer = vec![0u8; size];
    rng.fill_bytes(&mut buffer);
    Ok(buffer)
}

/// Seed-stream workload generator.
///
/// Holds an advancing RNG that derives a fresh seed for every buffer, so
/// repeated refreshes differ while the whole sequence is reproducible from
/// the root seed.
#[derive(Debug)]
pub struct WorkloadGenerator {
    rng: SmallRng,
}

impl WorkloadGenerator {
    /// Create a generator from a root seed.
    pub fn new(root_seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(root_seed),
        }
    }

    /// Produce the next buffer in the stream, advancing the seed state.
    pub fn next_buffer(&mut self, size: usize) -> Result<Vec<u8>, WorkloadError> {
        let seed = self.rng.next_u64();
        generate(size, seed)
    }
}
