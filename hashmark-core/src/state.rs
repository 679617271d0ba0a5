// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-iteration mutable benchmark state.
//!
//! Each timed iteration owns one input buffer. The buffer is generated
//! outside the timed region and refreshed between iterations so that no
//! iteration ever measures against the previous iteration's bytes.

use crate::error::WorkloadError;
use crate::workload::WorkloadGenerator;

/// The mutable context for one benchmark iteration: the configured input
/// size and the buffer currently under test.
#[derive(Debug)]
pub struct IterationState {
    size: usize,
    buffer: Vec<u8>,
}

impl IterationState {
    /// Set up fresh state with an initial buffer from the generator.
    pub fn prepare(
        generator: &mut WorkloadGenerator,
        size: usize,
    ) -> Result<Self, WorkloadError> {
        let buffer = generator.next_buffer(size)?;
        Ok(Self { size, buffer })
    }

    /// Replace the buffer with the generator's next one. Called between
    /// iterations, never inside the timed region.
    pub fn refresh(&mut self, generator: &mut WorkloadGenerator) -> Result<(), WorkloadError> {
        self.buffer = generator.next_buffer(self.size)?;
        Ok(())
    }

    /// The configured input size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The buffer currently under test.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_fills_buffer() {
        let mut generator = WorkloadGenerator::new(1);
        let state = IterationState::prepare(&mut generator, 128).unwrap();
        assert_eq!(state.size(), 128);
        assert_eq!(state.buffer().len(), 128);
    }

    #[test]
    fn test_refresh_replaces_buffer() {
        let mut generator = WorkloadGenerator::new(1);
        let mut state = IterationState::prepare(&mut generator, 128).unwrap();
        let before = state.buffer().to_vec();

        state.refresh(&mut generator).unwrap();
        assert_eq!(state.buffer().len(), 128);
        assert_ne!(state.buffer(), before.as_slice());
    }

    #[test]
    fn test_prepare_rejects_zero_size() {
        let mut generator = WorkloadGenerator::new(1);
        assert!(IterationState::prepare(&mut generator, 0).is_err());
    }
}
