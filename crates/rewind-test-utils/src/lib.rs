//! Test utilities and mock cores for rewind development.
//!
//! Provides [`MockCore`], a deterministic stand-in for a simulation core,
//! and state-sequence fixtures shaped like real step-to-step changes:
//! sparse, clustered, and reproducible from a seed.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{state_sequence, with_byte, Mutator};

use rewind_engine::{CoreError, StateCore};

/// A fake simulation whose state is a plain byte vector.
///
/// [`advance`](MockCore::advance) mutates a few clustered regions per call,
/// like a game frame touching a handful of objects.
pub struct MockCore {
    state: Vec<u8>,
    mutator: Mutator,
    /// Number of successful `deserialize` calls.
    pub restores: usize,
    /// Make the next `deserialize` fail.
    pub fail_next_restore: bool,
}

impl MockCore {
    pub fn new(state_size: usize, seed: u64) -> Self {
        Self {
            state: vec![0; state_size],
            mutator: Mutator::new(seed),
            restores: 0,
            fail_next_restore: false,
        }
    }

    /// Run one simulated step.
    pub fn advance(&mut self) {
        self.mutator.mutate(&mut self.state);
    }

    pub fn state(&self) -> &[u8] {
        &self.state
    }

    pub fn set_state(&mut self, state: &[u8]) {
        self.state.copy_from_slice(state);
    }
}

impl StateCore for MockCore {
    fn serialize_size(&self) -> usize {
        self.state.len()
    }

    fn serialize(&self, out: &mut [u8]) -> Result<(), CoreError> {
        out.copy_from_slice(&self.state);
        Ok(())
    }

    fn deserialize(&mut self, state: &[u8]) -> Result<(), CoreError> {
        if std::mem::take(&mut self.fail_next_restore) {
            return Err(CoreError::Failed {
                reason: "injected restore failure".to_string(),
            });
        }
        if state.len() != self.state.len() {
            return Err(CoreError::SizeChanged {
                expected: self.state.len(),
                actual: state.len(),
            });
        }
        self.state.copy_from_slice(state);
        self.restores += 1;
        Ok(())
    }
}
