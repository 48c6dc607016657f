//! Deterministic state fixtures.
//!
//! - [`Mutator`] applies sparse, clustered edits to a state buffer.
//! - [`state_sequence`] builds a whole history from a seed.
//! - [`with_byte`] builds a zeroed buffer with one byte set.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded source of step-to-step edits.
pub struct Mutator {
    rng: ChaCha8Rng,
    /// Maximum number of edited regions per step.
    pub max_bursts: u32,
    /// Maximum width of one edited region in bytes.
    pub max_width: u32,
}

impl Mutator {
    /// A mutator seeded with `seed` and the default burst shape.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_bursts: 4,
            max_width: 32,
        }
    }

    /// Edit between 1 and `max_bursts` regions of `state` in place.
    pub fn mutate(&mut self, state: &mut [u8]) {
        if state.is_empty() {
            return;
        }
        let bursts = 1 + self.rng.next_u32() % self.max_bursts.max(1);
        for _ in 0..bursts {
            let start = (self.rng.next_u64() % state.len() as u64) as usize;
            let width = 1 + (self.rng.next_u32() % self.max_width.max(1)) as usize;
            let end = (start + width).min(state.len());
            self.rng.fill_bytes(&mut state[start..end]);
        }
    }
}

/// `steps + 1` states of `len` bytes: a zeroed start and `steps` mutations.
pub fn state_sequence(len: usize, steps: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut mutator = Mutator::new(seed);
    let mut state = vec![0u8; len];
    let mut sequence = Vec::with_capacity(steps + 1);
    sequence.push(state.clone());
    for _ in 0..steps {
        mutator.mutate(&mut state);
        sequence.push(state.clone());
    }
    sequence
}

/// A zeroed buffer of `len` bytes with `state[index] = value`.
pub fn with_byte(len: usize, index: usize, value: u8) -> Vec<u8> {
    let mut state = vec![0u8; len];
    state[index] = value;
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_has_start_plus_steps() {
        let seq = state_sequence(100, 7, 9);
        assert_eq!(seq.len(), 8);
        assert!(seq[0].iter().all(|&b| b == 0));
        assert!(seq.iter().all(|s| s.len() == 100));
    }

    #[test]
    fn same_seed_same_sequence() {
        assert_eq!(state_sequence(256, 5, 11), state_sequence(256, 5, 11));
        assert_ne!(state_sequence(256, 5, 11), state_sequence(256, 5, 12));
    }

    #[test]
    fn with_byte_sets_one_byte() {
        let s = with_byte(1024, 500, 0xFF);
        assert_eq!(s[500], 0xFF);
        assert_eq!(s.iter().filter(|&&b| b != 0).count(), 1);
    }
}
