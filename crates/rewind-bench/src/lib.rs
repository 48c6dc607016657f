//! Benchmark profiles for the rewind engine.
//!
//! Provides state pairs and histories shaped like real emulator save
//! states:
//!
//! - [`sparse_pair`]: a large state with a handful of edited regions
//! - [`dense_pair`]: every other word changed, the codec's worst case
//! - [`history`]: a seeded sequence of sparse steps
//! - [`session_for`]: a session sized for a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rewind_engine::{RewindConfig, RewindError, RewindSession};
use rewind_test_utils::fixtures::{state_sequence, Mutator};

/// Size of a typical 16-bit console save state.
pub const REFERENCE_STATE_SIZE: usize = 256 * 1024;

/// History capacity used by the session profiles.
pub const REFERENCE_CAPACITY: usize = 16 * 1024 * 1024;

/// Two states of `len` bytes differing in a few seeded regions.
pub fn sparse_pair(len: usize, seed: u64) -> (Vec<u8>, Vec<u8>) {
    let old = vec![0u8; len];
    let mut new = old.clone();
    Mutator::new(seed).mutate(&mut new);
    (old, new)
}

/// Two states of `len` bytes where every other word differs.
///
/// Single equal words never end a change run, so this encodes as one
/// maximal run per block and exercises the payload path.
pub fn dense_pair(len: usize) -> (Vec<u8>, Vec<u8>) {
    let old = vec![0u8; len];
    let new = (0..len).map(|i| if (i / 2) % 2 == 0 { 0xA5 } else { 0 }).collect();
    (old, new)
}

/// `steps + 1` states of `len` bytes, each a sparse edit of the last.
pub fn history(len: usize, steps: usize, seed: u64) -> Vec<Vec<u8>> {
    state_sequence(len, steps, seed)
}

/// A session for `state_size`-byte states with the reference capacity.
pub fn session_for(state_size: usize) -> Result<RewindSession, RewindError> {
    RewindSession::new(RewindConfig::new(state_size).with_capacity(REFERENCE_CAPACITY))
}
