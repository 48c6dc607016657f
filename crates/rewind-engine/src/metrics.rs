//! Cumulative counters for a rewind session.

/// Counters collected over the lifetime of a session.
///
/// Cleared only when the session is dropped; [`clear()`](crate::RewindSession::clear)
/// drops history but keeps counting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewindMetrics {
    /// States handed to `push_do`.
    pub pushes: u64,
    /// Successful pops.
    pub pops: u64,
    /// Pops that failed because no history remained.
    pub empty_pops: u64,
    /// Oldest entries dropped to make room for new ones.
    pub evictions: u64,
    /// Total encoded patch bytes written to the log.
    pub patch_bytes: u64,
    /// Encoded length of the most recent patch.
    pub last_patch_len: usize,
}
