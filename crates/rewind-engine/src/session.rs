//! The rewind session: a bounded, reverse-delta history of states.
//!
//! # Buffer roles
//!
//! Two snapshot buffers swap roles on every push:
//!
//! - the **baseline** holds the newest materialized state, and
//! - the **staged** buffer is where the caller serializes the next state.
//!
//! On [`push_do()`](RewindSession::push_do) the session stores the reverse
//! patch `staged → baseline` in the log and swaps the two. Popping hands out
//! the baseline first (O(1)); every further pop applies the newest reverse
//! patch onto the baseline in place and drops it from the log.
//!
//! A baseline handed out by [`pop()`](RewindSession::pop) is *consumed*: it
//! is no longer part of the history. The next
//! [`push_where()`](RewindSession::push_where) first restores the state
//! before it, so that the next patch is computed against a state the
//! history still contains.

use rewind_arena::RingLog;
use rewind_codec::{alloc_tagged_buffer, compress_with, decompress, ScanBackend, TaggedBuffer};
use tracing::{debug, info, trace};

use crate::config::RewindConfig;
use crate::error::RewindError;
use crate::metrics::RewindMetrics;

const BASELINE_TAG: u16 = 0xFFFF;
const STAGED_TAG: u16 = 0x0000;

// Compile-time assertion: RewindSession is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<RewindSession>();
    }
};

// ── SessionPhase ────────────────────────────────────────────────

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Nothing has been pushed yet (or the history was cleared).
    Empty,
    /// A baseline exists but no patch has been stored since it was seeded.
    Seeded,
    /// At least one patch has been stored.
    Streaming,
}

// ── RewindStats ─────────────────────────────────────────────────

/// Point-in-time occupancy of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewindStats {
    /// States that can still be popped.
    pub entries: usize,
    /// Bytes of the history region in use.
    pub bytes_used: usize,
    /// Whether the next pushes are likely to evict history.
    pub near_full: bool,
}

// ── RewindSession ───────────────────────────────────────────────

/// Bounded step history for one serialized simulation state.
///
/// # Example
///
/// ```
/// use rewind_engine::{RewindConfig, RewindSession};
///
/// let mut session = RewindSession::new(RewindConfig::new(4).with_capacity(4096))?;
/// session.push_where().copy_from_slice(&[0, 0, 0, 0]);
/// session.push_do()?;
/// session.push_where().copy_from_slice(&[1, 0, 0, 0]);
/// session.push_do()?;
///
/// assert_eq!(session.pop()?, &[1, 0, 0, 0]);
/// assert_eq!(session.pop()?, &[0, 0, 0, 0]);
/// assert!(session.pop().is_err());
/// # Ok::<(), rewind_engine::RewindError>(())
/// ```
pub struct RewindSession {
    config: RewindConfig,
    log: RingLog,
    baseline: TaggedBuffer,
    staged: TaggedBuffer,
    /// The baseline is part of the history (not yet handed out by `pop`).
    baseline_valid: bool,
    phase: SessionPhase,
    backend: ScanBackend,
    metrics: RewindMetrics,
}

impl RewindSession {
    /// Allocate a session for states of `config.state_size` bytes.
    ///
    /// # Errors
    ///
    /// [`RewindError::Config`] if the config is invalid and
    /// [`RewindError::AllocationFailed`] if memory is unavailable, in which
    /// case the host should carry on without rewind.
    pub fn new(config: RewindConfig) -> Result<Self, RewindError> {
        Self::with_backend(config, ScanBackend::detect())
    }

    /// Like [`new()`](Self::new) with an explicit scan backend.
    pub fn with_backend(config: RewindConfig, backend: ScanBackend) -> Result<Self, RewindError> {
        config.validate()?;
        let baseline = alloc_tagged_buffer(config.state_size, BASELINE_TAG)?;
        let staged = alloc_tagged_buffer(config.state_size, STAGED_TAG)?;
        let log = RingLog::new(config.capacity, config.max_patch_size())?;
        info!(
            state_size = config.state_size,
            capacity = config.capacity,
            backend = backend.name(),
            "rewind session created"
        );
        Ok(Self {
            config,
            log,
            baseline,
            staged,
            baseline_valid: false,
            phase: SessionPhase::Empty,
            backend,
            metrics: RewindMetrics::default(),
        })
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The configuration this session was built from.
    pub fn config(&self) -> &RewindConfig {
        &self.config
    }

    /// Size of one state in bytes.
    pub fn state_size(&self) -> usize {
        self.config.state_size
    }

    /// Capacity of the history region in bytes.
    pub fn capacity(&self) -> usize {
        self.log.capacity()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Scan backend used for diffing.
    pub fn backend(&self) -> ScanBackend {
        self.backend
    }

    /// Number of states that can still be popped.
    pub fn entries(&self) -> usize {
        self.log.len() + usize::from(self.baseline_valid)
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> RewindStats {
        RewindStats {
            entries: self.entries(),
            bytes_used: self.log.bytes_used(),
            near_full: self.log.is_near_full(),
        }
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &RewindMetrics {
        &self.metrics
    }

    /// The newest materialized state, even if `pop` already handed it out.
    ///
    /// When the history runs out this is the oldest state that was
    /// reachable, which is what a host should hold the simulation at.
    /// `None` until the first push.
    pub fn current(&self) -> Option<&[u8]> {
        (self.phase != SessionPhase::Empty).then(|| self.baseline.as_slice())
    }

    // ── Recording ───────────────────────────────────────────────

    /// Buffer to serialize the next state into.
    ///
    /// Exactly [`state_size()`](Self::state_size) bytes. Its prior contents
    /// are stale; the caller must overwrite every byte before
    /// [`push_do()`](Self::push_do).
    pub fn push_where(&mut self) -> &mut [u8] {
        self.ensure_baseline();
        self.staged.as_mut_slice()
    }

    /// Commit the staged buffer as the newest state.
    ///
    /// The first state (or the first after the history was fully consumed)
    /// becomes the baseline directly. Every later state stores one reverse
    /// patch, evicting the oldest history if the region is full.
    ///
    /// # Errors
    ///
    /// Only on internal contract violations between codec and log; the
    /// session is unchanged in that case.
    pub fn push_do(&mut self) -> Result<(), RewindError> {
        self.ensure_baseline();
        debug_assert_ne!(self.baseline.tag(), self.staged.tag());

        if !self.baseline_valid {
            self.swap_buffers();
            self.baseline_valid = true;
            self.phase = SessionPhase::Seeded;
            self.metrics.pushes += 1;
            trace!("rewind baseline seeded");
            return Ok(());
        }

        let backend = self.backend;
        let newer = self.staged.as_slice();
        let older = self.baseline.as_slice();
        let appended = self
            .log
            .append_with::<RewindError, _>(|slot| Ok(compress_with(backend, newer, older, slot)?))?;

        self.swap_buffers();
        self.phase = SessionPhase::Streaming;
        self.metrics.pushes += 1;
        self.metrics.patch_bytes += appended.len as u64;
        self.metrics.last_patch_len = appended.len;
        if appended.evicted > 0 {
            self.metrics.evictions += appended.evicted as u64;
            debug!(
                evicted = appended.evicted,
                entries = self.entries(),
                "evicted oldest rewind entries"
            );
        }
        trace!(patch_len = appended.len, offset = appended.offset, "rewind state pushed");
        Ok(())
    }

    // ── Rewinding ───────────────────────────────────────────────

    /// Step one state back in history.
    ///
    /// Returns the restored state; it stays readable through
    /// [`current()`](Self::current) after the borrow ends.
    ///
    /// # Errors
    ///
    /// [`RewindError::Empty`] when no history remains. The session is not
    /// changed by a failed pop.
    pub fn pop(&mut self) -> Result<&[u8], RewindError> {
        if self.baseline_valid {
            self.baseline_valid = false;
        } else if !self.restore_latest() {
            self.metrics.empty_pops += 1;
            debug!("rewind history exhausted");
            return Err(RewindError::Empty);
        }
        self.metrics.pops += 1;
        Ok(self.baseline.as_slice())
    }

    /// Drop all history. Buffers and the region stay allocated.
    pub fn clear(&mut self) {
        self.log.clear();
        self.baseline.zero();
        self.staged.zero();
        self.baseline_valid = false;
        self.phase = SessionPhase::Empty;
        debug!("rewind history cleared");
    }

    // ── Internals ───────────────────────────────────────────────

    /// Hand the state returned by the last successful `pop` back to the
    /// history, so the next `pop` returns it again.
    pub(crate) fn unpop(&mut self) {
        debug_assert!(!self.baseline_valid && self.phase != SessionPhase::Empty);
        self.baseline_valid = true;
        self.metrics.pops = self.metrics.pops.saturating_sub(1);
    }

    /// Re-materialize a consumed baseline from the log, if it has history.
    fn ensure_baseline(&mut self) {
        if !self.baseline_valid && self.restore_latest() {
            self.baseline_valid = true;
        }
    }

    /// Apply the newest patch onto the baseline and drop it from the log.
    fn restore_latest(&mut self) -> bool {
        let Some((patch, _)) = self.log.read_latest() else {
            return false;
        };
        decompress(patch, self.baseline.as_mut_slice());
        self.log.pop_latest();
        true
    }

    fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.baseline, &mut self.staged);
    }
}

impl std::fmt::Debug for RewindSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewindSession")
            .field("state_size", &self.config.state_size)
            .field("phase", &self.phase)
            .field("entries", &self.entries())
            .field("log", &self.log)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(state_size: usize, capacity: usize) -> RewindSession {
        RewindSession::new(RewindConfig::new(state_size).with_capacity(capacity)).unwrap()
    }

    fn push(session: &mut RewindSession, state: &[u8]) {
        session.push_where().copy_from_slice(state);
        session.push_do().unwrap();
    }

    #[test]
    fn new_session_is_empty() {
        let mut s = session(64, 4096);
        assert_eq!(s.phase(), SessionPhase::Empty);
        assert_eq!(s.entries(), 0);
        assert!(s.current().is_none());
        assert_eq!(s.pop(), Err(RewindError::Empty));
        assert_eq!(s.metrics().empty_pops, 1);
    }

    #[test]
    fn invalid_config_is_reported() {
        let err = RewindSession::new(RewindConfig::new(0)).unwrap_err();
        assert!(matches!(err, RewindError::Config(_)));
    }

    #[test]
    fn phases_advance_with_pushes() {
        let mut s = session(8, 4096);
        push(&mut s, &[0; 8]);
        assert_eq!(s.phase(), SessionPhase::Seeded);
        assert_eq!(s.entries(), 1);
        push(&mut s, &[1; 8]);
        assert_eq!(s.phase(), SessionPhase::Streaming);
        assert_eq!(s.entries(), 2);
    }

    #[test]
    fn pop_returns_newest_first() {
        let mut s = session(4, 4096);
        for v in 0..5u8 {
            push(&mut s, &[v, v, 0, 1]);
        }
        for v in (0..5u8).rev() {
            assert_eq!(s.pop().unwrap(), &[v, v, 0, 1]);
        }
        assert_eq!(s.pop(), Err(RewindError::Empty));
        assert_eq!(s.entries(), 0);
    }

    #[test]
    fn failed_pop_changes_nothing() {
        let mut s = session(4, 4096);
        push(&mut s, &[7; 4]);
        s.pop().unwrap();
        let before = s.stats();
        assert_eq!(s.pop(), Err(RewindError::Empty));
        assert_eq!(s.stats(), before);
        assert_eq!(s.current(), Some(&[7u8; 4][..]));
    }

    #[test]
    fn push_after_pop_continues_from_restored_history() {
        let mut s = session(4, 4096);
        push(&mut s, &[1; 4]);
        push(&mut s, &[2; 4]);
        push(&mut s, &[3; 4]);
        assert_eq!(s.pop().unwrap(), &[3; 4]);
        assert_eq!(s.pop().unwrap(), &[2; 4]);
        // The host resumes from state 2; states 2 and 3 were consumed.
        push(&mut s, &[9; 4]);
        assert_eq!(s.entries(), 2);
        assert_eq!(s.pop().unwrap(), &[9; 4]);
        assert_eq!(s.pop().unwrap(), &[1; 4]);
        assert_eq!(s.pop(), Err(RewindError::Empty));
    }

    #[test]
    fn unpop_returns_state_to_history() {
        let mut s = session(4, 4096);
        push(&mut s, &[1; 4]);
        push(&mut s, &[2; 4]);
        push(&mut s, &[3; 4]);

        assert_eq!(s.pop().unwrap(), &[3; 4]);
        s.unpop();
        assert_eq!(s.entries(), 3);
        assert_eq!(s.pop().unwrap(), &[3; 4]);

        // Same after a pop that had to apply a patch.
        assert_eq!(s.pop().unwrap(), &[2; 4]);
        s.unpop();
        assert_eq!(s.entries(), 2);
        assert_eq!(s.metrics().pops, 1);
        assert_eq!(s.pop().unwrap(), &[2; 4]);
        assert_eq!(s.pop().unwrap(), &[1; 4]);
        assert_eq!(s.pop(), Err(RewindError::Empty));
    }

    #[test]
    fn push_after_exhaustion_reseeds() {
        let mut s = session(4, 4096);
        push(&mut s, &[1; 4]);
        push(&mut s, &[2; 4]);
        s.pop().unwrap();
        s.pop().unwrap();
        assert!(s.pop().is_err());
        push(&mut s, &[5; 4]);
        assert_eq!(s.phase(), SessionPhase::Seeded);
        assert_eq!(s.entries(), 1);
        assert_eq!(s.pop().unwrap(), &[5; 4]);
    }

    #[test]
    fn identical_pushes_store_terminator_only() {
        let mut s = session(256, 8192);
        push(&mut s, &[3; 256]);
        push(&mut s, &[3; 256]);
        assert_eq!(s.metrics().last_patch_len, rewind_codec::TERMINATOR_LEN);
    }

    #[test]
    fn buffer_tags_alternate() {
        let mut s = session(4, 4096);
        assert!(s.baseline.has_tag(BASELINE_TAG));
        push(&mut s, &[1; 4]);
        assert!(s.baseline.has_tag(STAGED_TAG));
        push(&mut s, &[2; 4]);
        assert!(s.baseline.has_tag(BASELINE_TAG));
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut s = session(4, 4096);
        push(&mut s, &[1; 4]);
        push(&mut s, &[2; 4]);
        s.clear();
        assert_eq!(s.phase(), SessionPhase::Empty);
        assert_eq!(s.stats(), RewindStats::default());
        assert!(s.pop().is_err());
        push(&mut s, &[4; 4]);
        assert_eq!(s.pop().unwrap(), &[4; 4]);
    }

    #[test]
    fn metrics_count_pushes_and_pops() {
        let mut s = session(4, 4096);
        push(&mut s, &[1; 4]);
        push(&mut s, &[2; 4]);
        s.pop().unwrap();
        let m = s.metrics();
        assert_eq!(m.pushes, 2);
        assert_eq!(m.pops, 1);
        assert!(m.patch_bytes > 0);
    }
}
