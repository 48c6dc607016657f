//! C-compatible occupancy and counter structs.

use rewind_engine::{RewindMetrics, RewindStats};

/// Session occupancy, filled by `rewind_stats`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewindStatsC {
    /// States that can still be popped.
    pub entries: u64,
    /// Bytes of the history region in use.
    pub bytes_used: u64,
    /// Size of the history region in bytes.
    pub capacity: u64,
    /// Size of one state in bytes.
    pub state_size: u64,
    /// Non-zero when the next pushes are likely to evict history.
    pub near_full: u8,
}

// 4×u64 + u8 + 7 bytes padding = 40 bytes, align 8.
const _: () = assert!(std::mem::size_of::<RewindStatsC>() == 40);
const _: () = assert!(std::mem::align_of::<RewindStatsC>() == 8);

impl RewindStatsC {
    pub(crate) fn from_rust(stats: &RewindStats, capacity: usize, state_size: usize) -> Self {
        Self {
            entries: stats.entries as u64,
            bytes_used: stats.bytes_used as u64,
            capacity: capacity as u64,
            state_size: state_size as u64,
            near_full: u8::from(stats.near_full),
        }
    }
}

/// Cumulative session counters, filled by `rewind_metrics`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewindMetricsC {
    /// States committed with `rewind_push_do`.
    pub pushes: u64,
    /// Successful pops.
    pub pops: u64,
    /// Pops that found no history.
    pub empty_pops: u64,
    /// Oldest entries dropped to make room.
    pub evictions: u64,
    /// Total encoded patch bytes written.
    pub patch_bytes: u64,
    /// Encoded length of the most recent patch.
    pub last_patch_len: u64,
}

const _: () = assert!(std::mem::size_of::<RewindMetricsC>() == 48);
const _: () = assert!(std::mem::align_of::<RewindMetricsC>() == 8);

impl RewindMetricsC {
    pub(crate) fn from_rust(m: &RewindMetrics) -> Self {
        Self {
            pushes: m.pushes,
            pops: m.pops,
            empty_pops: m.empty_pops,
            evictions: m.evictions,
            patch_bytes: m.patch_bytes,
            last_patch_len: m.last_patch_len as u64,
        }
    }
}
