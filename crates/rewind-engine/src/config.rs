//! Session configuration and validation.
//!
//! [`RewindConfig`] is the input for constructing a
//! [`RewindSession`](crate::RewindSession). [`validate()`](RewindConfig::validate)
//! checks the structural invariants before anything is allocated.

use std::error::Error;
use std::fmt;

use rewind_arena::RECORD_HEADER_LEN;
use rewind_codec::max_patch_size;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`RewindConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The serialized state is zero bytes long.
    ZeroStateSize,
    /// The history capacity cannot hold one worst-case patch.
    CapacityTooSmall {
        /// The configured capacity in bytes.
        configured: usize,
        /// Capacity must exceed this many bytes.
        minimum: usize,
    },
    /// The recording granularity is zero.
    ZeroGranularity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStateSize => write!(f, "state_size must be at least 1 byte"),
            Self::CapacityTooSmall {
                configured,
                minimum,
            } => {
                write!(
                    f,
                    "capacity {configured} bytes must exceed {minimum} bytes for this state size"
                )
            }
            Self::ZeroGranularity => write!(f, "granularity must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── RewindConfig ───────────────────────────────────────────────────

/// Configuration for a rewind session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewindConfig {
    /// Size of one serialized simulation state in bytes.
    pub state_size: usize,
    /// Bytes of history to keep. Default: 16 MiB.
    pub capacity: usize,
    /// Record one state every `granularity` steps. Default: 1.
    ///
    /// Only consulted by [`Rewinder`](crate::Rewinder); a bare session
    /// records whatever it is given.
    pub granularity: u32,
}

impl RewindConfig {
    /// Default history capacity: 16 MiB.
    pub const DEFAULT_CAPACITY: usize = 16 * 1024 * 1024;

    /// Default recording granularity.
    pub const DEFAULT_GRANULARITY: u32 = 1;

    /// Config for states of `state_size` bytes with default capacity and
    /// granularity.
    pub fn new(state_size: usize) -> Self {
        Self {
            state_size,
            capacity: Self::DEFAULT_CAPACITY,
            granularity: Self::DEFAULT_GRANULARITY,
        }
    }

    /// Set the history capacity in bytes.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the recording granularity in steps.
    pub fn with_granularity(mut self, granularity: u32) -> Self {
        self.granularity = granularity;
        self
    }

    /// Worst-case patch length for this state size.
    pub fn max_patch_size(&self) -> usize {
        max_patch_size(self.state_size)
    }

    /// Capacity must strictly exceed this many bytes.
    pub fn min_capacity(&self) -> usize {
        RECORD_HEADER_LEN.saturating_add(self.max_patch_size())
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_size == 0 {
            return Err(ConfigError::ZeroStateSize);
        }
        if self.granularity == 0 {
            return Err(ConfigError::ZeroGranularity);
        }
        let minimum = self.min_capacity();
        if self.capacity <= minimum {
            return Err(ConfigError::CapacityTooSmall {
                configured: self.capacity,
                minimum,
            });
        }
        Ok(())
    }
}

impl Default for RewindConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
