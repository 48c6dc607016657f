//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The region cannot hold even one maximal record.
    CapacityTooSmall {
        /// Requested capacity in bytes.
        capacity: usize,
        /// Smallest capacity that would be accepted.
        minimum: usize,
    },
    /// The backing region could not be allocated.
    AllocationFailed {
        /// Number of bytes requested.
        bytes: usize,
    },
    /// A patch longer than the configured maximum was offered.
    PatchTooLarge {
        /// Length of the offered patch.
        len: usize,
        /// Configured maximum patch length.
        max: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityTooSmall { capacity, minimum } => {
                write!(
                    f,
                    "arena capacity too small: {capacity} bytes, need more than {minimum} bytes"
                )
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} byte arena")
            }
            Self::PatchTooLarge { len, max } => {
                write!(f, "patch of {len} bytes exceeds maximum of {max} bytes")
            }
        }
    }
}

impl Error for ArenaError {}
