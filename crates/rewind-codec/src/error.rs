//! Error types for the delta codec.

use std::error::Error;
use std::fmt;

/// Errors reported by codec entry points.
///
/// Only argument-shape problems are detected. A patch applied to the wrong
/// base buffer is a caller contract violation and is never reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// The two buffers handed to the differ have different lengths.
    LengthMismatch {
        /// Length of the old buffer in bytes.
        old: usize,
        /// Length of the new buffer in bytes.
        new: usize,
    },
    /// The output slice cannot hold a worst-case patch.
    PatchBufferTooSmall {
        /// Bytes required (see [`max_patch_size`](crate::max_patch_size)).
        needed: usize,
        /// Bytes available in the output slice.
        available: usize,
    },
    /// A snapshot buffer could not be allocated.
    AllocationFailed {
        /// Number of bytes requested.
        bytes: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { old, new } => {
                write!(f, "buffer length mismatch: old {old} bytes, new {new} bytes")
            }
            Self::PatchBufferTooSmall { needed, available } => {
                write!(
                    f,
                    "patch buffer too small: need {needed} bytes, have {available} bytes"
                )
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} byte snapshot buffer")
            }
        }
    }
}

impl Error for CodecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_both_lengths() {
        let msg = CodecError::LengthMismatch { old: 10, new: 12 }.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn display_allocation_failure() {
        let msg = CodecError::AllocationFailed { bytes: 4096 }.to_string();
        assert_eq!(msg, "failed to allocate 4096 byte snapshot buffer");
    }
}
