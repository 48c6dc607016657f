//! Session-level error type.

use std::error::Error;
use std::fmt;

use rewind_arena::ArenaError;
use rewind_codec::CodecError;

use crate::config::ConfigError;
use crate::driver::CoreError;

/// Errors surfaced by [`RewindSession`](crate::RewindSession) and
/// [`Rewinder`](crate::Rewinder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewindError {
    /// No history left to pop. Nothing was changed.
    Empty,
    /// Snapshot buffers or the history region could not be allocated.
    ///
    /// Non-fatal: the host keeps running with rewind unavailable.
    AllocationFailed {
        /// Number of bytes requested.
        bytes: usize,
    },
    /// The configuration failed validation.
    Config(ConfigError),
    /// The history log rejected an operation.
    Arena(ArenaError),
    /// The codec rejected its arguments.
    Codec(CodecError),
    /// The simulation core failed to serialize or restore its state.
    Core(CoreError),
}

impl fmt::Display for RewindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "rewind history is empty"),
            Self::AllocationFailed { bytes } => {
                write!(f, "rewind unavailable: failed to allocate {bytes} bytes")
            }
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Core(e) => write!(f, "core: {e}"),
        }
    }
}

impl Error for RewindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Core(e) => Some(e),
            Self::Empty | Self::AllocationFailed { .. } => None,
        }
    }
}

impl From<ConfigError> for RewindError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ArenaError> for RewindError {
    fn from(e: ArenaError) -> Self {
        match e {
            ArenaError::AllocationFailed { bytes } => Self::AllocationFailed { bytes },
            other => Self::Arena(other),
        }
    }
}

impl From<CodecError> for RewindError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::AllocationFailed { bytes } => Self::AllocationFailed { bytes },
            other => Self::Codec(other),
        }
    }
}

impl From<CoreError> for RewindError {
    fn from(e: CoreError) -> Self {
        Self::Core(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_failures_collapse_to_one_variant() {
        let from_arena: RewindError = ArenaError::AllocationFailed { bytes: 64 }.into();
        let from_codec: RewindError = CodecError::AllocationFailed { bytes: 64 }.into();
        assert_eq!(from_arena, RewindError::AllocationFailed { bytes: 64 });
        assert_eq!(from_codec, RewindError::AllocationFailed { bytes: 64 });
    }

    #[test]
    fn source_chains_to_inner_error() {
        let err = RewindError::from(ConfigError::ZeroStateSize);
        assert!(err.source().is_some());
        assert!(RewindError::Empty.source().is_none());
    }

    #[test]
    fn display_prefixes_layer() {
        let err = RewindError::from(ArenaError::PatchTooLarge { len: 9, max: 8 });
        assert!(err.to_string().starts_with("arena: "));
    }
}
