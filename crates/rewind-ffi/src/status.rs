//! C-compatible status codes.

use rewind_engine::RewindError;

/// Status returned by every FFI function.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewindStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// A pointer argument is null.
    InvalidArgument = -2,
    /// `state_size` or `capacity` failed validation.
    ConfigError = -3,
    /// Memory for the session could not be allocated; rewind is unavailable.
    AllocationFailed = -4,
    /// No history left to pop.
    Empty = -5,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -6,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&RewindError> for RewindStatus {
    fn from(e: &RewindError) -> Self {
        match e {
            RewindError::Empty => Self::Empty,
            RewindError::AllocationFailed { .. } => Self::AllocationFailed,
            RewindError::Config(_) => Self::ConfigError,
            RewindError::Arena(_) | RewindError::Codec(_) | RewindError::Core(_) => {
                Self::InternalError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_engine::ConfigError;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(RewindStatus::Ok as i32, 0);
        assert_eq!(RewindStatus::InvalidHandle as i32, -1);
        assert_eq!(RewindStatus::InvalidArgument as i32, -2);
        assert_eq!(RewindStatus::ConfigError as i32, -3);
        assert_eq!(RewindStatus::AllocationFailed as i32, -4);
        assert_eq!(RewindStatus::Empty as i32, -5);
        assert_eq!(RewindStatus::InternalError as i32, -6);
        assert_eq!(RewindStatus::Panicked as i32, -128);
    }

    #[test]
    fn rewind_error_to_status() {
        assert_eq!(RewindStatus::from(&RewindError::Empty), RewindStatus::Empty);
        assert_eq!(
            RewindStatus::from(&RewindError::AllocationFailed { bytes: 1 }),
            RewindStatus::AllocationFailed
        );
        assert_eq!(
            RewindStatus::from(&RewindError::Config(ConfigError::ZeroStateSize)),
            RewindStatus::ConfigError
        );
    }
}
