//! C FFI bindings for rewind sessions.
//!
//! Exposes a C-compatible API over [`rewind_engine::RewindSession`]. Sessions
//! are addressed by `u64` handles; a destroyed or never-issued handle yields
//! [`RewindStatus::InvalidHandle`] instead of undefined behaviour. Every entry
//! point catches panics and reports [`RewindStatus::Panicked`].
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `rewind-codec`); here it is limited to writing through caller pointers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run `$body` (which evaluates to an `i32` status), converting a panic
/// into [`RewindStatus::Panicked`](crate::status::RewindStatus::Panicked).
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(status) => status,
            Err(_) => $crate::status::RewindStatus::Panicked as i32,
        }
    };
}

/// Lock a mutex, returning `InternalError` from the enclosing closure if it
/// is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RewindStatus::InternalError as i32,
        }
    };
}

mod handle;
pub mod session;
pub mod stats;
pub mod status;

pub use session::{
    rewind_clear, rewind_create, rewind_destroy, rewind_metrics, rewind_pop, rewind_push_do,
    rewind_push_where, rewind_stats,
};
pub use stats::{RewindMetricsC, RewindStatsC};
pub use status::RewindStatus;
