//! Session lifecycle FFI: create, push, pop, stats, destroy.
//!
//! Each session sits behind its own `Arc<Mutex<_>>`, so the global table
//! lock is held only for handle lookup. The C contract is still one thread
//! per session; the per-session mutex turns a violation into serialized
//! calls rather than a data race.
//!
//! Pointers handed out by [`rewind_push_where`] and [`rewind_pop`] point into
//! session-owned buffers. They stay valid until the next call on the same
//! handle.

use std::sync::{Arc, Mutex};

use rewind_engine::{RewindConfig, RewindSession};

use crate::handle::HandleTable;
use crate::stats::{RewindMetricsC, RewindStatsC};
use crate::status::RewindStatus;

type SessionArc = Arc<Mutex<RewindSession>>;

static SESSIONS: Mutex<HandleTable<SessionArc>> = Mutex::new(HandleTable::new());

/// Clone the Arc for a session handle, briefly locking the global table.
fn get_session(handle: u64) -> Option<SessionArc> {
    SESSIONS.lock().ok()?.get(handle).cloned()
}

/// Create a session for states of `state_size` bytes keeping up to
/// `capacity` bytes of history.
///
/// On success writes the handle to `handle_out`. Returns
/// `REWIND_STATUS_CONFIG_ERROR` if `capacity` cannot hold one worst-case
/// patch and `REWIND_STATUS_ALLOCATION_FAILED` if memory is short; the host
/// should then run without rewind.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_create(state_size: usize, capacity: usize, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return RewindStatus::InvalidArgument as i32;
        }
        let config = RewindConfig::new(state_size).with_capacity(capacity);
        let session = match RewindSession::new(config) {
            Ok(s) => s,
            Err(e) => return RewindStatus::from(&e) as i32,
        };
        let handle = ffi_lock!(SESSIONS).insert(Arc::new(Mutex::new(session)));
        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = handle };
        RewindStatus::Ok as i32
    })
}

/// Destroy a session, releasing all of its memory.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(SESSIONS).remove(handle) {
            Some(_) => RewindStatus::Ok as i32,
            None => RewindStatus::InvalidHandle as i32,
        }
    })
}

/// Get the buffer to serialize the next state into.
///
/// Writes a pointer to exactly `state_size` writable bytes to `data_out`.
/// The caller must overwrite all of them before [`rewind_push_do`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_push_where(handle: u64, data_out: *mut *mut u8) -> i32 {
    ffi_guard!({
        if data_out.is_null() {
            return RewindStatus::InvalidArgument as i32;
        }
        let session = match get_session(handle) {
            Some(arc) => arc,
            None => return RewindStatus::InvalidHandle as i32,
        };
        let mut session = ffi_lock!(session);
        let ptr = session.push_where().as_mut_ptr();
        // SAFETY: data_out is non-null and valid per caller contract.
        unsafe { *data_out = ptr };
        RewindStatus::Ok as i32
    })
}

/// Commit the buffer returned by [`rewind_push_where`] as the newest state.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_push_do(handle: u64) -> i32 {
    ffi_guard!({
        let session = match get_session(handle) {
            Some(arc) => arc,
            None => return RewindStatus::InvalidHandle as i32,
        };
        let mut session = ffi_lock!(session);
        match session.push_do() {
            Ok(()) => RewindStatus::Ok as i32,
            Err(e) => RewindStatus::from(&e) as i32,
        }
    })
}

/// Step one state back.
///
/// On success writes a pointer to `state_size` readable bytes to
/// `data_out`. Returns `REWIND_STATUS_EMPTY` and writes null when no
/// history remains; the session is unchanged in that case.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_pop(handle: u64, data_out: *mut *const u8) -> i32 {
    ffi_guard!({
        if data_out.is_null() {
            return RewindStatus::InvalidArgument as i32;
        }
        let session = match get_session(handle) {
            Some(arc) => arc,
            None => return RewindStatus::InvalidHandle as i32,
        };
        let mut session = ffi_lock!(session);
        let (status, ptr) = match session.pop() {
            Ok(state) => (RewindStatus::Ok, state.as_ptr()),
            Err(e) => (RewindStatus::from(&e), std::ptr::null()),
        };
        // SAFETY: data_out is non-null and valid per caller contract.
        unsafe { *data_out = ptr };
        status as i32
    })
}

/// Fill `stats_out` with the session's occupancy.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_stats(handle: u64, stats_out: *mut RewindStatsC) -> i32 {
    ffi_guard!({
        if stats_out.is_null() {
            return RewindStatus::InvalidArgument as i32;
        }
        let session = match get_session(handle) {
            Some(arc) => arc,
            None => return RewindStatus::InvalidHandle as i32,
        };
        let session = ffi_lock!(session);
        let stats =
            RewindStatsC::from_rust(&session.stats(), session.capacity(), session.state_size());
        // SAFETY: stats_out is non-null and valid per caller contract.
        unsafe { *stats_out = stats };
        RewindStatus::Ok as i32
    })
}

/// Fill `metrics_out` with the session's cumulative counters.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_metrics(handle: u64, metrics_out: *mut RewindMetricsC) -> i32 {
    ffi_guard!({
        if metrics_out.is_null() {
            return RewindStatus::InvalidArgument as i32;
        }
        let session = match get_session(handle) {
            Some(arc) => arc,
            None => return RewindStatus::InvalidHandle as i32,
        };
        let session = ffi_lock!(session);
        let metrics = RewindMetricsC::from_rust(session.metrics());
        // SAFETY: metrics_out is non-null and valid per caller contract.
        unsafe { *metrics_out = metrics };
        RewindStatus::Ok as i32
    })
}

/// Drop all history, keeping the session's memory allocated.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rewind_clear(handle: u64) -> i32 {
    ffi_guard!({
        let session = match get_session(handle) {
            Some(arc) => arc,
            None => return RewindStatus::InvalidHandle as i32,
        };
        ffi_lock!(session).clear();
        RewindStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(state_size: usize, capacity: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(
            rewind_create(state_size, capacity, &mut h),
            RewindStatus::Ok as i32
        );
        h
    }

    #[allow(unsafe_code)]
    fn push(h: u64, state: &[u8]) {
        let mut ptr: *mut u8 = std::ptr::null_mut();
        assert_eq!(rewind_push_where(h, &mut ptr), RewindStatus::Ok as i32);
        assert!(!ptr.is_null());
        // SAFETY: push_where hands out state_size writable bytes.
        let buf = unsafe { std::slice::from_raw_parts_mut(ptr, state.len()) };
        buf.copy_from_slice(state);
        assert_eq!(rewind_push_do(h), RewindStatus::Ok as i32);
    }

    #[allow(unsafe_code)]
    fn pop(h: u64, len: usize) -> Result<Vec<u8>, i32> {
        let mut ptr: *const u8 = std::ptr::null();
        let rc = rewind_pop(h, &mut ptr);
        if rc != RewindStatus::Ok as i32 {
            assert!(ptr.is_null());
            return Err(rc);
        }
        // SAFETY: pop hands out state_size readable bytes.
        Ok(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec())
    }

    #[test]
    fn single_byte_change_scenario() {
        let h = create(1024, 8192);
        let zeros = vec![0u8; 1024];
        let mut modified = zeros.clone();
        modified[500] = 0xFF;
        push(h, &zeros);
        push(h, &modified);

        let mut stats = RewindStatsC::default();
        assert_eq!(rewind_stats(h, &mut stats), RewindStatus::Ok as i32);
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.capacity, 8192);
        assert_eq!(stats.state_size, 1024);

        assert_eq!(pop(h, 1024), Ok(modified));
        assert_eq!(pop(h, 1024), Ok(zeros));
        assert_eq!(pop(h, 1024), Err(RewindStatus::Empty as i32));
        assert_eq!(rewind_destroy(h), RewindStatus::Ok as i32);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut h = 0u64;
        assert_eq!(rewind_create(0, 8192, &mut h), RewindStatus::ConfigError as i32);
        assert_eq!(rewind_create(1024, 64, &mut h), RewindStatus::ConfigError as i32);
    }

    #[test]
    fn null_out_pointers_are_rejected() {
        assert_eq!(
            rewind_create(16, 4096, std::ptr::null_mut()),
            RewindStatus::InvalidArgument as i32
        );
        let h = create(16, 4096);
        assert_eq!(
            rewind_push_where(h, std::ptr::null_mut()),
            RewindStatus::InvalidArgument as i32
        );
        assert_eq!(
            rewind_pop(h, std::ptr::null_mut()),
            RewindStatus::InvalidArgument as i32
        );
        assert_eq!(
            rewind_stats(h, std::ptr::null_mut()),
            RewindStatus::InvalidArgument as i32
        );
        assert_eq!(
            rewind_metrics(h, std::ptr::null_mut()),
            RewindStatus::InvalidArgument as i32
        );
        rewind_destroy(h);
    }

    #[test]
    fn destroyed_handle_is_invalid() {
        let h = create(16, 4096);
        assert_eq!(rewind_destroy(h), RewindStatus::Ok as i32);
        assert_eq!(rewind_destroy(h), RewindStatus::InvalidHandle as i32);
        assert_eq!(rewind_push_do(h), RewindStatus::InvalidHandle as i32);
        assert_eq!(rewind_clear(h), RewindStatus::InvalidHandle as i32);
        let mut ptr: *const u8 = std::ptr::null();
        assert_eq!(rewind_pop(h, &mut ptr), RewindStatus::InvalidHandle as i32);
    }

    #[test]
    fn metrics_and_clear() {
        let h = create(8, 4096);
        push(h, &[1; 8]);
        push(h, &[2; 8]);
        assert!(pop(h, 8).is_ok());

        let mut m = RewindMetricsC::default();
        assert_eq!(rewind_metrics(h, &mut m), RewindStatus::Ok as i32);
        assert_eq!(m.pushes, 2);
        assert_eq!(m.pops, 1);

        assert_eq!(rewind_clear(h), RewindStatus::Ok as i32);
        let mut stats = RewindStatsC::default();
        rewind_stats(h, &mut stats);
        assert_eq!(stats.entries, 0);
        assert_eq!(pop(h, 8), Err(RewindStatus::Empty as i32));
        rewind_destroy(h);
    }

    #[test]
    fn sessions_are_independent() {
        let a = create(4, 4096);
        let b = create(4, 4096);
        push(a, &[1; 4]);
        push(b, &[2; 4]);
        assert_eq!(pop(a, 4), Ok(vec![1; 4]));
        assert_eq!(pop(b, 4), Ok(vec![2; 4]));
        rewind_destroy(a);
        rewind_destroy(b);
    }
}
