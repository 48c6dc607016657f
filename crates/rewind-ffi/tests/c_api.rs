//! Drive the C API the way a host loop would: record a mock core every
//! step, then rewind through it.

#![allow(unsafe_code)]

use rewind_ffi::{
    rewind_create, rewind_destroy, rewind_pop, rewind_push_do, rewind_push_where, rewind_stats,
    RewindStatsC, RewindStatus,
};
use rewind_test_utils::MockCore;

const OK: i32 = RewindStatus::Ok as i32;

fn record(handle: u64, state: &[u8]) {
    let mut ptr: *mut u8 = std::ptr::null_mut();
    assert_eq!(rewind_push_where(handle, &mut ptr), OK);
    // SAFETY: push_where hands out state_size writable bytes.
    unsafe { std::slice::from_raw_parts_mut(ptr, state.len()) }.copy_from_slice(state);
    assert_eq!(rewind_push_do(handle), OK);
}

fn restore(handle: u64, len: usize) -> Option<Vec<u8>> {
    let mut ptr: *const u8 = std::ptr::null();
    match rewind_pop(handle, &mut ptr) {
        // SAFETY: pop hands out state_size readable bytes.
        OK => Some(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()),
        rc => {
            assert_eq!(rc, RewindStatus::Empty as i32);
            None
        }
    }
}

#[test]
fn host_loop_round_trip() {
    let state_size = 4096;
    let mut core = MockCore::new(state_size, 1234);
    let mut handle = 0u64;
    assert_eq!(rewind_create(state_size, 1 << 20, &mut handle), OK);

    let mut history = Vec::new();
    for _ in 0..200 {
        record(handle, core.state());
        history.push(core.state().to_vec());
        core.advance();
    }

    let mut stats = RewindStatsC::default();
    assert_eq!(rewind_stats(handle, &mut stats), OK);
    assert_eq!(stats.entries, 200);
    assert!(stats.bytes_used <= stats.capacity);

    for expected in history.iter().rev() {
        assert_eq!(restore(handle, state_size).as_ref(), Some(expected));
    }
    assert_eq!(restore(handle, state_size), None);
    assert_eq!(rewind_destroy(handle), OK);
}

#[cfg(not(miri))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn small_region_keeps_newest_states(seed in any::<u64>(), steps in 1usize..150) {
            let state_size = 128;
            let mut core = MockCore::new(state_size, seed);
            let mut handle = 0u64;
            prop_assert_eq!(rewind_create(state_size, 1024, &mut handle), OK);

            let mut history = Vec::new();
            for _ in 0..steps {
                core.advance();
                record(handle, core.state());
                history.push(core.state().to_vec());
            }

            let mut stats = RewindStatsC::default();
            prop_assert_eq!(rewind_stats(handle, &mut stats), OK);
            prop_assert!(stats.bytes_used <= 1024);
            let kept = stats.entries as usize;
            prop_assert!(kept >= 1 && kept <= steps);

            for expected in history.iter().rev().take(kept) {
                let restored = restore(handle, state_size);
                prop_assert_eq!(restored.as_ref(), Some(expected));
            }
            prop_assert_eq!(restore(handle, state_size), None);
            rewind_destroy(handle);
        }
    }
}
