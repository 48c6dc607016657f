//! Record a mock simulation, then rewind it.
//!
//! Run with `RUST_LOG=debug cargo run --example rewind_demo` to see
//! eviction and exhaustion events.

use rewind_engine::{RewindConfig, RewindError, Rewinder, StepOutcome};
use rewind_test_utils::MockCore;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RewindError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut core = MockCore::new(64 * 1024, 42);
    let config = RewindConfig::default().with_capacity(1024 * 1024);
    let mut rewinder = Rewinder::new(config, &core)?;

    for _ in 0..600 {
        core.advance();
        rewinder.step(&mut core, false)?;
    }
    let stats = rewinder.session().stats();
    let metrics = rewinder.session().metrics();
    println!(
        "recorded: {} entries, {} bytes used, {} evicted, avg patch {} bytes",
        stats.entries,
        stats.bytes_used,
        metrics.evictions,
        metrics.patch_bytes / metrics.pushes.max(1),
    );

    let mut rewound = 0;
    while rewinder.step(&mut core, true)? == StepOutcome::Rewound {
        rewound += 1;
    }
    println!("rewound {rewound} steps before reaching the oldest state");
    Ok(())
}
