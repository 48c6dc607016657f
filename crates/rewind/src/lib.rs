//! Rewind: delta-compressed state history for emulators and deterministic
//! simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rewind sub-crates. For most users, adding `rewind` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rewind::prelude::*;
//!
//! let config = RewindConfig::new(1024).with_capacity(64 * 1024);
//! let mut session = RewindSession::new(config).unwrap();
//!
//! let mut state = vec![0u8; 1024];
//! for frame in 0..10u8 {
//!     state[usize::from(frame)] = frame + 1;
//!     session.push_where().copy_from_slice(&state);
//!     session.push_do().unwrap();
//! }
//! assert_eq!(session.entries(), 10);
//!
//! // The newest state comes back first.
//! assert_eq!(session.pop().unwrap(), &state[..]);
//! state[9] = 0;
//! assert_eq!(session.pop().unwrap(), &state[..]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`codec`] | `rewind-codec` | Word-granular delta codec, scan backends, tagged buffers |
//! | [`arena`] | `rewind-arena` | Fixed-capacity circular patch log |
//! | [`engine`] | `rewind-engine` | Rewind session, per-step driver, config and metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Delta codec (`rewind-codec`).
///
/// [`codec::compress()`] and [`codec::decompress()`] turn a pair of
/// equal-length states into a compact patch and back.
pub use rewind_codec as codec;

/// Circular patch log (`rewind-arena`).
///
/// [`arena::RingLog`] stores patches newest-last in a fixed byte region,
/// evicting the oldest when space runs out.
pub use rewind_arena as arena;

/// Rewind sessions (`rewind-engine`).
///
/// [`engine::RewindSession`] for explicit push/pop,
/// [`engine::Rewinder`] to drive a [`engine::StateCore`] once per step.
pub use rewind_engine as engine;

/// Common imports for typical rewind usage.
///
/// ```rust
/// use rewind::prelude::*;
/// ```
pub mod prelude {
    // Session
    pub use rewind_engine::{
        RewindConfig, RewindMetrics, RewindSession, RewindStats, SessionPhase,
    };

    // Driver
    pub use rewind_engine::{CoreError, Rewinder, StateCore, StepOutcome};

    // Errors
    pub use rewind_engine::{ConfigError, RewindError};

    // Codec
    pub use rewind_codec::ScanBackend;
}
