//! Rewind sessions: delta-compressed step history for simulations.
//!
//! A [`RewindSession`] records the serialized state of a simulation once
//! per step and can walk that history backwards on demand. Only the most
//! recent state is kept whole; every older state is a reverse patch in a
//! fixed-size circular log, so memory stays bounded and the oldest history
//! is silently dropped first.
//!
//! # Architecture
//!
//! ```text
//! Rewinder (per-step driver over a StateCore)
//! └── RewindSession
//!     ├── baseline: TaggedBuffer   (newest materialized state)
//!     ├── staged:   TaggedBuffer   (filled by the caller before push_do)
//!     └── RingLog                  (reverse patches, newest last)
//! ```
//!
//! # Ownership model
//!
//! `RewindSession` is [`Send`] but every mutating method takes `&mut self`.
//! [`pop()`](RewindSession::pop) returns a slice borrowing the session, so
//! the caller must finish reading a restored state before the next push.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod session;

pub use config::{ConfigError, RewindConfig};
pub use driver::{CoreError, Rewinder, StateCore, StepOutcome};
pub use error::RewindError;
pub use metrics::RewindMetrics;
pub use session::{RewindSession, RewindStats, SessionPhase};
