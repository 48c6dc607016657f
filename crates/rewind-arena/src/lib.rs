//! Fixed-capacity circular log of variable-length patch records.
//!
//! One contiguous byte region holds a FIFO of records. New records are
//! appended at the head; when space runs out the oldest records are evicted
//! from the tail. The newest record can be popped, which walks the log
//! backwards through per-record back-links.
//!
//! # Architecture
//!
//! ```text
//! RingLog
//! ├── data: Vec<u8>          (capacity bytes, allocated once)
//! ├── RingIndex              (wraparound arithmetic over the region)
//! └── tail ─ … ─ latest ─ head
//!      oldest     newest    next write
//! ```
//!
//! # Record layout
//!
//! ```text
//! [prev: u64 LE] [len: u64 LE] [patch: len bytes]
//! ```
//!
//! `prev` is the start offset of the previous record and is only read when
//! popping. The forward link is implicit: the next record starts right
//! after this one, or at offset 0 when fewer than one maximal record's
//! worth of bytes remain before the end of the region.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod index;
pub mod log;

pub use error::ArenaError;
pub use index::RingIndex;
pub use log::{Appended, RingLog};

/// Bytes of record header preceding each patch.
pub const RECORD_HEADER_LEN: usize = 16;
