//! Word-granular delta codec for rewind snapshots.
//!
//! Produces and applies compact patches between two equal-length byte
//! buffers interpreted as arrays of 16-bit words. Changes between adjacent
//! simulation steps are typically sparse and clustered, so a patch stores
//! only the runs of words that differ.
//!
//! # Architecture
//!
//! - [`compress`] / [`compress_with`] diff two buffers into a patch
//! - [`decompress`] replays a patch **in place** over a copy of the old buffer
//! - [`max_patch_size`] bounds the patch for a given buffer length
//! - [`ScanBackend`] is the word-compare capability behind the hot path
//!   (SSE2 where available, a register-width scalar scan elsewhere)
//! - [`alloc_tagged_buffer`] allocates word-aligned snapshot buffers
//! - [`inspect`] walks a patch and summarises its runs
//!
//! # Format
//!
//! All header words are little-endian `u16`. Payload words are copied
//! byte-for-byte from the new buffer.
//!
//! ```text
//! change run : [changed 1..=65535] [skip 0..=65535] [changed × word]
//! long skip  : [0] [count lo] [count hi]              (count >= 1)
//! terminator : [0] [0] [0]
//! ```
//!
//! This crate is the only one in the workspace besides `rewind-ffi` that
//! may contain `unsafe` code, confined to the SSE2 scan and the byte view
//! of word-backed snapshot buffers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod codec;
pub mod error;
pub mod inspect;
pub mod scan;

pub use buffer::{alloc_tagged_buffer, TaggedBuffer};
pub use codec::{compress, compress_with, decompress, max_patch_size};
pub use error::CodecError;
pub use inspect::{inspect, PatchStats};
pub use scan::ScanBackend;

/// Width of one diffing unit in bytes.
pub const WORD_BYTES: usize = 2;

/// Longest skip or change run a single run header can describe, in words.
pub const MAX_RUN_WORDS: usize = u16::MAX as usize;

/// Encoded size of the terminating triple of zero words.
pub const TERMINATOR_LEN: usize = 3 * WORD_BYTES;
