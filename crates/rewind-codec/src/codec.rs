//! Patch encode/decode.
//!
//! A patch is a stream of little-endian `u16` words. The encoder alternates
//! between finding the next run of equal words (a skip) and the next run of
//! differing words (a change), and ends the stream with three zero words.
//! A change run only ends where two consecutive words match again, so single
//! matching words inside a changed region are carried as payload. That keeps
//! every header paid for by at least two skipped words, which is what makes
//! [`max_patch_size`] a true upper bound.

use crate::error::CodecError;
use crate::scan::{word_eq, ScanBackend};
use crate::{MAX_RUN_WORDS, TERMINATOR_LEN, WORD_BYTES};

/// Size of a change-run header: `changed` then `skip`.
const RUN_HEADER_LEN: usize = 2 * WORD_BYTES;

/// Upper bound on the encoded patch for two buffers of `len` bytes.
///
/// The worst case is every word changed: all words as payload, a run header
/// for each [`MAX_RUN_WORDS`] block, and the terminator.
pub fn max_patch_size(len: usize) -> usize {
    let words = len.div_ceil(WORD_BYTES);
    let blocks = words.div_ceil(MAX_RUN_WORDS);
    words * WORD_BYTES + blocks * RUN_HEADER_LEN + TERMINATOR_LEN
}

/// Clamp an unchanged span to what a long-skip record can carry.
///
/// Spans past `u32::MAX` words are emitted as several long skips; the
/// encoder rescans the remainder rather than wrapping the count.
#[inline]
pub(crate) fn long_skip_count(skip: usize) -> u32 {
    u32::try_from(skip).unwrap_or(u32::MAX)
}

// ── Writer / reader ────────────────────────────────────────────

struct PatchWriter<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl<'a> PatchWriter<'a> {
    fn new(out: &'a mut [u8]) -> Self {
        Self { out, pos: 0 }
    }

    #[inline]
    fn word(&mut self, w: u16) {
        self.out[self.pos..self.pos + WORD_BYTES].copy_from_slice(&w.to_le_bytes());
        self.pos += WORD_BYTES;
    }

    #[inline]
    fn payload(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.out[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        if bytes.len() % WORD_BYTES != 0 {
            // Odd trailing byte: pad the half-word so the stream stays aligned.
            self.out[self.pos] = 0;
            self.pos += 1;
        }
    }

    fn long_skip(&mut self, count: u32) {
        self.word(0);
        self.word(count as u16);
        self.word((count >> 16) as u16);
    }

    fn finish(mut self) -> usize {
        self.word(0);
        self.word(0);
        self.word(0);
        self.pos
    }
}

/// A decoded patch record.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Record<'p> {
    /// Leave `skip` words untouched, then overwrite with `payload`.
    Change {
        skip: u16,
        words: u16,
        payload: &'p [u8],
    },
    /// Leave `count` words untouched.
    LongSkip { count: u32 },
}

/// Iterates the records of a patch, stopping at the terminator or at the
/// first truncated record.
pub(crate) struct PatchReader<'p> {
    patch: &'p [u8],
    pos: usize,
    terminated: bool,
}

impl<'p> PatchReader<'p> {
    pub(crate) fn new(patch: &'p [u8]) -> Self {
        Self {
            patch,
            pos: 0,
            terminated: false,
        }
    }

    /// Whether the terminator has been read.
    pub(crate) fn terminated(&self) -> bool {
        self.terminated
    }

    /// Bytes consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    fn word(&mut self) -> Option<u16> {
        let bytes = self.patch.get(self.pos..self.pos + WORD_BYTES)?;
        self.pos += WORD_BYTES;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn take(&mut self, len: usize) -> Option<&'p [u8]> {
        let bytes = self.patch.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(bytes)
    }
}

impl<'p> Iterator for PatchReader<'p> {
    type Item = Record<'p>;

    fn next(&mut self) -> Option<Record<'p>> {
        if self.terminated {
            return None;
        }
        let words = self.word()?;
        if words == 0 {
            let lo = self.word()? as u32;
            let hi = self.word()? as u32;
            let count = lo | (hi << 16);
            self.terminated = count == 0;
            return (count != 0).then_some(Record::LongSkip { count });
        }
        let skip = self.word()?;
        let payload = self.take(words as usize * WORD_BYTES)?;
        Some(Record::Change {
            skip,
            words,
            payload,
        })
    }
}

// ── Encode ─────────────────────────────────────────────────────

/// Diff `old` against `new` into `out` using the detected scan backend.
///
/// See [`compress_with`].
pub fn compress(old: &[u8], new: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
    compress_with(ScanBackend::detect(), old, new, out)
}

/// Diff `old` against `new` into `out`, returning the patch length.
///
/// Applying the patch with [`decompress`] onto a copy of `old` yields
/// `new`. `out` must hold at least [`max_patch_size`]`(old.len())` bytes.
/// Cost is proportional to the number of differing words plus one fast
/// scan over the unchanged spans.
///
/// # Errors
///
/// [`CodecError::LengthMismatch`] if the buffers differ in length, and
/// [`CodecError::PatchBufferTooSmall`] if `out` cannot hold a worst-case
/// patch. Nothing is written on error.
pub fn compress_with(
    backend: ScanBackend,
    old: &[u8],
    new: &[u8],
    out: &mut [u8],
) -> Result<usize, CodecError> {
    if old.len() != new.len() {
        return Err(CodecError::LengthMismatch {
            old: old.len(),
            new: new.len(),
        });
    }
    let needed = max_patch_size(old.len());
    if out.len() < needed {
        return Err(CodecError::PatchBufferTooSmall {
            needed,
            available: out.len(),
        });
    }

    let words = old.len().div_ceil(WORD_BYTES);
    let mut writer = PatchWriter::new(out);
    let mut at = 0;

    while at < words {
        let from = at * WORD_BYTES;
        let skip = backend.equal_prefix(&old[from..], &new[from..]);
        if skip >= words - at {
            break;
        }

        if skip > MAX_RUN_WORDS {
            let count = long_skip_count(skip);
            writer.long_skip(count);
            at += count as usize;
            continue;
        }

        at += skip;
        let changed = change_run_len(backend, old, new, at);
        writer.word(changed as u16);
        writer.word(skip as u16);
        let start = at * WORD_BYTES;
        let end = ((at + changed) * WORD_BYTES).min(new.len());
        writer.payload(&new[start..end]);
        at += changed;
    }

    Ok(writer.finish())
}

/// Length of the change run starting at word `at`, which must differ.
///
/// The run ends at the first pair of consecutive equal words (or at a final
/// equal word), capped at [`MAX_RUN_WORDS`].
fn change_run_len(backend: ScanBackend, old: &[u8], new: &[u8], at: usize) -> usize {
    // Two words of look-ahead past the cap so the pair check never sees a
    // false end of buffer inside the cap.
    let start = at * WORD_BYTES;
    let end = (start + (MAX_RUN_WORDS + 2) * WORD_BYTES).min(old.len());
    let (old, new) = (&old[start..end], &new[start..end]);
    let words = old.len().div_ceil(WORD_BYTES);

    let mut from = 1;
    let run = loop {
        if from >= words {
            break words;
        }
        let offset = from * WORD_BYTES;
        let p = from + backend.first_equal(&old[offset..], &new[offset..]);
        if p + 1 >= words || word_eq(old, new, p + 1) {
            break p.min(words);
        }
        from = p + 2;
    };
    run.min(MAX_RUN_WORDS)
}

// ── Decode ─────────────────────────────────────────────────────

/// Replay `patch` onto `out` in place.
///
/// Only change-run payloads are written; skipped words are left exactly as
/// they are. `out` must therefore already be a byte-identical copy of the
/// buffer the patch was computed from. Applying a patch to any other
/// buffer yields unspecified content (never memory unsafety): writes past
/// the end of `out` are dropped and decoding stops at a truncated record.
pub fn decompress(patch: &[u8], out: &mut [u8]) {
    let mut at: usize = 0;
    for record in PatchReader::new(patch) {
        match record {
            Record::LongSkip { count } => {
                at = at.saturating_add(count as usize);
            }
            Record::Change {
                skip,
                words,
                payload,
            } => {
                at = at.saturating_add(skip as usize);
                let start = at.saturating_mul(WORD_BYTES).min(out.len());
                let end = start.saturating_add(payload.len()).min(out.len());
                out[start..end].copy_from_slice(&payload[..end - start]);
                at = at.saturating_add(words as usize);
            }
        }
    }
}
