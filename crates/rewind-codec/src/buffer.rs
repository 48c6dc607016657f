//! Word-aligned snapshot buffers carrying a lineage tag.
//!
//! A rewind session keeps two snapshot buffers and swaps their roles on
//! every push. The tag is written into the word just past the logical end
//! of the allocation, so after any number of swaps each buffer can still
//! say where it came from. Tags never affect codec output.

use crate::error::CodecError;
use crate::WORD_BYTES;

/// A zero-initialised, word-padded byte buffer with a lineage tag.
///
/// Backed by `u16` storage, so the data is always aligned for word access.
/// The visible length is the requested byte length; an odd length leaves
/// one hidden padding byte. One more word after the data holds the tag and
/// is never exposed through the byte views.
#[derive(Clone, Debug)]
pub struct TaggedBuffer {
    words: Vec<u16>,
    len: usize,
}

/// Allocate a zeroed buffer of `len` bytes tagged with `tag`.
///
/// # Errors
///
/// Returns [`CodecError::AllocationFailed`] if the allocator refuses the
/// request. Never aborts on out-of-memory.
pub fn alloc_tagged_buffer(len: usize, tag: u16) -> Result<TaggedBuffer, CodecError> {
    let words = len.div_ceil(WORD_BYTES) + 1;
    let mut storage: Vec<u16> = Vec::new();
    storage
        .try_reserve_exact(words)
        .map_err(|_| CodecError::AllocationFailed { bytes: len })?;
    storage.resize(words - 1, 0);
    storage.push(tag);
    Ok(TaggedBuffer {
        words: storage,
        len,
    })
}

impl TaggedBuffer {
    /// Lineage tag assigned at allocation.
    pub fn tag(&self) -> u16 {
        self.words[self.data_words()]
    }

    /// Whether this buffer was allocated with `tag`.
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag() == tag
    }

    /// Visible length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The buffer contents as bytes.
    pub fn as_slice(&self) -> &[u8] {
        let bytes: &[u8] = words_as_bytes(&self.words);
        &bytes[..self.len]
    }

    /// The buffer contents as mutable bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.len;
        let bytes: &mut [u8] = words_as_bytes_mut(&mut self.words);
        &mut bytes[..len]
    }

    /// Overwrite the whole buffer with `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src.len()` differs from [`len`](Self::len).
    pub fn copy_from(&mut self, src: &[u8]) {
        self.as_mut_slice().copy_from_slice(src);
    }

    /// Zero every byte. The tag is kept.
    pub fn zero(&mut self) {
        let data = self.data_words();
        self.words[..data].fill(0);
    }

    /// Words holding data and padding, excluding the tag word.
    fn data_words(&self) -> usize {
        self.len.div_ceil(WORD_BYTES)
    }
}

impl AsRef<[u8]> for TaggedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for TaggedBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

#[allow(unsafe_code)]
fn words_as_bytes(words: &[u16]) -> &[u8] {
    // SAFETY: u16 has no padding or invalid bit patterns, u8 has alignment
    // 1, and the byte length covers exactly the same allocation.
    unsafe { std::slice::from_raw_parts(words.as_ptr().cast::<u8>(), words.len() * WORD_BYTES) }
}

#[allow(unsafe_code)]
fn words_as_bytes_mut(words: &mut [u16]) -> &mut [u8] {
    // SAFETY: as in `words_as_bytes`; every byte pattern is a valid u16 and
    // the exclusive borrow is carried over to the returned slice.
    unsafe {
        std::slice::from_raw_parts_mut(words.as_mut_ptr().cast::<u8>(), words.len() * WORD_BYTES)
    }
}
