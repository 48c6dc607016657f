//! Wraparound arithmetic over the log region.

/// Offset arithmetic for a circular region that never splits a record.
///
/// Records are placed contiguously. A cursor that ends closer than
/// `reserve` bytes to the physical end wraps to 0, so any cursor produced
/// by [`advance`](Self::advance) always has `reserve` contiguous bytes
/// ahead of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingIndex {
    capacity: usize,
    reserve: usize,
}

impl RingIndex {
    /// Index over `capacity` bytes where every record fits in `reserve`.
    ///
    /// Callers guarantee `reserve <= capacity`.
    pub fn new(capacity: usize, reserve: usize) -> Self {
        debug_assert!(reserve <= capacity);
        Self { capacity, reserve }
    }

    /// Region size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest record the region is laid out for.
    pub fn reserve(&self) -> usize {
        self.reserve
    }

    /// Start of the record following one of `len` bytes at `pos`.
    pub fn advance(&self, pos: usize, len: usize) -> usize {
        let end = pos + len;
        if self.capacity - end < self.reserve {
            0
        } else {
            end
        }
    }

    /// Bytes from `from` forward to `to`, wrapping at the end.
    ///
    /// Equal positions are distance 0.
    pub fn distance(&self, from: usize, to: usize) -> usize {
        (to + self.capacity - from) % self.capacity
    }
}
