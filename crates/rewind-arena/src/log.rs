//! The circular record log.

use crate::error::ArenaError;
use crate::index::RingIndex;
use crate::RECORD_HEADER_LEN;

/// Outcome of a successful append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Appended {
    /// Start offset of the new record.
    pub offset: usize,
    /// Patch bytes stored in the record.
    pub len: usize,
    /// Number of oldest records evicted to make room.
    pub evicted: usize,
}

/// A fixed-capacity FIFO of variable-length records in one byte region.
///
/// # Invariants
///
/// - `head` always has `max_record` contiguous bytes ahead of it before the
///   physical end of the region.
/// - Live records occupy the circular span `tail..head`; everything from
///   `head` forward to `tail` is free.
/// - `len == 0` implies `head == tail == 0`.
/// - `bytes_used() + free_span() == capacity()`.
pub struct RingLog {
    data: Vec<u8>,
    index: RingIndex,
    max_patch: usize,
    /// Next write position.
    head: usize,
    /// Start of the oldest live record.
    tail: usize,
    /// Start of the newest live record.
    latest: usize,
    /// Number of live records.
    len: usize,
}

impl RingLog {
    /// Allocate a log of `capacity` bytes for patches up to `max_patch`
    /// bytes long.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityTooSmall`] unless `capacity` exceeds one
    /// maximal record, [`ArenaError::AllocationFailed`] if the region
    /// cannot be allocated.
    pub fn new(capacity: usize, max_patch: usize) -> Result<Self, ArenaError> {
        let max_record = RECORD_HEADER_LEN.saturating_add(max_patch);
        if capacity <= max_record {
            return Err(ArenaError::CapacityTooSmall {
                capacity,
                minimum: max_record,
            });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| ArenaError::AllocationFailed { bytes: capacity })?;
        data.resize(capacity, 0);
        Ok(Self {
            data,
            index: RingIndex::new(capacity, max_record),
            max_patch,
            head: 0,
            tail: 0,
            latest: 0,
            len: 0,
        })
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Region size in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Largest patch accepted by [`append`](Self::append).
    pub fn max_patch(&self) -> usize {
        self.max_patch
    }

    /// Size of a record holding a maximal patch.
    pub fn max_record(&self) -> usize {
        self.index.reserve()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes from the head forward to the tail.
    ///
    /// Includes any unusable gap at the physical end of the region.
    pub fn free_span(&self) -> usize {
        if self.len == 0 {
            self.capacity()
        } else {
            self.index.distance(self.head, self.tail)
        }
    }

    /// Bytes between the tail and the head, wrap gaps included.
    pub fn bytes_used(&self) -> usize {
        self.capacity() - self.free_span()
    }

    /// Whether fewer than two maximal patches fit before eviction starts.
    pub fn is_near_full(&self) -> bool {
        self.free_span() <= 2 * self.max_patch
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Append a copy of `patch`, evicting the oldest records as needed.
    ///
    /// # Errors
    ///
    /// [`ArenaError::PatchTooLarge`] if `patch` exceeds
    /// [`max_patch`](Self::max_patch). Nothing is evicted in that case.
    pub fn append(&mut self, patch: &[u8]) -> Result<Appended, ArenaError> {
        if patch.len() > self.max_patch {
            return Err(ArenaError::PatchTooLarge {
                len: patch.len(),
                max: self.max_patch,
            });
        }
        self.append_with(|slot| {
            slot[..patch.len()].copy_from_slice(patch);
            Ok::<_, ArenaError>(patch.len())
        })
    }

    /// Append a record whose patch is written directly into the region.
    ///
    /// `encode` receives a slot of [`max_patch`](Self::max_patch) bytes and
    /// returns how many it used. Records evicted to make room stay evicted
    /// if `encode` fails; the log is otherwise unchanged.
    ///
    /// # Errors
    ///
    /// Whatever `encode` returns, or [`ArenaError::PatchTooLarge`] if it
    /// reports more bytes than the slot holds.
    pub fn append_with<E, F>(&mut self, encode: F) -> Result<Appended, E>
    where
        E: From<ArenaError>,
        F: FnOnce(&mut [u8]) -> Result<usize, E>,
    {
        let evicted = self.make_room();
        let offset = self.head;
        let body = offset + RECORD_HEADER_LEN;
        let written = encode(&mut self.data[body..body + self.max_patch])?;
        if written > self.max_patch {
            return Err(ArenaError::PatchTooLarge {
                len: written,
                max: self.max_patch,
            }
            .into());
        }

        let prev = if self.len == 0 { offset } else { self.latest };
        self.write_u64(offset, prev as u64);
        self.write_u64(offset + 8, written as u64);

        self.latest = offset;
        self.head = self.index.advance(offset, RECORD_HEADER_LEN + written);
        self.len += 1;
        Ok(Appended {
            offset,
            len: written,
            evicted,
        })
    }

    /// The newest record's patch and start offset.
    pub fn read_latest(&self) -> Option<(&[u8], usize)> {
        if self.len == 0 {
            return None;
        }
        let len = self.read_u64(self.latest + 8) as usize;
        let body = self.latest + RECORD_HEADER_LEN;
        Some((&self.data[body..body + len], self.latest))
    }

    /// Drop the newest record, returning its start offset.
    ///
    /// The head moves back to where the record began, so the next append
    /// reuses its space.
    pub fn pop_latest(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let popped = self.latest;
        self.len -= 1;
        if self.len == 0 {
            self.reset();
        } else {
            self.latest = self.read_u64(popped) as usize;
            self.head = popped;
        }
        Some(popped)
    }

    /// Drop every record. The region stays allocated.
    pub fn clear(&mut self) {
        self.len = 0;
        self.reset();
    }

    // ── Internals ───────────────────────────────────────────────

    /// Evict from the tail until a maximal record fits at the head.
    fn make_room(&mut self) -> usize {
        let mut evicted = 0;
        while self.len > 0 && self.free_span() < self.max_record() {
            self.evict_oldest();
            evicted += 1;
        }
        evicted
    }

    fn evict_oldest(&mut self) {
        let len = self.read_u64(self.tail + 8) as usize;
        self.len -= 1;
        if self.len == 0 {
            self.reset();
        } else {
            self.tail = self.index.advance(self.tail, RECORD_HEADER_LEN + len);
        }
    }

    fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.latest = 0;
    }

    fn write_u64(&mut self, at: usize, value: u64) {
        self.data[at..at + 8].copy_from_slice(&value.to_le_bytes());
    }

    fn read_u64(&self, at: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.data[at..at + 8]);
        u64::from_le_bytes(buf)
    }
}

impl std::fmt::Debug for RingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingLog")
            .field("capacity", &self.capacity())
            .field("max_patch", &self.max_patch)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("latest", &self.latest)
            .field("len", &self.len)
            .finish()
    }
}
