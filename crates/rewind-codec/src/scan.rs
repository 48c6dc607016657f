//! Word-compare capability behind the codec's hot path.
//!
//! The codec needs exactly two questions answered about a pair of
//! equal-length buffers viewed as 16-bit words:
//!
//! - how many leading words are equal ([`ScanBackend::equal_prefix`]), and
//! - where the first equal word is ([`ScanBackend::first_equal`]).
//!
//! Both backends answer them identically; they differ only in how many
//! bytes are compared per step. An odd trailing byte is a half-word whose
//! missing high byte reads as zero on both sides.

#![allow(unsafe_code)]

/// Implementation of the word scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanBackend {
    /// Portable scan comparing eight bytes (four words) per step.
    Scalar,
    /// SSE2 scan comparing sixteen bytes (eight words) per step.
    ///
    /// Falls back to [`Scalar`](ScanBackend::Scalar) on targets without
    /// SSE2, so selecting it is always memory-safe.
    Sse2,
}

impl ScanBackend {
    /// Pick the fastest backend supported by the running CPU.
    pub fn detect() -> Self {
        if sse2_available() {
            Self::Sse2
        } else {
            Self::Scalar
        }
    }

    /// Every backend that runs natively on this CPU, fastest last.
    pub fn available() -> Vec<Self> {
        let mut backends = vec![Self::Scalar];
        if sse2_available() {
            backends.push(Self::Sse2);
        }
        backends
    }

    /// Short lowercase name, for logs and benchmark ids.
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
        }
    }

    /// Number of leading words that are equal in `a` and `b`.
    ///
    /// Returns the total word count when the buffers are identical.
    pub fn equal_prefix(self, a: &[u8], b: &[u8]) -> usize {
        debug_assert_eq!(a.len(), b.len());
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        if self == Self::Sse2 && sse2_available() {
            // SAFETY: SSE2 support was checked just above.
            return unsafe { sse2::equal_prefix(a, b) };
        }
        scalar::equal_prefix(a, b)
    }

    /// Index of the first word that is equal in `a` and `b`.
    ///
    /// Returns the total word count when every word differs.
    pub fn first_equal(self, a: &[u8], b: &[u8]) -> usize {
        debug_assert_eq!(a.len(), b.len());
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        if self == Self::Sse2 && sse2_available() {
            // SAFETY: SSE2 support was checked just above.
            return unsafe { sse2::first_equal(a, b) };
        }
        scalar::first_equal(a, b)
    }
}

impl Default for ScanBackend {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn sse2_available() -> bool {
    // SSE2 is baseline on x86_64.
    true
}

#[cfg(target_arch = "x86")]
#[inline]
fn sse2_available() -> bool {
    std::is_x86_feature_detected!("sse2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[inline]
fn sse2_available() -> bool {
    false
}

/// Whether word `i` is equal in both buffers.
#[inline]
pub(crate) fn word_eq(a: &[u8], b: &[u8], i: usize) -> bool {
    let lo = 2 * i;
    let hi = (lo + 2).min(a.len());
    a[lo..hi] == b[lo..hi]
}

mod scalar {
    use super::word_eq;

    const LOW_15: u64 = 0x7FFF_7FFF_7FFF_7FFF;
    const LANE_HIGH: u64 = 0x8000_8000_8000_8000;

    #[inline]
    fn load_u64(bytes: &[u8]) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        u64::from_le_bytes(buf)
    }

    pub(super) fn equal_prefix(a: &[u8], b: &[u8]) -> usize {
        let n = a.len();
        let mut i = 0;
        while i + 8 <= n {
            let diff = load_u64(&a[i..i + 8]) ^ load_u64(&b[i..i + 8]);
            if diff != 0 {
                return (i + (diff.trailing_zeros() / 8) as usize) / 2;
            }
            i += 8;
        }
        while i < n {
            if a[i] != b[i] {
                return i / 2;
            }
            i += 1;
        }
        n.div_ceil(2)
    }

    pub(super) fn first_equal(a: &[u8], b: &[u8]) -> usize {
        let n = a.len();
        let mut i = 0;
        while i + 8 <= n {
            let diff = load_u64(&a[i..i + 8]) ^ load_u64(&b[i..i + 8]);
            // High bit of each 16-bit lane is set iff that lane is non-zero.
            let nonzero = ((diff & LOW_15).wrapping_add(LOW_15) | diff) & LANE_HIGH;
            let zero_lanes = !nonzero & LANE_HIGH;
            if zero_lanes != 0 {
                return i / 2 + (zero_lanes.trailing_zeros() / 16) as usize;
            }
            i += 8;
        }
        let words = n.div_ceil(2);
        (i / 2..words).find(|&w| word_eq(a, b, w)).unwrap_or(words)
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod sse2 {
    #[cfg(target_arch = "x86")]
    use core::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::*;

    /// # Safety
    ///
    /// The CPU must support SSE2.
    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn equal_prefix(a: &[u8], b: &[u8]) -> usize {
        let n = a.len();
        let mut i = 0;
        while i + 16 <= n {
            // SAFETY: i + 16 <= n bounds both unaligned loads.
            let mask = unsafe {
                let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
                let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
                _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32
            };
            if mask != 0xFFFF {
                let first_diff = (!mask & 0xFFFF).trailing_zeros() as usize;
                return (i + first_diff) / 2;
            }
            i += 16;
        }
        i / 2 + super::scalar::equal_prefix(&a[i..], &b[i..])
    }

    /// # Safety
    ///
    /// The CPU must support SSE2.
    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn first_equal(a: &[u8], b: &[u8]) -> usize {
        let n = a.len();
        let mut i = 0;
        while i + 16 <= n {
            // SAFETY: i + 16 <= n bounds both unaligned loads.
            let mask = unsafe {
                let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
                let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
                _mm_movemask_epi8(_mm_cmpeq_epi16(va, vb)) as u32
            };
            // Equal lanes set both of their mask bits.
            if mask != 0 {
                return i / 2 + (mask.trailing_zeros() / 2) as usize;
            }
            i += 16;
        }
        i / 2 + super::scalar::first_equal(&a[i..], &b[i..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_equal_prefix(a: &[u8], b: &[u8]) -> usize {
        let words = a.len().div_ceil(2);
        (0..words).find(|&w| !word_eq(a, b, w)).unwrap_or(words)
    }

    fn naive_first_equal(a: &[u8], b: &[u8]) -> usize {
        let words = a.len().div_ceil(2);
        (0..words).find(|&w| word_eq(a, b, w)).unwrap_or(words)
    }

    #[test]
    fn identical_buffers_are_fully_equal() {
        let a = vec![7u8; 100];
        for backend in ScanBackend::available() {
            assert_eq!(backend.equal_prefix(&a, &a), 50);
            assert_eq!(backend.first_equal(&a, &a), 0);
        }
    }

    #[test]
    fn fully_different_buffers_have_no_equal_word() {
        let a = vec![0u8; 37];
        let b = vec![1u8; 37];
        for backend in ScanBackend::available() {
            assert_eq!(backend.equal_prefix(&a, &b), 0);
            assert_eq!(backend.first_equal(&a, &b), 19);
        }
    }

    #[test]
    fn mismatch_in_high_byte_reports_its_word() {
        let a = vec![0u8; 64];
        let mut b = a.clone();
        b[41] = 9;
        for backend in ScanBackend::available() {
            assert_eq!(backend.equal_prefix(&a, &b), 20);
        }
    }

    #[test]
    fn half_matching_word_is_not_equal() {
        // Word 3 matches in its low byte only.
        let a = vec![1u8; 32];
        let mut b = vec![2u8; 32];
        b[6] = 1;
        b[10] = 1;
        b[11] = 1;
        for backend in ScanBackend::available() {
            assert_eq!(backend.first_equal(&a, &b), 5);
        }
    }

    #[test]
    fn odd_trailing_byte_is_a_half_word() {
        let a = vec![3u8; 17];
        let mut b = a.clone();
        b[16] = 4;
        for backend in ScanBackend::available() {
            assert_eq!(backend.equal_prefix(&a, &b), 8);
        }
        let c = vec![9u8; 17];
        let mut d = vec![8u8; 17];
        d[16] = 9;
        for backend in ScanBackend::available() {
            assert_eq!(backend.first_equal(&c, &d), 8);
        }
    }

    #[test]
    fn empty_buffers() {
        for backend in ScanBackend::available() {
            assert_eq!(backend.equal_prefix(&[], &[]), 0);
            assert_eq!(backend.first_equal(&[], &[]), 0);
        }
    }

    #[test]
    fn detect_is_available() {
        assert!(ScanBackend::available().contains(&ScanBackend::detect()));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Pairs of equal-length buffers with sparse, clustered differences.
        fn buffer_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
            (0usize..300).prop_flat_map(|len| {
                (
                    proptest::collection::vec(0u8..4, len),
                    proptest::collection::vec(0u8..4, len),
                    proptest::collection::vec(any::<bool>(), len),
                )
                    .prop_map(|(a, noise, keep)| {
                        let b = a
                            .iter()
                            .zip(noise.iter().zip(keep.iter()))
                            .map(|(&x, (&n, &k))| if k { x } else { n })
                            .collect();
                        (a, b)
                    })
            })
        }

        proptest! {
            #[test]
            fn equal_prefix_matches_oracle((a, b) in buffer_pair()) {
                let expected = naive_equal_prefix(&a, &b);
                for backend in ScanBackend::available() {
                    prop_assert_eq!(backend.equal_prefix(&a, &b), expected);
                }
            }

            #[test]
            fn first_equal_matches_oracle((a, b) in buffer_pair()) {
                let expected = naive_first_equal(&a, &b);
                for backend in ScanBackend::available() {
                    prop_assert_eq!(backend.first_equal(&a, &b), expected);
                }
            }
        }
    }
}
