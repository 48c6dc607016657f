//! Patch introspection for tests, benchmarks and diagnostics.

use crate::codec::{PatchReader, Record};

/// Summary of the records in one patch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Number of change-run records.
    pub change_runs: u64,
    /// Number of long-skip records.
    pub long_skips: u64,
    /// Words carried as payload.
    pub changed_words: u64,
    /// Words skipped, by run headers and long skips together.
    pub skipped_words: u64,
    /// Bytes consumed up to and including the terminator.
    pub encoded_len: usize,
    /// Whether the patch ended with a well-formed terminator.
    pub terminated: bool,
}

/// Walk `patch` and count its records.
///
/// A truncated patch is summarised up to the last complete record and
/// reported with `terminated == false`.
pub fn inspect(patch: &[u8]) -> PatchStats {
    let mut stats = PatchStats::default();
    let mut reader = PatchReader::new(patch);
    for record in reader.by_ref() {
        match record {
            Record::Change { skip, words, .. } => {
                stats.change_runs += 1;
                stats.changed_words += u64::from(words);
                stats.skipped_words += u64::from(skip);
            }
            Record::LongSkip { count } => {
                stats.long_skips += 1;
                stats.skipped_words += u64::from(count);
            }
        }
    }
    stats.encoded_len = reader.position();
    stats.terminated = reader.terminated();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compress, max_patch_size};

    #[test]
    fn terminator_only() {
        let stats = inspect(&[0, 0, 0, 0, 0, 0]);
        assert_eq!(
            stats,
            PatchStats {
                encoded_len: 6,
                terminated: true,
                ..PatchStats::default()
            }
        );
    }

    #[test]
    fn counts_runs_and_skips() {
        let old = vec![0u8; 40];
        let mut new = old.clone();
        new[4] = 1;
        new[30] = 1;
        let mut out = vec![0u8; max_patch_size(40)];
        let len = compress(&old, &new, &mut out).unwrap();
        let stats = inspect(&out[..len]);
        assert_eq!(stats.change_runs, 2);
        assert_eq!(stats.changed_words, 2);
        assert_eq!(stats.skipped_words, 2 + 12);
        assert_eq!(stats.encoded_len, len);
        assert!(stats.terminated);
    }

    #[test]
    fn truncated_patch_is_flagged() {
        let stats = inspect(&[1, 0, 0, 0, 9]);
        assert_eq!(stats.change_runs, 0);
        assert!(!stats.terminated);
    }

    #[test]
    fn bytes_after_terminator_are_ignored() {
        let stats = inspect(&[0, 0, 0, 0, 0, 0, 7, 7]);
        assert_eq!(stats.encoded_len, 6);
        assert!(stats.terminated);
    }
}
