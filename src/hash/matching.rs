// Greedy longest-match search.
//
// For a target position, walk the bucket of candidate source offsets that
// share its weak checksum and keep the longest verified match.  Candidates
// that cannot beat the current best are skipped without touching the data;
// the rest are checked at the first byte, at the current-best boundary and
// over the whole prefix before being extended one byte at a time.

use super::rolling::forward_match;
use super::table::ChecksumIndex;

/// Longest length a single record can describe (15 bits).
pub const MAX_MATCH: usize = 0x7FFF;

/// A verified match between `source[offset..offset + len]` and the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub offset: u32,
    pub len: usize,
}

/// Source-side state for match searches: the buffer and its index.
pub struct MatchEngine<'s> {
    source: &'s [u8],
    index: ChecksumIndex,
}

impl<'s> MatchEngine<'s> {
    /// Index `source` for matching.
    pub fn new(source: &'s [u8]) -> Self {
        let index = ChecksumIndex::build(source);
        log::debug!(
            "indexed {} source windows into {} buckets",
            index.len(),
            index.occupied_buckets()
        );
        Self { source, index }
    }

    pub fn index(&self) -> &ChecksumIndex {
        &self.index
    }

    /// Best match for `target[pos..]` among sources whose window checksum is
    /// `checksum`.  Returns `None` when no candidate matches a single byte.
    pub fn best_match(&self, checksum: u16, target: &[u8], pos: usize) -> Option<Match> {
        let source = self.source;
        let probe = &target[pos..];
        let mut best: Option<Match> = None;
        let mut best_len = 0usize;

        for &candidate in self.index.candidates(checksum) {
            let start = candidate as usize;
            let limit = (source.len() - start).min(probe.len()).min(MAX_MATCH);
            if limit <= best_len {
                continue;
            }

            let window = &source[start..];
            if window[0] != probe[0] || window[best_len] != probe[best_len] {
                continue;
            }
            if window[..best_len] != probe[..best_len] {
                continue;
            }

            let len = best_len
                + forward_match(&window[best_len..], &probe[best_len..], limit - best_len);
            if len > best_len {
                best_len = len;
                best = Some(Match {
                    offset: candidate,
                    len,
                });
                if best_len == MAX_MATCH {
                    break;
                }
            }
        }

        best
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
