// Checksum index over the source buffer.
//
// One bucket per 16-bit weak checksum (65536 in total).  Each bucket lists,
// in ascending order, every source offset whose 9-byte window hashes to that
// checksum.  Offsets are indexed over `[0, len - WINDOW)`; the final window
// start is not indexed.
//
// Layout is a flat bucket-start table plus one positions array (counting
// sort), so a lookup is a single slice borrow and nothing is allocated per
// bucket.

use super::rolling::{CHECKSUM_SPACE, window_checksums};

/// Source positions keyed by weak checksum.
pub struct ChecksumIndex {
    /// `starts[c]..starts[c + 1]` is the range of `positions` for checksum `c`.
    starts: Vec<u32>,
    positions: Vec<u32>,
}

impl ChecksumIndex {
    /// Index every window start of `source`.
    ///
    /// `source.len()` must fit in a `u32`; the encoder checks this before
    /// building the index.
    pub fn build(source: &[u8]) -> Self {
        debug_assert!(u32::try_from(source.len()).is_ok());

        let sums: Vec<u16> = window_checksums(source).collect();

        let mut starts = vec![0u32; CHECKSUM_SPACE + 1];
        for &c in &sums {
            starts[c as usize + 1] += 1;
        }
        for c in 0..CHECKSUM_SPACE {
            starts[c + 1] += starts[c];
        }

        let mut fill = starts.clone();
        let mut positions = vec![0u32; sums.len()];
        for (pos, &c) in sums.iter().enumerate() {
            let slot = &mut fill[c as usize];
            positions[*slot as usize] = pos as u32;
            *slot += 1;
        }

        Self { starts, positions }
    }

    /// Candidate source offsets for `checksum`, ascending.
    #[inline(always)]
    pub fn candidates(&self, checksum: u16) -> &[u32] {
        let c = checksum as usize;
        let lo = self.starts[c] as usize;
        let hi = self.starts[c + 1] as usize;
        &self.positions[lo..hi]
    }

    /// Total number of indexed positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of buckets holding at least one position.
    pub fn occupied_buckets(&self) -> usize {
        self.starts.windows(2).filter(|w| w[1] > w[0]).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::rolling::{WINDOW, weak_checksum};

    #[test]
    fn zeros_land_in_bucket_zero() {
        let index = ChecksumIndex::build(&[0u8; 20]);
        assert_eq!(index.len(), 20 - WINDOW);
        assert_eq!(index.candidates(0), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(index.occupied_buckets(), 1);
        assert!(index.candidates(0x2D09).is_empty());
    }

    #[test]
    fn last_window_start_is_not_indexed() {
        let data: Vec<u8> = (0..30u8).collect();
        let index = ChecksumIndex::build(&data);
        let last = data.len() - WINDOW;
        let c = weak_checksum(&data[last..]);
        assert!(!index.candidates(c).contains(&(last as u32)));
    }

    #[test]
    fn every_position_is_findable() {
        let data: Vec<u8> = (0..2048u32).map(|i| (i * 7 ^ (i >> 3)) as u8).collect();
        let index = ChecksumIndex::build(&data);
        for pos in 0..data.len() - WINDOW {
            let c = weak_checksum(&data[pos..]);
            assert!(
                index.candidates(c).binary_search(&(pos as u32)).is_ok(),
                "position {pos} missing from bucket {c:#06x}"
            );
        }
    }

    #[test]
    fn buckets_are_ascending() {
        let data: Vec<u8> = b"abcabcabcabcabcabcabcabcabcabcabcabc".to_vec();
        let index = ChecksumIndex::build(&data);
        let c = weak_checksum(&data[0..]);
        let bucket = index.candidates(c);
        assert!(bucket.len() > 1);
        assert!(bucket.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn short_source_is_empty() {
        let index = ChecksumIndex::build(&[1u8; WINDOW]);
        assert!(index.is_empty());
        assert_eq!(index.occupied_buckets(), 0);
    }
}
