// Weak rolling checksum over a fixed 9-byte window.
//
// Two-part rsync-style sum kept in 16-bit wrapping arithmetic:
//   a = sum of the window bytes
//   b = sum of each byte weighted by its distance from the window end
// packed as `(a & 0xFF) | (b << 8)`.  The shift is the only thing that
// trims `b`; this must stay bit-exact for patch compatibility.
//
// The forward-match helper compares 8 bytes at a time and finishes the
// tail byte by byte.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Window width in bytes, used for both indexing and probing.
pub const WINDOW: usize = 9;

/// Number of distinct checksum values (the full u16 domain).
pub const CHECKSUM_SPACE: usize = 1 << 16;

// ---------------------------------------------------------------------------
// Weak checksum
// ---------------------------------------------------------------------------

/// Full checksum of the first [`WINDOW`] bytes of `base`.
#[inline]
pub fn weak_checksum(base: &[u8]) -> u16 {
    debug_assert!(base.len() >= WINDOW);
    let mut a: u16 = 0;
    let mut b: u16 = 0;
    for (k, &byte) in base[..WINDOW].iter().enumerate() {
        let weight = (WINDOW - k) as u16;
        a = a.wrapping_add(byte as u16);
        b = b.wrapping_add(weight.wrapping_mul(byte as u16));
    }
    pack(a, b)
}

#[inline(always)]
fn pack(a: u16, b: u16) -> u16 {
    (a & 0xFF) | (b << 8)
}

/// Rolling form of [`weak_checksum`].
///
/// Only the low byte of each partial sum survives packing, and both sums are
/// linear in the window bytes, so sliding by one byte can be done on the
/// packed value with mod-256 arithmetic.
#[derive(Clone, Copy, Debug, Default)]
pub struct RollingChecksum {
    value: u16,
}

impl RollingChecksum {
    /// Seed from the window at the start of `base`.
    pub fn new(base: &[u8]) -> Self {
        Self {
            value: weak_checksum(base),
        }
    }

    /// Current packed checksum.
    #[inline(always)]
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Slide the window one byte: drop `outgoing`, append `incoming`.
    #[inline(always)]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) {
        let a = self.value & 0xFF;
        let b = self.value >> 8;
        let a = a
            .wrapping_sub(outgoing as u16)
            .wrapping_add(incoming as u16)
            & 0xFF;
        let b = b
            .wrapping_sub((WINDOW as u16).wrapping_mul(outgoing as u16))
            .wrapping_add(a)
            & 0xFF;
        self.value = pack(a, b);
    }
}

/// Iterate the checksum of every window start in `[0, data.len() - WINDOW)`.
///
/// Yields nothing when `data` is not longer than [`WINDOW`].
pub fn window_checksums(data: &[u8]) -> impl Iterator<Item = u16> + '_ {
    let count = data.len().saturating_sub(WINDOW);
    let mut rolling = RollingChecksum::default();
    (0..count).map(move |i| {
        if i == 0 {
            rolling = RollingChecksum::new(data);
        } else {
            rolling.roll(data[i - 1], data[i - 1 + WINDOW]);
        }
        rolling.value()
    })
}

// ---------------------------------------------------------------------------
// Forward match
// ---------------------------------------------------------------------------

/// Number of equal leading bytes of `s1` and `s2`, looking at most `n` bytes.
#[inline]
pub fn forward_match(s1: &[u8], s2: &[u8], n: usize) -> usize {
    let n = n.min(s1.len()).min(s2.len());
    let mut i = 0;

    while i + 8 <= n {
        let a = u64::from_le_bytes(word(&s1[i..i + 8]));
        let b = u64::from_le_bytes(word(&s2[i..i + 8]));
        let xor = a ^ b;
        if xor != 0 {
            return i + (xor.trailing_zeros() / 8) as usize;
        }
        i += 8;
    }

    while i < n && s1[i] == s2[i] {
        i += 1;
    }
    i
}

#[inline(always)]
fn word(bytes: &[u8]) -> [u8; 8] {
    let mut w = [0u8; 8];
    w.copy_from_slice(bytes);
    w
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
