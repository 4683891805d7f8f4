// Checksum and matching machinery for the delta encoder.
//
// This module provides:
// - The 9-byte weak rolling checksum (full and rolling forms)
// - The dense checksum index over the source buffer
// - Greedy longest-match search over one checksum bucket

pub mod matching;
pub mod rolling;
pub mod table;

pub use matching::{MAX_MATCH, Match, MatchEngine};
pub use rolling::{WINDOW, weak_checksum};
pub use table::ChecksumIndex;
