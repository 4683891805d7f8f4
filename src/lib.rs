//! Rolldelta: single-pass rolling-checksum binary delta encoding.
//!
//! The crate provides:
//! - Weak checksum, source index and greedy matching (`hash`)
//! - The patch record format, output sinks and the encoder (`patch`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! A patch is a stream of literal-run and copy-from-source records.  It is
//! only produced when it comes out strictly smaller than the target; every
//! other outcome is an error telling the caller to store the target as-is.
//!
//! # Quick Start
//!
//! ```
//! use rolldelta::patch::{self, PatchRecords, Record, ByteOrder};
//!
//! let source = b"hello old world, hello old world, hello old world".to_vec();
//! let mut target = source.clone();
//! target.extend_from_slice(b" and then some");
//!
//! let mut delta = Vec::new();
//! match patch::encode(&source, &target, &mut delta) {
//!     Ok(stats) => assert_eq!(stats.patch_len as usize, delta.len()),
//!     Err(e) => panic!("store the target instead: {e}"),
//! }
//!
//! let copies = PatchRecords::new(&delta, ByteOrder::Little)
//!     .filter(|r| matches!(r, Ok(Record::Copy { .. })))
//!     .count();
//! assert_eq!(copies, 1);
//! ```

pub mod hash;
pub mod io;
pub mod patch;

#[cfg(feature = "cli")]
pub mod cli;
