// Single-pass delta encoder.
//
// The source is indexed once by weak checksum, then the target is scanned
// left to right.  At each position the longest verified source match of at
// least one window is emitted as a copy record, preceded by any pending
// literal bytes.  Unmatched bytes accumulate into literal runs that are
// flushed at the record size limit and at the end.
//
// The patch only pays off while it is smaller than the target, so the
// running size is checked after every record and the encode is abandoned
// as soon as it reaches the target length.  On failure the sink holds a
// partial stream that callers must discard.

use thiserror::Error;

use crate::hash::rolling::{RollingChecksum, WINDOW};
use crate::hash::{Match, MatchEngine};

use super::format::{ByteOrder, COPY_FLAG, COPY_RECORD_LEN, LITERAL_HEADER_LEN, MAX_RECORD_LEN};
use super::sink::PatchSink;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Both inputs must be strictly longer than this many bytes.
pub const MIN_INPUT_LEN: usize = WINDOW;

/// Configuration for the delta encoder.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Byte order of record headers and copy offsets.
    pub byte_order: ByteOrder,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("inputs too small to diff (source {source_len} bytes, target {target_len} bytes)")]
    InputTooSmall {
        source_len: usize,
        target_len: usize,
    },
    #[error("source of {source_len} bytes exceeds the 32-bit offset range")]
    SourceTooLarge { source_len: usize },
    #[error("patch reached {written} bytes, not smaller than the {target_len}-byte target")]
    PatchTooLarge { written: u64, target_len: usize },
    #[error("sink write failed: {0}")]
    Sink(#[from] std::io::Error),
}

impl EncodeError {
    /// Whether the patch was rejected on size grounds rather than I/O.
    pub fn is_not_worthwhile(&self) -> bool {
        matches!(
            self,
            Self::InputTooSmall { .. } | Self::SourceTooLarge { .. } | Self::PatchTooLarge { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Summary of a successful encode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Bytes written to the sink by this encode.
    pub patch_len: u64,
    pub literal_records: u64,
    pub literal_bytes: u64,
    pub copy_records: u64,
    pub copied_bytes: u64,
}

// ---------------------------------------------------------------------------
// High-level encode
// ---------------------------------------------------------------------------

/// Encode the delta from `source` to `target` into `sink`.
///
/// # Example
/// ```
/// use rolldelta::patch::encoder;
///
/// let source = b"The quick brown fox jumps over the lazy dog.".to_vec();
/// let mut target = source.clone();
/// target.extend_from_slice(b" Twice.");
///
/// let mut patch = Vec::new();
/// let stats = encoder::encode(&source, &target, &mut patch).unwrap();
/// assert!(stats.patch_len < target.len() as u64);
/// ```
pub fn encode<S: PatchSink>(
    source: &[u8],
    target: &[u8],
    sink: S,
) -> Result<EncodeStats, EncodeError> {
    encode_with_options(source, target, sink, &EncodeOptions::default())
}

/// Encode with custom options.
pub fn encode_with_options<S: PatchSink>(
    source: &[u8],
    target: &[u8],
    sink: S,
    opts: &EncodeOptions,
) -> Result<EncodeStats, EncodeError> {
    if source.len() <= MIN_INPUT_LEN || target.len() <= MIN_INPUT_LEN {
        return Err(EncodeError::InputTooSmall {
            source_len: source.len(),
            target_len: target.len(),
        });
    }
    if u32::try_from(source.len()).is_err() {
        return Err(EncodeError::SourceTooLarge {
            source_len: source.len(),
        });
    }

    let engine = MatchEngine::new(source);
    let out = RecordWriter::new(sink, opts.byte_order, target.len());

    let result = scan(&engine, target, out);
    match &result {
        Ok(stats) => log::debug!(
            "patch {} bytes for {}-byte target: {} copies ({} bytes), {} literals ({} bytes)",
            stats.patch_len,
            target.len(),
            stats.copy_records,
            stats.copied_bytes,
            stats.literal_records,
            stats.literal_bytes
        ),
        Err(e) => log::debug!("patch abandoned: {e}"),
    }
    result
}

/// Boolean form of [`encode`]: `true` when a patch smaller than `target` was
/// written, `false` when the caller should store `target` as-is.
pub fn try_encode<S: PatchSink>(source: &[u8], target: &[u8], sink: S) -> bool {
    encode(source, target, sink).is_ok()
}

fn scan<S: PatchSink>(
    engine: &MatchEngine<'_>,
    target: &[u8],
    mut out: RecordWriter<S>,
) -> Result<EncodeStats, EncodeError> {
    let end = target.len() - WINDOW;
    let mut last_match = 0usize;
    let mut pos = 0usize;
    let mut cksum = RollingChecksum::new(target);

    while pos < end {
        if pos - last_match == MAX_RECORD_LEN {
            out.literal(&target[last_match..pos])?;
            last_match = pos;
        }

        match engine.best_match(cksum.value(), target, pos) {
            Some(m) if m.len >= WINDOW => {
                if pos > last_match {
                    out.literal(&target[last_match..pos])?;
                }
                out.copy(m)?;
                pos += m.len;
                last_match = pos;
                if pos < end {
                    cksum = RollingChecksum::new(&target[pos..]);
                }
            }
            _ => {
                pos += 1;
                if pos < end {
                    cksum.roll(target[pos - 1], target[pos - 1 + WINDOW]);
                }
            }
        }
    }

    for chunk in target[last_match..].chunks(MAX_RECORD_LEN) {
        out.literal(chunk)?;
    }

    out.finish()
}

// ---------------------------------------------------------------------------
// Record writer
// ---------------------------------------------------------------------------

/// Frames records onto a sink and enforces the size budget.
struct RecordWriter<S: PatchSink> {
    sink: S,
    order: ByteOrder,
    start: u64,
    target_len: usize,
    stats: EncodeStats,
}

impl<S: PatchSink> RecordWriter<S> {
    fn new(sink: S, order: ByteOrder, target_len: usize) -> Self {
        let start = sink.position();
        Self {
            sink,
            order,
            start,
            target_len,
            stats: EncodeStats::default(),
        }
    }

    fn literal(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        debug_assert!(!data.is_empty() && data.len() <= MAX_RECORD_LEN);
        log::trace!("literal {} bytes", data.len());
        self.sink.write_u16(data.len() as u16, self.order)?;
        self.sink.write_bytes(data)?;
        self.stats.literal_records += 1;
        self.stats.literal_bytes += data.len() as u64;
        debug_assert_eq!(
            self.written(),
            self.stats.literal_bytes
                + self.stats.literal_records * LITERAL_HEADER_LEN as u64
                + self.stats.copy_records * COPY_RECORD_LEN as u64
        );
        self.check_budget()
    }

    fn copy(&mut self, m: Match) -> Result<(), EncodeError> {
        debug_assert!(m.len >= WINDOW && m.len <= MAX_RECORD_LEN);
        log::trace!("copy {} bytes from source offset {}", m.len, m.offset);
        self.sink.write_u16(m.len as u16 | COPY_FLAG, self.order)?;
        self.sink.write_u32(m.offset, self.order)?;
        self.stats.copy_records += 1;
        self.stats.copied_bytes += m.len as u64;
        self.check_budget()
    }

    fn written(&self) -> u64 {
        self.sink.position() - self.start
    }

    fn check_budget(&self) -> Result<(), EncodeError> {
        let written = self.written();
        if written >= self.target_len as u64 {
            return Err(EncodeError::PatchTooLarge {
                written,
                target_len: self.target_len,
            });
        }
        Ok(())
    }

    fn finish(mut self) -> Result<EncodeStats, EncodeError> {
        self.check_budget()?;
        self.stats.patch_len = self.written();
        Ok(self.stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
