// Patch record framing.
//
// A patch is a bare sequence of records, with no header or magic:
//
//   literal run:  u16 len (1..=0x7FFF)         then `len` raw target bytes
//   copy:         u16 len | 0x8000 (9..=0x7FFF) then u32 source offset
//
// The high bit of the length word is the only discriminator.  Multi-byte
// fields use one byte order for the whole stream, little-endian unless the
// caller asks otherwise.

use thiserror::Error;

use crate::hash::{MAX_MATCH, WINDOW};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Flag bit marking a copy record.
pub const COPY_FLAG: u16 = 0x8000;

/// Largest length a literal or copy record can carry.
pub const MAX_RECORD_LEN: usize = MAX_MATCH;

/// Shortest copy the encoder emits.
pub const MIN_COPY_LEN: usize = WINDOW;

/// Size of a literal record header.
pub const LITERAL_HEADER_LEN: usize = 2;

/// Size of a complete copy record.
pub const COPY_RECORD_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Byte order
// ---------------------------------------------------------------------------

/// Byte order of the u16 length and u32 offset fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
    /// Order of the machine running the encoder.  Only useful for talking to
    /// producers that wrote host-order streams.
    Native,
}

impl ByteOrder {
    fn resolved(self) -> Self {
        match self {
            Self::Native if cfg!(target_endian = "big") => Self::Big,
            Self::Native => Self::Little,
            other => other,
        }
    }

    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self.resolved() {
            Self::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }

    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self.resolved() {
            Self::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }

    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self.resolved() {
            Self::Big => u16::from_be_bytes(bytes),
            _ => u16::from_le_bytes(bytes),
        }
    }

    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self.resolved() {
            Self::Big => u32::from_be_bytes(bytes),
            _ => u32::from_le_bytes(bytes),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Little => "little-endian",
            Self::Big => "big-endian",
            Self::Native => "native",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One decoded patch record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Bytes to append verbatim.
    Literal(&'a [u8]),
    /// Append `len` bytes of the source starting at `offset`.
    Copy { offset: u32, len: u16 },
}

impl Record<'_> {
    /// Number of target bytes this record produces.
    pub fn target_len(&self) -> usize {
        match *self {
            Record::Literal(data) => data.len(),
            Record::Copy { len, .. } => len as usize,
        }
    }

    /// Number of patch bytes this record occupies.
    pub fn encoded_len(&self) -> usize {
        match *self {
            Record::Literal(data) => LITERAL_HEADER_LEN + data.len(),
            Record::Copy { .. } => COPY_RECORD_LEN,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("truncated record at patch offset {at}")]
    Truncated { at: usize },
    #[error("zero-length record at patch offset {at}")]
    ZeroLength { at: usize },
    #[error("copy of {len} bytes at patch offset {at} is shorter than one window")]
    CopyTooShort { at: usize, len: u16 },
}

/// Iterator over the records of a patch held in memory.
///
/// Only the framing is checked; copy offsets are not validated against any
/// source buffer.  Iteration stops after the first error.
pub struct PatchRecords<'a> {
    patch: &'a [u8],
    pos: usize,
    order: ByteOrder,
    failed: bool,
}

impl<'a> PatchRecords<'a> {
    pub fn new(patch: &'a [u8], order: ByteOrder) -> Self {
        Self {
            patch,
            pos: 0,
            order,
            failed: false,
        }
    }

    /// Offset of the next record within the patch.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take<const N: usize>(&mut self, at: usize) -> Result<[u8; N], FormatError> {
        let bytes = self
            .patch
            .get(self.pos..self.pos + N)
            .ok_or(FormatError::Truncated { at })?;
        self.pos += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn next_record(&mut self) -> Result<Record<'a>, FormatError> {
        let at = self.pos;
        let word = self.order.read_u16(self.take::<2>(at)?);
        let len = word & !COPY_FLAG;
        if len == 0 {
            return Err(FormatError::ZeroLength { at });
        }

        if word & COPY_FLAG != 0 {
            if (len as usize) < MIN_COPY_LEN {
                return Err(FormatError::CopyTooShort { at, len });
            }
            let offset = self.order.read_u32(self.take::<4>(at)?);
            Ok(Record::Copy { offset, len })
        } else {
            let end = self.pos + len as usize;
            let data = self
                .patch
                .get(self.pos..end)
                .ok_or(FormatError::Truncated { at })?;
            self.pos = end;
            Ok(Record::Literal(data))
        }
    }
}

impl<'a> Iterator for PatchRecords<'a> {
    type Item = Result<Record<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.patch.len() {
            return None;
        }
        let record = self.next_record();
        self.failed = record.is_err();
        Some(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
