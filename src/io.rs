// File-level helper for patch encoding.
//
// Provides `encode_file()`, which reads source and target fully into
// memory, writes the patch through a buffered file sink, and removes the
// partial output if encoding is abandoned.  Optionally computes SHA-256
// digests of both inputs (feature-gated behind `file-io`) so a storage
// layer can pin the exact source version a patch applies to.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::patch::encoder::{self, EncodeError, EncodeOptions, EncodeStats};
use crate::patch::sink::WriteSink;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct FileEncodeStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Record-level summary of the written patch.
    pub patch: EncodeStats,
    /// SHA-256 of the source file (if `file-io` feature is enabled).
    pub source_sha256: Option<[u8; 32]>,
    /// SHA-256 of the target file (if `file-io` feature is enabled).
    pub target_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level encoding.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Encoding failed; the patch file has been removed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// The patch path names one of the input files.
    #[error("patch output {} is also an input file", path.display())]
    OutputIsInput { path: PathBuf },
}

impl IoError {
    /// Whether the caller should fall back to storing the target verbatim.
    pub fn is_not_worthwhile(&self) -> bool {
        matches!(self, Self::Encode(e) if e.is_not_worthwhile())
    }
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Encode the patch from `source_path` to `target_path` into `patch_path`.
///
/// The patch file is created (or truncated) before encoding starts.  If the
/// encode fails for any reason the file is deleted, so a patch file left on
/// disk is always complete.  A `patch_path` that resolves to the source or
/// target file is refused before anything is created.
pub fn encode_file(
    source_path: &Path,
    target_path: &Path,
    patch_path: &Path,
    opts: &EncodeOptions,
) -> Result<FileEncodeStats, IoError> {
    let source = fs::read(source_path)?;
    let target = fs::read(target_path)?;
    ensure_distinct(patch_path, &[source_path, target_path])?;

    let file = File::create(patch_path)?;
    let result = write_patch(file, &source, &target, opts);
    let patch = match result {
        Ok(stats) => stats,
        Err(e) => {
            if let Err(rm) = fs::remove_file(patch_path) {
                log::warn!(
                    "could not remove partial patch {}: {rm}",
                    patch_path.display()
                );
            }
            return Err(e);
        }
    };

    #[cfg(feature = "file-io")]
    let (source_sha256, target_sha256) = (Some(sha256(&source)), Some(sha256(&target)));
    #[cfg(not(feature = "file-io"))]
    let (source_sha256, target_sha256): (Option<[u8; 32]>, Option<[u8; 32]>) = (None, None);

    Ok(FileEncodeStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        patch,
        source_sha256,
        target_sha256,
    })
}

// Inputs have already been read, so they resolve.  A patch path that does
// not exist yet cannot alias anything.
fn ensure_distinct(patch_path: &Path, inputs: &[&Path]) -> Result<(), IoError> {
    let Ok(patch) = fs::canonicalize(patch_path) else {
        return Ok(());
    };
    for input in inputs {
        if fs::canonicalize(input)? == patch {
            return Err(IoError::OutputIsInput {
                path: patch_path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn write_patch(
    file: File,
    source: &[u8],
    target: &[u8],
    opts: &EncodeOptions,
) -> Result<EncodeStats, IoError> {
    let mut sink = WriteSink::new(BufWriter::with_capacity(BUF_SIZE, file));
    let stats = encoder::encode_with_options(source, target, &mut sink, opts)?;
    let mut writer = sink.into_inner();
    writer.flush()?;
    Ok(stats)
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> [u8; 32] {
    let mut h = sha2::Sha256::new();
    h.update(data);
    h.finalize().into()
}

/// Lowercase hex rendering of a digest.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
