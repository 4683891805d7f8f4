// Output sinks for patch streams.
//
// The encoder only appends bytes and asks how many it has written so far,
// so any sequential destination works: an in-memory Vec, a file behind a
// BufWriter, a socket.

use std::io::{self, Write};

use super::format::ByteOrder;

/// Sequential, append-only destination for patch bytes.
pub trait PatchSink {
    /// Append raw bytes.
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Number of bytes written to the sink so far.
    fn position(&self) -> u64;

    /// Append a 16-bit field.
    fn write_u16(&mut self, value: u16, order: ByteOrder) -> io::Result<()> {
        self.write_bytes(&order.u16_bytes(value))
    }

    /// Append a 32-bit field.
    fn write_u32(&mut self, value: u32, order: ByteOrder) -> io::Result<()> {
        self.write_bytes(&order.u32_bytes(value))
    }
}

impl PatchSink for Vec<u8> {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.len() as u64
    }
}

impl<S: PatchSink + ?Sized> PatchSink for &mut S {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_bytes(buf)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}

/// Adapts any [`Write`] into a [`PatchSink`], counting bytes as they go out.
///
/// Writing is unbuffered; wrap files in a `BufWriter` first.
pub struct WriteSink<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Return the underlying writer.  Buffered data is not flushed.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PatchSink for WriteSink<W> {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.written
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
