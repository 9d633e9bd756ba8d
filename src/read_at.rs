use crate::error::Result;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Result of a successful positional read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Number of bytes copied into the buffer
    pub len: usize,
    /// End of data was reached before the buffer could be filled
    pub eof: bool,
}

impl ReadOutcome {
    pub fn full(len: usize) -> Self {
        ReadOutcome { len, eof: false }
    }

    pub fn eof(len: usize) -> Self {
        ReadOutcome { len, eof: true }
    }
}

/// Random access reading, safe to call concurrently through `&self`.
pub trait ReadAt {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Short reads always carry `eof: true`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome>;
}

impl<R: ReadAt + ?Sized> ReadAt for &R {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        (**self).read_at(buf, offset)
    }
}

impl<R: ReadAt + ?Sized> ReadAt for Box<R> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        (**self).read_at(buf, offset)
    }
}

impl<R: ReadAt + ?Sized> ReadAt for Arc<R> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        (**self).read_at(buf, offset)
    }
}

/// `Read + Seek` over the section `[base, base + len)` of a [`ReadAt`].
pub struct SectionReader<R> {
    inner: R,
    base: u64,
    len: u64,
    pos: u64,
}

impl<R: ReadAt> SectionReader<R> {
    pub fn new(inner: R, base: u64, len: u64) -> Self {
        SectionReader {
            inner,
            base,
            len,
            pos: 0,
        }
    }

    /// Length of the section
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: ReadAt> Read for SectionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.len || buf.is_empty() {
            return Ok(0);
        }
        let remaining = self.len - self.pos;
        let max = if (buf.len() as u64) < remaining {
            buf.len()
        } else {
            remaining as usize
        };
        let outcome = self.inner.read_at(&mut buf[..max], self.base + self.pos)?;
        self.pos += outcome.len as u64;
        Ok(outcome.len)
    }
}

impl<R: ReadAt> Seek for SectionReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (anchor, delta) = match pos {
            SeekFrom::Start(offset) => {
                self.pos = offset;
                return Ok(offset);
            }
            SeekFrom::End(delta) => (self.len, delta),
            SeekFrom::Current(delta) => (self.pos, delta),
        };
        match anchor.checked_add_signed(delta) {
            Some(pos) => {
                self.pos = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
