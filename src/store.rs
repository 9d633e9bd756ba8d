//! Buffering stores used when the server does not support Range requests.
use crate::error::Result;
use crate::limited_store::LimitedStore;
use crate::read_at::{ReadAt, ReadOutcome};
use bytes::{BufMut, Bytes, BytesMut};
use log::warn;
use std::fs::File;
use std::io::{self, Read};
use tempfile::NamedTempFile;

/// Takes a byte stream once and provides random access to it.
///
/// `fill` needs exclusive access, reads are safe for concurrent use.
pub trait Store: ReadAt + Send + Sync {
    /// Consume `src` to its end, replacing any previous contents.
    /// Returns the number of bytes stored.
    fn fill(&mut self, src: &mut dyn Read) -> Result<u64>;
    /// Number of bytes currently held
    fn size(&self) -> u64;
    /// Release underlying resources. Safe to call more than once.
    fn close(&mut self) -> Result<()>;
}

/// Limits of the default tiered store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bytes buffered in memory before spilling to a file
    pub memory_limit: u64,
    /// Bytes buffered in a temporary file before giving up
    pub file_limit: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            memory_limit: 1024 * 1024,
            file_limit: 1024 * 1024 * 1024,
        }
    }
}

impl StoreConfig {
    /// Memory store, spilling over to a temporary file, failing beyond that.
    pub fn build(&self) -> LimitedStore {
        LimitedStore::new(
            Box::new(MemoryStore::new()),
            self.memory_limit,
            Some(Box::new(LimitedStore::new(
                Box::new(FileStore::new()),
                self.file_limit,
                None,
            ))),
        )
    }
}

/// Store with default settings: buffers 1 MB in memory and if that is
/// exceeded, up to 1 GB to a temporary file.
pub fn default_store() -> Box<dyn Store> {
    Box::new(StoreConfig::default().build())
}

/// Copy the section of `data` at `offset` into `buf`.
fn read_slice(data: &[u8], buf: &mut [u8], offset: u64) -> ReadOutcome {
    let start = match usize::try_from(offset) {
        Ok(start) if start < data.len() => start,
        _ => return ReadOutcome::eof(0),
    };
    let n = buf.len().min(data.len() - start);
    buf[..n].copy_from_slice(&data[start..start + n]);
    ReadOutcome {
        len: n,
        eof: n < buf.len(),
    }
}

/// Store backed by a memory buffer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buf: Bytes,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadAt for MemoryStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::full(0));
        }
        Ok(read_slice(&self.buf, buf, offset))
    }
}

impl Store for MemoryStore {
    fn fill(&mut self, src: &mut dyn Read) -> Result<u64> {
        self.buf = Bytes::new();
        let mut writer = BytesMut::new().writer();
        let n = io::copy(src, &mut writer)?;
        self.buf = writer.into_inner().freeze();
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.buf.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        self.buf = Bytes::new();
        Ok(())
    }
}

/// Store backed by a temporary file, deleted on re-fill and close.
#[derive(Debug, Default)]
pub struct FileStore {
    tmpfile: Option<NamedTempFile>,
    size: u64,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the current temporary file
    pub fn path(&self) -> Option<&std::path::Path> {
        self.tmpfile.as_ref().map(|f| f.path())
    }
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

impl ReadAt for FileStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::full(0));
        }
        let file = match &self.tmpfile {
            Some(tmpfile) => tmpfile.as_file(),
            None => return Ok(ReadOutcome::eof(0)),
        };
        let mut n = 0;
        while n < buf.len() {
            match pread(file, &mut buf[n..], offset + n as u64) {
                Ok(0) => break,
                Ok(read) => n += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(ReadOutcome {
            len: n,
            eof: n < buf.len(),
        })
    }
}

impl Store for FileStore {
    fn fill(&mut self, src: &mut dyn Read) -> Result<u64> {
        self.close()?;
        let mut tmpfile = tempfile::Builder::new()
            .prefix("httpreaderat")
            .tempfile()?;
        match io::copy(src, tmpfile.as_file_mut()) {
            Ok(n) => {
                self.tmpfile = Some(tmpfile);
                self.size = n;
                Ok(n)
            }
            Err(e) => {
                // Partial contents are never served
                if let Err(close) = tmpfile.close() {
                    warn!("failed to remove temporary file: {}", close);
                }
                Err(e.into())
            }
        }
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn close(&mut self) -> Result<()> {
        self.size = 0;
        match self.tmpfile.take() {
            Some(tmpfile) => Ok(tmpfile.close()?),
            None => Ok(()),
        }
    }
}
