use crate::error::Result;
use crate::read_at::{ReadAt, ReadOutcome};
use bytes::{BufMut, BytesMut};
use log::trace;
use std::cmp::max;
use std::sync::Mutex;

/// Default minimal number of bytes fetched on a buffer miss
pub const DEFAULT_MIN_REQ_SIZE: usize = 64 * 1024;

struct Window {
    buf: BytesMut,
    /// Lower index of buffer relative to input stream
    head: u64,
    /// End of the input, once a read came back short
    end: Option<u64>,
}

impl Window {
    fn tail(&self) -> u64 {
        self.head + self.buf.len() as u64
    }

    fn request_range(&mut self, begin: u64, end: u64, min_req_size: usize) -> Option<(u64, usize)> {
        //
        //            head  begin    tail
        //       +------+-----+---+---+------------+
        // File  |      |     |   |   |            |
        //       +------+-----+---+---+------------+
        // buf          |     |   |   |
        //              +-----+---+---+
        // Request            |   |
        //                    +---+
        //                    begin..end

        if end <= self.tail() && begin >= self.head {
            return None;
        }
        // Remove bytes before new begin
        if begin > self.head && begin < self.tail() {
            let _ = self.buf.split_to((begin - self.head) as usize);
            self.head = begin;
        } else if begin >= self.tail() || begin < self.head {
            self.buf.clear();
            self.head = begin;
        }

        // Read additional bytes into buffer
        let range_begin = max(begin, self.tail());
        let range_length = max((end - range_begin) as usize, min_req_size);
        Some((range_begin, range_length))
    }
}

/// Read-ahead buffer for any [`ReadAt`], optimized for sequential reads.
///
/// Misses fetch at least `min_req_size` bytes, so many small reads in a row
/// (e.g. parsing archive headers) turn into few HTTP requests. The window is
/// guarded by a mutex, so concurrent reads through one `BufferedReaderAt` are
/// serialized.
pub struct BufferedReaderAt<R> {
    inner: R,
    min_req_size: usize,
    window: Mutex<Window>,
}

impl<R: ReadAt> BufferedReaderAt<R> {
    pub fn new(inner: R) -> Self {
        BufferedReaderAt {
            inner,
            min_req_size: DEFAULT_MIN_REQ_SIZE,
            window: Mutex::new(Window {
                buf: BytesMut::new(),
                head: 0,
                end: None,
            }),
        }
    }

    /// Set minimal request size.
    pub fn min_req_size(&mut self, size: usize) -> &mut Self {
        self.min_req_size = size;
        self
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: ReadAt> ReadAt for BufferedReaderAt<R> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::full(0));
        }
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());

        let mut end = offset.saturating_add(buf.len() as u64);
        if let Some(input_end) = window.end {
            if offset >= input_end {
                return Ok(ReadOutcome::eof(0));
            }
            end = end.min(input_end);
        }

        if let Some((range_begin, range_length)) =
            window.request_range(offset, end, self.min_req_size)
        {
            trace!("buffer miss, fetching {} bytes at {}", range_length, range_begin);
            let mut chunk = vec![0; range_length];
            let outcome = self.inner.read_at(&mut chunk, range_begin)?;
            window.buf.put_slice(&chunk[..outcome.len]);
            if outcome.eof {
                window.end = Some(range_begin + outcome.len as u64);
            }
        }

        // Return slice from buffer
        let lower = (offset - window.head) as usize;
        let available = window.buf.len().saturating_sub(lower);
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&window.buf[lower..lower + n]);
        // A short window from the inner reader is not the end of the input
        let at_end = window
            .end
            .map_or(false, |input_end| offset + n as u64 >= input_end);
        Ok(ReadOutcome {
            len: n,
            eof: n < buf.len() && at_end,
        })
    }
}
