use crate::content_range::{parse_content_range, ContentRange};
use crate::error::{HttpError, Result};
use crate::metadata::{content_length, header_str, Metadata};
use crate::range_client::{Body, HttpTransport};
use crate::read_at::{ReadAt, ReadOutcome, SectionReader};
use crate::store::Store;
use http::header::{HeaderValue, CONTENT_RANGE, RANGE};
use http::{Method, Request, Response, StatusCode};
use log::{debug, info, warn};
use std::io::{self, Read};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Request counters of a [`HttpReaderAt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderStats {
    /// Number of HTTP requests sent, including the probe
    pub requests: usize,
    /// Sum of all requested range lengths
    pub bytes_requested: u64,
}

/// Random access reader making HTTP Range requests
/// (<https://developer.mozilla.org/en-US/docs/Web/HTTP/Range_requests>).
///
/// The prototype request is copied for every read and never modified.
/// Construction sends a 1 byte probe to find out whether the server
/// supports range requests and to record the resource [`Metadata`]. Each
/// later response is compared against that metadata and
/// [`HttpError::ValidationFailed`] is returned if the resource changed.
///
/// If the server ignores the `Range` header, the whole body is buffered once
/// into the supplied [`Store`] and all reads are served from there.
///
/// `read_at` is safe for concurrent use.
pub struct HttpReaderAt<T> {
    transport: T,
    request: Request<()>,
    meta: Metadata,
    store: Option<Box<dyn Store>>,
    use_store: bool,
    requests_ever_made: AtomicUsize,
    bytes_ever_requested: AtomicU64,
}

impl<T: HttpTransport> HttpReaderAt<T> {
    /// Create a reader for the resource described by `request`.
    ///
    /// Only GET requests are accepted. `store` enables buffering the whole
    /// file for servers that do not support Range requests.
    pub fn new(transport: T, request: Request<()>, store: Option<Box<dyn Store>>) -> Result<Self> {
        if request.method() != Method::GET {
            return Err(HttpError::InvalidMethod(request.method().clone()));
        }
        let mut reader = HttpReaderAt {
            transport,
            request,
            meta: Metadata::default(),
            store,
            use_store: false,
            requests_ever_made: AtomicUsize::new(0),
            bytes_ever_requested: AtomicU64::new(0),
        };
        reader.probe()?;
        Ok(reader)
    }

    /// Make a 1 byte range request to see if they are supported or not.
    /// Also stores the file metadata for later use.
    fn probe(&mut self) -> Result<()> {
        let mut buf = [0u8; 1];
        let response = self.send_range(0, 0)?;
        self.meta = Metadata::from_response(&response);

        if response.status() == StatusCode::OK {
            return self.buffer_into_store(response);
        }
        self.copy_partial(response, &mut buf, 0, 0)?;
        debug!(
            "range requests supported by {}, size: {:?}",
            self.request.uri(),
            self.meta.size
        );
        Ok(())
    }

    fn buffer_into_store(&mut self, response: Response<Body>) -> Result<()> {
        let store = self.store.as_mut().ok_or(HttpError::NoRangeSupport)?;
        info!(
            "{} does not support range requests, buffering whole file",
            self.request.uri()
        );
        let mut body = response.into_body();
        let size = store.fill(&mut body)?;
        if let Some(length) = self.meta.size.filter(|&length| length != size) {
            warn!(
                "content-length {} does not match buffered size {}, using buffered size",
                length, size
            );
        }
        // The store is what reads are served from
        self.meta.size = Some(size);
        self.use_store = true;
        Ok(())
    }

    /// Read `buf.len()` bytes starting at byte offset `offset`.
    ///
    /// Reads reaching past the known end of the file are shortened and
    /// reported with `eof: true`.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::full(0));
        }
        if self.use_store {
            return match &self.store {
                Some(store) => store.read_at(buf, offset),
                None => Err(HttpError::NoRangeSupport),
            };
        }

        let first = offset;
        let mut last = offset.saturating_add(buf.len() as u64 - 1);
        let mut clamped = false;
        if let Some(size) = self.meta.size {
            // Some servers return "416 Range Not Satisfiable" when reading
            // past the end of the file.
            if first >= size {
                return Ok(ReadOutcome::eof(0));
            }
            if last > size - 1 {
                last = size - 1;
                clamped = true;
            }
        }
        let len = (last - first + 1) as usize;

        let response = self.send_range(first, last)?;
        if !self.meta.matches(&Metadata::from_response(&response)) {
            return Err(HttpError::ValidationFailed);
        }
        if response.status() == StatusCode::OK {
            return Err(HttpError::RangeSupportLost);
        }
        let outcome = self.copy_partial(response, &mut buf[..len], first, last)?;
        // A shorter window than requested is not the end of the file
        let at_end = self
            .meta
            .size
            .map_or(false, |size| first + outcome.len as u64 >= size);
        Ok(ReadOutcome {
            len: outcome.len,
            eof: clamped || outcome.eof || at_end,
        })
    }

    fn clone_request(&self) -> Request<()> {
        let mut request = Request::new(());
        *request.method_mut() = self.request.method().clone();
        *request.uri_mut() = self.request.uri().clone();
        *request.version_mut() = self.request.version();
        *request.headers_mut() = self.request.headers().clone();
        *request.extensions_mut() = self.request.extensions().clone();
        request
    }

    fn send_range(&self, first: u64, last: u64) -> Result<Response<Body>> {
        let length = last - first + 1;
        let requests = self.requests_ever_made.fetch_add(1, Ordering::Relaxed) + 1;
        let ever = self.bytes_ever_requested.fetch_add(length, Ordering::Relaxed) + length;

        let mut request = self.clone_request();
        let range = format!("bytes={}-{}", first, last);
        debug!(
            "request: #{}, bytes: (this_request: {}, ever: {}), Range: {}",
            requests, length, ever, range
        );
        let value = HeaderValue::try_from(range).map_err(|_| HttpError::InvalidHeader("Range"))?;
        request.headers_mut().insert(RANGE, value);

        let response = self.transport.send(request)?;
        match response.status() {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => Ok(response),
            status => Err(HttpError::HttpStatus(status)),
        }
    }

    /// Validate a 206 response against the requested range and copy its body.
    ///
    /// `eof` is set if the body ended before `Content-Length` bytes arrived.
    fn copy_partial(
        &self,
        response: Response<Body>,
        buf: &mut [u8],
        req_first: u64,
        req_last: u64,
    ) -> Result<ReadOutcome> {
        let headers = response.headers();
        let value =
            header_str(headers, CONTENT_RANGE.as_str()).ok_or(HttpError::MissingContentRange)?;
        let (first, last) = match parse_content_range(value)? {
            ContentRange::Bytes { first, last, .. } => (first, last),
            ContentRange::Unsatisfied { .. } => return Err(HttpError::InvalidHeader("Content-Range")),
        };
        if first != req_first || last > req_last {
            return Err(HttpError::RangeMismatch {
                req_first,
                req_last,
                first,
                last,
            });
        }
        let expected = last - first + 1;
        let actual = content_length(headers);
        if actual != Some(expected) {
            return Err(HttpError::ContentLengthMismatch { expected, actual });
        }

        let expected = expected as usize;
        let mut body = response.into_body();
        let n = read_full(&mut body, &mut buf[..expected])?;
        Ok(ReadOutcome {
            len: n,
            eof: n < expected,
        })
    }

    /// Size of the file, if known.
    pub fn size(&self) -> Option<u64> {
        self.meta.size
    }

    /// `Content-Type` header contents.
    pub fn content_type(&self) -> &str {
        &self.meta.content_type
    }

    /// `Last-Modified` header contents.
    pub fn last_modified(&self) -> &str {
        &self.meta.last_modified
    }

    /// `ETag` header contents.
    pub fn etag(&self) -> &str {
        &self.meta.etag
    }

    /// Metadata recorded by the initial probe.
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// Whether reads are served from the fallback store.
    pub fn is_buffered(&self) -> bool {
        self.use_store
    }

    /// Requests sent so far, including the probe.
    pub fn stats(&self) -> ReaderStats {
        ReaderStats {
            requests: self.requests_ever_made.load(Ordering::Relaxed),
            bytes_requested: self.bytes_ever_requested.load(Ordering::Relaxed),
        }
    }

    /// `Read + Seek` view of the whole file.
    pub fn reader(&self) -> SectionReader<&Self> {
        SectionReader::new(self, 0, self.meta.size.unwrap_or(u64::MAX))
    }

    /// Release the fallback store, deleting temporary files.
    pub fn close(mut self) -> Result<()> {
        match self.store.take() {
            Some(mut store) => store.close(),
            None => Ok(()),
        }
    }
}

impl<T: HttpTransport> ReadAt for HttpReaderAt<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        HttpReaderAt::read_at(self, buf, offset)
    }
}

impl<T> Drop for HttpReaderAt<T> {
    fn drop(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.close() {
                warn!("failed to close store: {}", e);
            }
        }
    }
}

/// Fill `buf` from `body`. An early end of the body is not an error.
fn read_full(body: &mut Body, buf: &mut [u8]) -> Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match body.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(HttpError::transport(e)),
        }
    }
    Ok(n)
}
