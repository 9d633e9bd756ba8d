//! Identity snapshot of a remote resource.
use crate::content_range::parse_content_range;
use http::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::{Response, StatusCode};

/// Resource metadata captured from the first response and compared against
/// every later one to notice the file changing under our feet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Total size in bytes, if known
    pub size: Option<u64>,
    pub last_modified: String,
    pub etag: String,
    pub content_type: String,
}

impl Metadata {
    pub fn from_response<B>(response: &Response<B>) -> Self {
        let headers = response.headers();
        let size = match response.status() {
            StatusCode::OK => content_length(headers),
            StatusCode::PARTIAL_CONTENT => header_str(headers, CONTENT_RANGE.as_str())
                .and_then(|value| parse_content_range(value).ok())
                .and_then(|range| range.complete_length()),
            _ => None,
        };
        Metadata {
            size,
            last_modified: header_string(headers, LAST_MODIFIED.as_str()),
            etag: header_string(headers, ETAG.as_str()),
            content_type: header_string(headers, CONTENT_TYPE.as_str()),
        }
    }

    /// Whether `other` describes the same resource.
    ///
    /// Size and `Last-Modified` must be identical and the entity tags must
    /// match under the strong comparison function. A missing or weak ETag
    /// never matches, so servers without strong validators fail validation.
    pub fn matches(&self, other: &Metadata) -> bool {
        self.size == other.size
            && self.last_modified == other.last_modified
            && etag_strong_match(&self.etag, &other.etag)
    }
}

/// Strong ETag comparison (RFC 9110 §8.8.3.2).
pub fn etag_strong_match(a: &str, b: &str) -> bool {
    a == b && a.starts_with('"')
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn header_string(headers: &HeaderMap, name: &str) -> String {
    header_str(headers, name).unwrap_or_default().to_string()
}

/// Parsed `Content-Length`, `None` when absent or invalid.
pub(crate) fn content_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, CONTENT_LENGTH.as_str()).and_then(|value| value.trim().parse().ok())
}
