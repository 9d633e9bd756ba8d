//! `Content-Range` response header parsing.
//!
//! Recognized forms:
//!
//! ```text
//! Content-Range: bytes 42-1233/1234
//! Content-Range: bytes 42-1233/*
//! Content-Range: bytes */1234
//! ```
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentRangeError {
    #[error("content-range parse error: {0:?}")]
    Malformed(String),
    #[error("unsupported unit `{0}`")]
    UnsupportedUnit(String),
    #[error("unsupported field `{0}`")]
    UnsupportedField(String),
    #[error("can't parse {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        #[source]
        source: ParseIntError,
    },
}

/// Parsed value of a `Content-Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRange {
    /// `bytes <first>-<last>/<length>` or `bytes <first>-<last>/*`
    Bytes {
        first: u64,
        last: u64,
        complete_length: Option<u64>,
    },
    /// `bytes */<length>`, sent with 416 responses.
    Unsatisfied { complete_length: u64 },
}

impl ContentRange {
    pub fn first(&self) -> Option<u64> {
        match *self {
            ContentRange::Bytes { first, .. } => Some(first),
            ContentRange::Unsatisfied { .. } => None,
        }
    }

    pub fn last(&self) -> Option<u64> {
        match *self {
            ContentRange::Bytes { last, .. } => Some(last),
            ContentRange::Unsatisfied { .. } => None,
        }
    }

    /// Total length of the resource, if the server disclosed it.
    pub fn complete_length(&self) -> Option<u64> {
        match *self {
            ContentRange::Bytes {
                complete_length, ..
            } => complete_length,
            ContentRange::Unsatisfied { complete_length } => Some(complete_length),
        }
    }
}

impl FromStr for ContentRange {
    type Err = ContentRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_content_range(s)
    }
}

fn parse_number(field: &'static str, token: &str) -> Result<u64, ContentRangeError> {
    token
        .parse()
        .map_err(|source| ContentRangeError::InvalidNumber { field, source })
}

/// Parse the value of a `Content-Range` header.
pub fn parse_content_range(value: &str) -> Result<ContentRange, ContentRangeError> {
    let fields: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .filter(|token| !token.is_empty())
        .collect();

    match fields.as_slice() {
        [] => Err(ContentRangeError::Malformed(value.to_string())),
        [unit, ..] if *unit != "bytes" => Err(ContentRangeError::UnsupportedUnit(unit.to_string())),
        [_, first, last, length] => {
            let first = parse_number("first", first)?;
            let last = parse_number("last", last)?;
            if last < first {
                return Err(ContentRangeError::Malformed(value.to_string()));
            }
            let complete_length = match *length {
                "*" => None,
                length => Some(parse_number("length", length)?),
            };
            Ok(ContentRange::Bytes {
                first,
                last,
                complete_length,
            })
        }
        [_, range, length] => {
            if *range != "*" {
                return Err(ContentRangeError::UnsupportedField(range.to_string()));
            }
            let complete_length = parse_number("length", length)?;
            Ok(ContentRange::Unsatisfied { complete_length })
        }
        _ => Err(ContentRangeError::Malformed(value.to_string())),
    }
}
