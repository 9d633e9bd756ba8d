//! Random access reader for HTTP resources using Range requests.
//!
//! [`HttpReaderAt`] reads arbitrary byte ranges of a remote file without
//! downloading it in full, so it can back archive readers (e.g. ZIP) that
//! need random access. Servers that ignore `Range` requests are supported by
//! buffering the file once into a [`Store`].

//! ## Usage example
//!
//! ```no_run
//! use http_reader_at::*;
//!
//! # #[cfg(feature = "reqwest-sync")]
//! # fn read() -> Result<()> {
//! let reader = HttpReader::from_url(
//!     "https://flatgeobuf.org/test/data/countries.fgb",
//!     Some(default_store()),
//! )?;
//! let mut bytes = [0; 3];
//! let outcome = reader.read_at(&mut bytes, 0)?;
//! assert_eq!(outcome, ReadOutcome::full(3));
//! assert_eq!(&bytes, b"fgb");
//! # Ok(())
//! # }
//!
//! // Seek+Read API
//! # #[cfg(feature = "reqwest-sync")]
//! # fn seek_read() -> std::io::Result<()> {
//! use std::io::{Read, Seek, SeekFrom};
//! let reader = HttpReader::from_url("https://www.rust-lang.org/static/images/favicon-32x32.png", None)?;
//! let mut file = reader.reader();
//! file.seek(SeekFrom::Start(1))?;
//! let mut bytes = [0; 3];
//! file.read_exact(&mut bytes)?;
//! assert_eq!(&bytes, b"PNG");
//! # Ok(())
//! # }
//! ```

mod buffered_range_client;
pub mod content_range;
mod error;
mod limited_store;
mod metadata;
mod range_client;
mod read_at;
mod reader_at;
#[cfg(feature = "reqwest-sync")]
mod reqwest_client;
mod store;
#[cfg(feature = "ureq-sync")]
mod ureq_client;

pub use buffered_range_client::{BufferedReaderAt, DEFAULT_MIN_REQ_SIZE};
pub use content_range::{parse_content_range, ContentRange, ContentRangeError};
pub use error::*;
pub use limited_store::LimitedStore;
pub use metadata::{etag_strong_match, Metadata};
pub use range_client::*;
pub use read_at::{ReadAt, ReadOutcome, SectionReader};
pub use reader_at::{HttpReaderAt, ReaderStats};
pub use store::{default_store, FileStore, MemoryStore, Store, StoreConfig};

#[cfg(feature = "reqwest-sync")]
pub use crate::reqwest_client::sync::HttpReader;
#[cfg(feature = "ureq-sync")]
pub use crate::ureq_client::sync::UreqHttpReader;
