use crate::error::{HttpError, Result};
use crate::read_at::{ReadAt, ReadOutcome, SectionReader};
use crate::store::Store;
use log::{debug, info};
use std::io::{self, Read};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    None,
    Primary,
    Secondary,
}

/// Stores to a primary store up to a size limit.
///
/// If the limit is exceeded, everything is moved over to the secondary
/// store. Without a secondary store, exceeding the limit is an error.
/// Limited stores nest, so `memory -> file -> error` is two of them.
pub struct LimitedStore {
    primary: Box<dyn Store>,
    limit: u64,
    secondary: Option<Box<dyn Store>>,
    active: Active,
}

impl LimitedStore {
    pub fn new(primary: Box<dyn Store>, limit: u64, secondary: Option<Box<dyn Store>>) -> Self {
        LimitedStore {
            primary,
            limit,
            secondary,
            active: Active::None,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Whether the data ended up in the secondary store.
    pub fn is_spilled(&self) -> bool {
        self.active == Active::Secondary
    }

    fn active_store(&self) -> Option<&dyn Store> {
        match self.active {
            Active::None => None,
            Active::Primary => Some(self.primary.as_ref()),
            Active::Secondary => self.secondary.as_deref(),
        }
    }

    fn close_active(&mut self) -> Result<()> {
        let active = std::mem::replace(&mut self.active, Active::None);
        match active {
            Active::None => Ok(()),
            Active::Primary => self.primary.close(),
            Active::Secondary => match self.secondary.as_mut() {
                Some(secondary) => secondary.close(),
                None => Ok(()),
            },
        }
    }
}

impl ReadAt for LimitedStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        match self.active_store() {
            Some(store) => store.read_at(buf, offset),
            None if buf.is_empty() => Ok(ReadOutcome::full(0)),
            None => Ok(ReadOutcome::eof(0)),
        }
    }
}

impl Store for LimitedStore {
    fn fill(&mut self, src: &mut dyn Read) -> Result<u64> {
        self.close_active()?;

        let mut bounded = Read::take(&mut *src, self.limit);
        let n = self.primary.fill(&mut bounded)?;
        let mut probe = [0u8; 1];
        let extra = loop {
            match src.read(&mut probe) {
                Ok(extra) => break extra,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.primary.close()?;
                    return Err(e.into());
                }
            }
        };
        if extra == 0 {
            self.active = Active::Primary;
            return Ok(n);
        }

        let secondary = match self.secondary.as_mut() {
            Some(secondary) => secondary,
            None => {
                debug!("store limit of {} bytes reached", self.limit);
                self.primary.close()?;
                return Err(HttpError::StoreLimitExceeded { limit: self.limit });
            }
        };
        info!(
            "store limit of {} bytes reached, moving data to secondary store",
            self.limit
        );
        // Replay what the primary already holds instead of refetching it
        let mut replay = SectionReader::new(self.primary.as_ref(), 0, n)
            .chain(&probe[..extra])
            .chain(src);
        let result = secondary.fill(&mut replay);
        self.primary.close()?;
        match result {
            Ok(n) => {
                self.active = Active::Secondary;
                Ok(n)
            }
            Err(e) => {
                secondary.close()?;
                Err(e)
            }
        }
    }

    fn size(&self) -> u64 {
        self.active_store().map_or(0, |store| store.size())
    }

    fn close(&mut self) -> Result<()> {
        self.close_active()
    }
}
