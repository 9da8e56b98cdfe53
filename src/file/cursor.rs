//! Shared scanning state for the file readers

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ErrorPolicy, ScanConfig};
use crate::error::{DecodeError, Error, Result};

/// Counters reported at the end of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Records decoded successfully
    pub records: usize,
    /// One-byte resynchronisations after decode errors
    pub resyncs: usize,
    /// Bytes left over at the end that could not hold a record
    pub trailing_bytes: usize,
}

/// Byte buffer plus position, policy and counters.
#[derive(Debug)]
pub(crate) struct ScanCursor {
    data: Vec<u8>,
    position: usize,
    path: PathBuf,
    config: ScanConfig,
    stats: ScanStats,
    finished: bool,
}

impl ScanCursor {
    pub(crate) fn new(data: Vec<u8>, path: PathBuf, config: ScanConfig) -> Self {
        Self { data, position: 0, path, config, stats: ScanStats::default(), finished: false }
    }

    /// Read a whole file into memory.
    pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::file_error(path.to_path_buf(), e))
    }

    /// Unread bytes, or `None` once the scan has ended.
    pub(crate) fn remaining(&self) -> Option<&[u8]> {
        if self.finished || self.position >= self.data.len() {
            return None;
        }
        Some(&self.data[self.position..])
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Consume one decoded frame of `len` bytes, returning its offset.
    pub(crate) fn accept(&mut self, len: usize) -> usize {
        let offset = self.position;
        self.position += len;
        self.stats.records += 1;
        offset
    }

    /// End the scan on a tail too short to hold the next frame.
    pub(crate) fn trailing(&mut self, needed: usize) -> Result<()> {
        let available = self.data.len() - self.position;
        self.finished = true;
        self.stats.trailing_bytes = available;

        match self.config.on_error {
            ErrorPolicy::Resync => {
                warn!(
                    path = %self.path.display(),
                    offset = self.position,
                    available,
                    "Ignoring trailing bytes too short for a record"
                );
                Ok(())
            }
            ErrorPolicy::Abort => {
                Err(DecodeError::truncated("trailing record", needed, available).into())
            }
        }
    }

    /// Apply the error policy to a decode failure at the current position.
    ///
    /// Under `resync` this skips one byte and returns `Ok`; the caller retries.
    pub(crate) fn recover(&mut self, error: DecodeError) -> Result<()> {
        let offset = self.position;
        if self.config.on_error == ErrorPolicy::Abort {
            self.finished = true;
            return Err(error.into());
        }

        self.stats.resyncs += 1;
        if let Some(limit) = self.config.max_errors {
            if self.stats.resyncs > limit {
                self.finished = true;
                return Err(Error::TooManyErrors { limit, offset });
            }
        }

        debug!(offset, error = %error, "Resynchronising one byte past decode error");
        self.position += 1;
        Ok(())
    }
}
