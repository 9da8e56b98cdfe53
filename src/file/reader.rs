//! Record file reader
//!
//! A record file is a plain concatenation of `header + length + body`
//! records, read until end of file. The whole file is loaded into memory and
//! decoded in byte order so BTM fragments are reassembled in arrival order.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use atp_decode::config::ScanConfig;
//! use atp_decode::file::RecordFileReader;
//!
//! fn scan() -> atp_decode::Result<()> {
//!     let mut reader = RecordFileReader::open("ru_20240315.dat", ScanConfig::default())?;
//!     while let Some(scanned) = reader.next_record()? {
//!         println!("{:>8}  {}", scanned.offset, scanned.record.description());
//!     }
//!     println!("{:?}", reader.stats());
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::cursor::{ScanCursor, ScanStats};
use crate::config::ScanConfig;
use crate::error::{DecodeError, Result};
use crate::record::{DecodedRecord, RECORD_PREFIX_LEN, RecordDispatcher, frame_len};

/// A decoded record and its byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedRecord {
    pub offset: usize,
    pub record: DecodedRecord,
}

/// Sequential reader over a record file.
#[derive(Debug)]
pub struct RecordFileReader {
    cursor: ScanCursor,
    dispatcher: RecordDispatcher,
}

impl RecordFileReader {
    /// Open a record file.
    pub fn open<P: AsRef<Path>>(path: P, config: ScanConfig) -> Result<Self> {
        let path = path.as_ref();
        let data = ScanCursor::read_file(path)?;
        info!(path = %path.display(), bytes = data.len(), "Opened record file");
        Ok(Self::with_path(data, path.to_path_buf(), config))
    }

    /// Scan an in-memory buffer.
    pub fn from_bytes(data: impl Into<Vec<u8>>, config: ScanConfig) -> Self {
        Self::with_path(data.into(), PathBuf::from("<memory>"), config)
    }

    fn with_path(data: Vec<u8>, path: PathBuf, config: ScanConfig) -> Self {
        Self { cursor: ScanCursor::new(data, path, config), dispatcher: RecordDispatcher::new() }
    }

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` at end of file. Decode failures are handled by the
    /// configured error policy: `resync` skips one byte and keeps scanning,
    /// `abort` returns the error and ends the scan.
    pub fn next_record(&mut self) -> Result<Option<ScannedRecord>> {
        loop {
            let Some(remaining) = self.cursor.remaining() else {
                return Ok(None);
            };

            let Some(total) = frame_len(remaining) else {
                self.cursor.trailing(RECORD_PREFIX_LEN)?;
                return Ok(None);
            };
            let available = remaining.len();

            match self.dispatcher.decode(remaining) {
                Ok(record) => {
                    let offset = self.cursor.accept(total);
                    return Ok(Some(ScannedRecord { offset, record }));
                }
                // Valid header whose body runs past the end of the file.
                Err(DecodeError::Truncated { .. }) if total > available => {
                    self.cursor.trailing(total)?;
                    return Ok(None);
                }
                Err(error) => self.cursor.recover(error)?,
            }
        }
    }

    /// Decode every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<ScannedRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        debug!(stats = ?self.stats(), "Record file scan finished");
        Ok(records)
    }

    pub fn stats(&self) -> ScanStats {
        self.cursor.stats()
    }

    /// Byte offset of the next record.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Total file length in bytes.
    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.len() == 0
    }

    pub fn path(&self) -> &Path {
        self.cursor.path()
    }

    /// The dispatcher, for inspecting pending BTM telegrams.
    pub fn dispatcher(&self) -> &RecordDispatcher {
        &self.dispatcher
    }
}

impl Iterator for RecordFileReader {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorPolicy;
    use crate::error::Error;
    use crate::record::Payload;
    use crate::test_utils::{expected_telegram, record, sample_record_file};

    #[test]
    fn scans_sample_file_in_order() {
        let mut reader = RecordFileReader::from_bytes(sample_record_file(), ScanConfig::default());
        let records = reader.read_all().unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[1].offset, 17);
        assert_eq!(records[0].record.payload, Payload::Status(5));

        let completed: Vec<_> = records
            .iter()
            .filter_map(|r| match &r.record.payload {
                Payload::Telegram { telegram: Some(t), .. } => Some(t.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].data, expected_telegram(7));

        assert_eq!(records[7].record.payload, Payload::Button(3));
        assert_eq!(reader.stats(), ScanStats { records: 8, resyncs: 0, trailing_bytes: 0 });
        assert_eq!(reader.position(), reader.len());
    }

    #[test]
    fn resyncs_past_garbage() {
        let mut data = vec![0xFF, 0xFF, 0xFF];
        data.extend(record(216, &[1]));
        let mut reader = RecordFileReader::from_bytes(data, ScanConfig::default());
        let records = reader.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 3);
        assert_eq!(reader.stats().resyncs, 3);
    }

    #[test]
    fn abort_policy_returns_first_error() {
        let mut data = vec![0x01; 3];
        data.extend(record(216, &[1]));
        let config = ScanConfig::default().with_policy(ErrorPolicy::Abort);
        let mut reader = RecordFileReader::from_bytes(data, config);
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::InvalidTimestamp { .. })));
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn error_limit_stops_scan() {
        let data = vec![0xFF; 64];
        let config = ScanConfig::default().with_max_errors(2);
        let mut reader = RecordFileReader::from_bytes(data, config);
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, Error::TooManyErrors { limit: 2, offset: 2 }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn trailing_partial_record_ends_scan() {
        let mut data = record(216, &[1]);
        let tail = record(216, &[1, 2, 3]);
        data.extend_from_slice(&tail[..tail.len() - 2]);

        let mut reader = RecordFileReader::from_bytes(data.clone(), ScanConfig::default());
        assert_eq!(reader.read_all().unwrap().len(), 1);
        assert_eq!(reader.stats().trailing_bytes, tail.len() - 2);

        let config = ScanConfig::default().with_policy(ErrorPolicy::Abort);
        let mut reader = RecordFileReader::from_bytes(data, config);
        assert!(reader.next_record().unwrap().is_some());
        let err = reader.next_record().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::Truncated { context: "trailing record", needed: 19, .. })
        ));
    }

    #[test]
    fn iterator_yields_results() {
        let reader = RecordFileReader::from_bytes(sample_record_file(), ScanConfig::default());
        let descriptions: Vec<String> =
            reader.map(|r| r.map(|s| s.record.description())).collect::<Result<_>>().unwrap();
        assert_eq!(descriptions.first().map(String::as_str), Some("STATUS ATP"));
        assert_eq!(descriptions.last().map(String::as_str), Some("MVB LOG TYPE BUTTON EVENT"));
    }

    #[test]
    fn empty_input_has_no_records() {
        let mut reader = RecordFileReader::from_bytes(Vec::new(), ScanConfig::default());
        assert!(reader.is_empty());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = RecordFileReader::open("/nonexistent/ru.dat", ScanConfig::default()).unwrap_err();
        assert!(matches!(err, Error::File { .. }));
    }
}
