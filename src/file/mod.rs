//! Synchronous file scanners for the two on-disk formats.
//!
//! - [`RecordFileReader`] reads record files (`header + length + body`)
//! - [`MmiFileReader`] reads header-prefixed MMI files
//!
//! Both load the file into memory, decode in byte order and apply the
//! [`ErrorPolicy`](crate::config::ErrorPolicy) from their [`ScanConfig`].

mod cursor;
mod mmi_reader;
mod reader;

use std::path::Path;

use serde::Serialize;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::record::HeaderProfile;

pub use cursor::ScanStats;
pub use mmi_reader::{MmiFileReader, ScannedMmi};
pub use reader::{RecordFileReader, ScannedRecord};

/// One decoded item from either file format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Scanned {
    Record(ScannedRecord),
    Mmi(ScannedMmi),
}

impl Scanned {
    /// Byte offset of the item in its source.
    pub fn offset(&self) -> usize {
        match self {
            Scanned::Record(record) => record.offset,
            Scanned::Mmi(mmi) => mmi.offset,
        }
    }

    /// Human-readable description, matching the legacy decoder output.
    pub fn description(&self) -> String {
        match self {
            Scanned::Record(record) => record.record.description(),
            Scanned::Mmi(mmi) => mmi
                .packet
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("MMI packet type:{}", mmi.header.packet_type)),
        }
    }
}

impl From<ScannedRecord> for Scanned {
    fn from(record: ScannedRecord) -> Self {
        Scanned::Record(record)
    }
}

impl From<ScannedMmi> for Scanned {
    fn from(mmi: ScannedMmi) -> Self {
        Scanned::Mmi(mmi)
    }
}

/// Either reader, chosen by the header layout of [`ScanConfig::profile`].
#[derive(Debug)]
pub enum FileReader {
    Record(RecordFileReader),
    Mmi(MmiFileReader),
}

impl FileReader {
    pub fn open<P: AsRef<Path>>(path: P, config: ScanConfig) -> Result<Self> {
        Ok(match config.profile.header_profile() {
            HeaderProfile::Record => FileReader::Record(RecordFileReader::open(path, config)?),
            HeaderProfile::MmiFile => FileReader::Mmi(MmiFileReader::open(path, config)?),
        })
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>, config: ScanConfig) -> Self {
        match config.profile.header_profile() {
            HeaderProfile::Record => FileReader::Record(RecordFileReader::from_bytes(data, config)),
            HeaderProfile::MmiFile => FileReader::Mmi(MmiFileReader::from_bytes(data, config)),
        }
    }

    /// Decode the next item in the file.
    pub fn next_item(&mut self) -> Result<Option<Scanned>> {
        match self {
            FileReader::Record(reader) => Ok(reader.next_record()?.map(Scanned::from)),
            FileReader::Mmi(reader) => Ok(reader.next_packet()?.map(Scanned::from)),
        }
    }

    pub fn stats(&self) -> ScanStats {
        match self {
            FileReader::Record(reader) => reader.stats(),
            FileReader::Mmi(reader) => reader.stats(),
        }
    }
}
