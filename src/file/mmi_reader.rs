//! Header-prefixed MMI file reader
//!
//! Some legacy files store MMI packets directly: each entry is an MMI-profile
//! header ([`MmiFileHeader`]) followed by `packet_length` payload bytes, with
//! no length byte and no record-kind dispatch. The payload keeps the usual
//! three-byte prefix, so it is decoded with the same MMI routines as record
//! bodies, selected by the header's `packet_type`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::cursor::{ScanCursor, ScanStats};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::mmi::{self, MmiPacket};
use crate::record::{HEADER_LEN, MmiFileHeader};

/// One decoded entry of an MMI file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedMmi {
    pub offset: usize,
    pub header: MmiFileHeader,
    pub packet: MmiPacket,
}

/// Sequential reader over a header-prefixed MMI file.
#[derive(Debug)]
pub struct MmiFileReader {
    cursor: ScanCursor,
}

impl MmiFileReader {
    pub fn open<P: AsRef<Path>>(path: P, config: ScanConfig) -> Result<Self> {
        let path = path.as_ref();
        let data = ScanCursor::read_file(path)?;
        info!(path = %path.display(), bytes = data.len(), "Opened MMI file");
        Ok(Self { cursor: ScanCursor::new(data, path.to_path_buf(), config) })
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>, config: ScanConfig) -> Self {
        Self { cursor: ScanCursor::new(data.into(), PathBuf::from("<memory>"), config) }
    }

    /// Decode the next entry; `Ok(None)` at end of file.
    pub fn next_packet(&mut self) -> Result<Option<ScannedMmi>> {
        loop {
            let Some(remaining) = self.cursor.remaining() else {
                return Ok(None);
            };
            if remaining.len() < HEADER_LEN {
                self.cursor.trailing(HEADER_LEN)?;
                return Ok(None);
            }

            let header = match MmiFileHeader::parse(remaining) {
                Ok(header) => header,
                Err(error) => {
                    self.cursor.recover(error)?;
                    continue;
                }
            };

            let total = HEADER_LEN + usize::from(header.packet_length);
            let Some(payload) = remaining.get(HEADER_LEN..total) else {
                self.cursor.trailing(total)?;
                return Ok(None);
            };

            match mmi::decode_packet(header.packet_type, payload) {
                Ok(packet) => {
                    let offset = self.cursor.accept(total);
                    return Ok(Some(ScannedMmi { offset, header, packet }));
                }
                Err(error) => self.cursor.recover(error)?,
            }
        }
    }

    /// Decode every remaining entry.
    pub fn read_all(&mut self) -> Result<Vec<ScannedMmi>> {
        let mut packets = Vec::new();
        while let Some(packet) = self.next_packet()? {
            packets.push(packet);
        }
        debug!(stats = ?self.stats(), "MMI file scan finished");
        Ok(packets)
    }

    pub fn stats(&self) -> ScanStats {
        self.cursor.stats()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn path(&self) -> &Path {
        self.cursor.path()
    }
}

impl Iterator for MmiFileReader {
    type Item = Result<ScannedMmi>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}
