//! Top-level record dispatch
//!
//! A record is `header (15 bytes) + body length (1 byte) + body`. The
//! dispatcher parses the header, slices the body, and routes it on the record
//! kind to the MMI codec, the BTM reassembler, or one of the single-byte
//! decoders. Unknown kinds are data, not errors.

use serde::Serialize;
use tracing::trace;

use super::header::{HEADER_LEN, RecordHeader};
use crate::btm::BtmReassembler;
use crate::bytes::{correct_wraparound, u16_at, u32_at};
use crate::error::DecodeError;
use crate::mmi::{self, MmiPacket};
use crate::types::{RecordKind, Route, Telegram};

/// Bytes preceding the body: header plus the length byte.
pub const RECORD_PREFIX_LEN: usize = HEADER_LEN + 1;

/// Total length of the record starting at `data[0]`, once its length byte is visible.
///
/// Returns `None` while fewer than [`RECORD_PREFIX_LEN`] bytes are available.
pub fn frame_len(data: &[u8]) -> Option<usize> {
    data.get(HEADER_LEN).map(|&len| RECORD_PREFIX_LEN + usize::from(len))
}

/// Kind-specific content of a decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Payload {
    /// ATP or MMI record carrying an MMI sub-packet.
    Mmi(MmiPacket),
    /// BTM fragment; `telegram` is set when this fragment completed one.
    Telegram { ordinal: u8, telegram: Option<Telegram> },
    Status(u8),
    Button(u8),
    /// Position (wraparound-corrected) and speed at the time the ATP went down.
    AtpDown { o_train: i64, v_train: u16 },
    /// VDX telemetry without a defined structure.
    Unclassified,
    /// Record kind without a decoder, body kept as-is.
    Unknown { kind: u8, raw: Vec<u8> },
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedRecord {
    pub header: RecordHeader,
    pub payload: Payload,
}

impl DecodedRecord {
    /// Legacy description string for the record.
    ///
    /// ```rust
    /// use atp_decode::record::RecordDispatcher;
    ///
    /// let mut raw = vec![216, 24, 3, 15, 8, 30, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    /// raw.extend_from_slice(&[1, 5]);
    /// let record = RecordDispatcher::new().decode(&raw)?;
    /// assert_eq!(record.description(), "MVB LOG TYPE BUTTON EVENT");
    /// # Ok::<(), atp_decode::DecodeError>(())
    /// ```
    pub fn description(&self) -> String {
        let kind = self.header.record_kind;
        if let Payload::Mmi(packet) = &self.payload {
            if let Some(name) = packet.name() {
                return name.to_string();
            }
        }
        match kind.name() {
            Some(name) => name.to_string(),
            None => format!("no handle Record Type:{}", u8::from(kind)),
        }
    }
}

/// Decodes records one at a time, keeping BTM reassembly state between calls.
///
/// Records must be offered in stream order so that BTM slot bookkeeping
/// reflects real arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordDispatcher {
    btm: BtmReassembler,
}

impl RecordDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing reassembler.
    pub fn with_reassembler(btm: BtmReassembler) -> Self {
        Self { btm }
    }

    /// Decode the record starting at `raw[0]`.
    ///
    /// Bytes after the declared body are ignored.
    pub fn decode(&mut self, raw: &[u8]) -> Result<DecodedRecord, DecodeError> {
        let header = RecordHeader::parse(raw)?;

        let total = frame_len(raw)
            .ok_or_else(|| DecodeError::truncated("record length", RECORD_PREFIX_LEN, raw.len()))?;
        let body = raw
            .get(RECORD_PREFIX_LEN..total)
            .ok_or_else(|| DecodeError::truncated("record body", total, raw.len()))?;

        trace!(kind = u8::from(header.record_kind), body_len = body.len(), "Dispatching record");
        let payload = self.route(header.record_kind, body)?;
        Ok(DecodedRecord { header, payload })
    }

    fn route(&mut self, kind: RecordKind, body: &[u8]) -> Result<Payload, DecodeError> {
        let payload = match kind.route() {
            Route::Mmi => {
                let tag = *body.first().ok_or(DecodeError::too_short("MMI", 1, 0))?;
                Payload::Mmi(mmi::decode_packet(tag, body)?)
            }
            Route::Status => Payload::Status(single_byte("status", body)?),
            Route::Btm(ordinal) => {
                let telegram = self.btm.add_fragment(body, ordinal)?;
                Payload::Telegram { ordinal, telegram }
            }
            Route::Button => Payload::Button(single_byte("button event", body)?),
            Route::AtpDown => atp_down(body)?,
            Route::Unclassified => Payload::Unclassified,
            Route::Unknown => Payload::Unknown { kind: u8::from(kind), raw: body.to_vec() },
        };
        Ok(payload)
    }

    /// The reassembler holding in-flight BTM telegrams.
    pub fn btm(&self) -> &BtmReassembler {
        &self.btm
    }

    pub fn btm_mut(&mut self) -> &mut BtmReassembler {
        &mut self.btm
    }

    /// Drop all reassembly state, e.g. when a file or mission ends.
    pub fn reset(&mut self) {
        self.btm.reset();
    }
}

fn single_byte(packet: &'static str, body: &[u8]) -> Result<u8, DecodeError> {
    body.first().copied().ok_or(DecodeError::too_short(packet, 1, 0))
}

/// Body bytes needed by an ATP DOWN record.
const ATP_DOWN_LEN: usize = 8;

/// `o_train` sits at bytes 0..4, `v_train` at bytes 6..8.
fn atp_down(body: &[u8]) -> Result<Payload, DecodeError> {
    if body.len() < ATP_DOWN_LEN {
        return Err(DecodeError::too_short("ATP DOWN", ATP_DOWN_LEN, body.len()));
    }
    Ok(Payload::AtpDown {
        o_train: correct_wraparound(u32_at(body, 0).into()),
        v_train: u16_at(body, 6),
    })
}
