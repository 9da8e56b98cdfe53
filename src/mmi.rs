//! MMI sub-packet decoding
//!
//! Every routine here takes the complete record body: the sub-packet tag sits
//! at offset 0, two reserved bytes follow, and field data starts at offset 3.
//! The tag itself is read by the caller, which picks the routine.
//!
//! ## Usage Example
//!
//! ```rust
//! use atp_decode::mmi::{self, MmiPacket};
//!
//! let mut body = [0u8; 6];
//! body[0] = 2;
//! body[4] = 0x52;
//! match mmi::decode_packet(body[0], &body).unwrap() {
//!     MmiPacket::Status(status) => {
//!         assert_eq!(status.m_mode, 5);
//!         assert_eq!(status.m_level, 2);
//!     }
//!     other => panic!("unexpected packet {other:?}"),
//! }
//! ```

use serde::Serialize;

use crate::bytes::{correct_wraparound, i16_at, u16_at, u32_at};
use crate::error::DecodeError;
use crate::types::{BitField, MmiPacketType};

/// Minimum body length of an `MMI_DYNAMIC` packet.
pub const MMI_DYNAMIC_LEN: usize = 30;
/// Minimum body length of an `MMI_STATUS` packet.
pub const MMI_STATUS_LEN: usize = 6;

const DRIVER_MESSAGE_LEN: usize = 4;
const FAILURE_REPORT_LEN: usize = 5;

/// Decoded `MMI_DYNAMIC` packet: train speed, position and supervision limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MmiDynamic {
    pub v_train: u16,
    pub a_train: i16,
    /// Train position, wraparound-corrected
    pub o_train: i64,
    /// Brake target position, wraparound-corrected
    pub o_brake_target: i64,
    pub v_target: u16,
    pub t_interven_war: u16,
    pub v_permitted: u16,
    pub v_release: u16,
    pub v_intervention: u16,
    /// 0..=15
    pub m_warning: u8,
    pub m_slip: u8,
    pub m_slide: u8,
    pub o_bcsp: u32,
}

/// Decoded `MMI_STATUS` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MmiStatus {
    pub m_adhesion: u8,
    pub m_mode: u8,
    pub m_level: u8,
    pub m_emer_brake: u8,
    pub m_service_brake: u8,
    pub m_override_eoa: u8,
    pub m_trip: u8,
    pub m_active_cabin: u8,
}

/// A decoded MMI sub-packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MmiPacket {
    Dynamic(MmiDynamic),
    Status(MmiStatus),
    DriverMessage { message_id: u8 },
    FailureReport { failure_number: u16 },
    /// Known tag without a field decoder, body kept as-is.
    Stub { packet_type: MmiPacketType, raw: Vec<u8> },
    /// Tag outside the known catalogue, body kept as-is.
    Unknown { tag: u8, raw: Vec<u8> },
}

impl MmiPacket {
    /// Legacy name of the packet, e.g. `MMI_DYNAMIC`; `None` for unknown tags.
    pub fn name(&self) -> Option<&'static str> {
        let packet_type = match self {
            MmiPacket::Dynamic(_) => MmiPacketType::Dynamic,
            MmiPacket::Status(_) => MmiPacketType::Status,
            MmiPacket::DriverMessage { .. } => MmiPacketType::DriverMessage,
            MmiPacket::FailureReport { .. } => MmiPacketType::FailureReportAtp,
            MmiPacket::Stub { packet_type, .. } => *packet_type,
            MmiPacket::Unknown { .. } => return None,
        };
        Some(packet_type.name())
    }
}

/// Decode an `MMI_DYNAMIC` body (at least 30 bytes).
pub fn decode_mmi_dynamic(body: &[u8]) -> Result<MmiDynamic, DecodeError> {
    ensure_len("MMI_DYNAMIC", body, MMI_DYNAMIC_LEN)?;

    let flags = BitField::new(body[25]);
    Ok(MmiDynamic {
        v_train: u16_at(body, 3),
        a_train: i16_at(body, 5),
        o_train: correct_wraparound(u32_at(body, 7).into()),
        o_brake_target: correct_wraparound(u32_at(body, 11).into()),
        v_target: u16_at(body, 15),
        t_interven_war: u16_at(body, 17),
        v_permitted: u16_at(body, 19),
        v_release: u16_at(body, 21),
        v_intervention: u16_at(body, 23),
        m_warning: flags.high_nibble(),
        m_slip: flags.bits(3, 3),
        m_slide: flags.bits(2, 2),
        o_bcsp: u32_at(body, 26),
    })
}

/// Decode an `MMI_STATUS` body (at least 6 bytes).
pub fn decode_mmi_status(body: &[u8]) -> Result<MmiStatus, DecodeError> {
    ensure_len("MMI_STATUS", body, MMI_STATUS_LEN)?;

    let mode_level = BitField::new(body[4]);
    let brakes = BitField::new(body[5]);
    Ok(MmiStatus {
        m_adhesion: body[3],
        m_mode: mode_level.high_nibble(),
        m_level: mode_level.low_nibble(),
        m_emer_brake: brakes.bits(7, 6),
        m_service_brake: brakes.bits(5, 4),
        m_override_eoa: brakes.bits(3, 3),
        m_trip: brakes.bits(2, 2),
        m_active_cabin: brakes.bits(1, 0),
    })
}

/// Decode a body whose sub-packet tag is `tag`.
///
/// Unrecognised tags are not an error: they produce [`MmiPacket::Unknown`]
/// carrying the body unchanged.
pub fn decode_packet(tag: u8, body: &[u8]) -> Result<MmiPacket, DecodeError> {
    let Some(packet_type) = MmiPacketType::from_tag(tag) else {
        return Ok(MmiPacket::Unknown { tag, raw: body.to_vec() });
    };

    let packet = match packet_type {
        MmiPacketType::Dynamic => MmiPacket::Dynamic(decode_mmi_dynamic(body)?),
        MmiPacketType::Status => MmiPacket::Status(decode_mmi_status(body)?),
        MmiPacketType::DriverMessage => {
            ensure_len("MMI_DRIVER_MESSAGE", body, DRIVER_MESSAGE_LEN)?;
            MmiPacket::DriverMessage { message_id: body[3] }
        }
        MmiPacketType::FailureReportAtp => {
            ensure_len("MMI_FAILURE_REPORT_ATP", body, FAILURE_REPORT_LEN)?;
            MmiPacket::FailureReport { failure_number: u16_at(body, 3) }
        }
        other => MmiPacket::Stub { packet_type: other, raw: body.to_vec() },
    };
    Ok(packet)
}

fn ensure_len(packet: &'static str, body: &[u8], needed: usize) -> Result<(), DecodeError> {
    if body.len() < needed {
        Err(DecodeError::too_short(packet, needed, body.len()))
    } else {
        Ok(())
    }
}
