//! Builders for synthetic records, fragments and files
//!
//! There are no binary recordings in the repository, so tests and benchmarks
//! build their input bytes here.

#![cfg(any(test, feature = "benchmark"))]

use crate::btm::{FRAGMENT_LEN, PAYLOAD_LEN};
use crate::mmi::MMI_DYNAMIC_LEN;
use crate::record::HEADER_LEN;
use crate::types::TELEGRAM_LEN;

/// Timestamp bytes used by every synthetic header: 2024-03-15 08:30:00.
pub const TIMESTAMP: [u8; 6] = [24, 3, 15, 8, 30, 0];

/// Build a record-profile header.
pub fn header(kind: u8, location: u32, speed: i16) -> [u8; HEADER_LEN] {
    let mut raw = [0u8; HEADER_LEN];
    raw[0] = kind;
    raw[1..7].copy_from_slice(&TIMESTAMP);
    raw[7..11].copy_from_slice(&location.to_be_bytes());
    raw[13..15].copy_from_slice(&speed.to_be_bytes());
    raw
}

/// Build a complete record with a default location and speed.
///
/// # Panics
///
/// Panics if `body` is longer than 255 bytes.
pub fn record(kind: u8, body: &[u8]) -> Vec<u8> {
    record_at(kind, 1_000, 80, body)
}

/// Build a complete record with the given location and speed.
pub fn record_at(kind: u8, location: u32, speed: i16, body: &[u8]) -> Vec<u8> {
    let len = u8::try_from(body.len()).expect("record body fits in one length byte");
    let mut raw = Vec::with_capacity(HEADER_LEN + 1 + body.len());
    raw.extend_from_slice(&header(kind, location, speed));
    raw.push(len);
    raw.extend_from_slice(body);
    raw
}

/// Deterministic payload byte for a fragment, distinct per sequence and ordinal.
fn payload_byte(sequence: u8, ordinal: u8, index: usize) -> u8 {
    sequence.wrapping_mul(31) ^ ordinal.wrapping_mul(53) ^ (index as u8)
}

/// BTM fragment `[sequence, payload; 25]` for `ordinal`.
pub fn btm_fragment(sequence: u8, ordinal: u8) -> [u8; FRAGMENT_LEN] {
    let mut fragment = [0u8; FRAGMENT_LEN];
    fragment[0] = sequence;
    for (index, byte) in fragment[1..].iter_mut().enumerate() {
        *byte = payload_byte(sequence, ordinal, index);
    }
    fragment
}

/// The telegram that the five fragments from [`btm_fragment`] assemble into.
pub fn expected_telegram(sequence: u8) -> [u8; TELEGRAM_LEN] {
    let mut telegram = [0u8; TELEGRAM_LEN];
    for (offset, index) in (PAYLOAD_LEN - 4..PAYLOAD_LEN).enumerate() {
        telegram[offset] = payload_byte(sequence, 1, index);
    }
    for ordinal in 2u8..=5 {
        let start = 4 + PAYLOAD_LEN * usize::from(ordinal - 2);
        for index in 0..PAYLOAD_LEN {
            telegram[start + index] = payload_byte(sequence, ordinal, index);
        }
    }
    telegram
}

/// Five BTM records (kinds 43..=47) carrying one telegram, in ordinal order.
pub fn btm_records(sequence: u8) -> Vec<Vec<u8>> {
    (1u8..=5).map(|ordinal| record(42 + ordinal, &btm_fragment(sequence, ordinal))).collect()
}

/// `MMI_DYNAMIC` body with v_train 120, a_train -10 and warning byte 0xAC.
pub fn mmi_dynamic_body() -> Vec<u8> {
    let mut body = vec![0u8; MMI_DYNAMIC_LEN];
    body[0] = 1;
    body[3..5].copy_from_slice(&120u16.to_be_bytes());
    body[5..7].copy_from_slice(&(-10i16).to_be_bytes());
    body[7..11].copy_from_slice(&1_000_002_000u32.to_be_bytes());
    body[11..15].copy_from_slice(&5_000u32.to_be_bytes());
    body[15..17].copy_from_slice(&80u16.to_be_bytes());
    body[19..21].copy_from_slice(&160u16.to_be_bytes());
    body[25] = 0xAC;
    body[26..30].copy_from_slice(&42u32.to_be_bytes());
    body
}

/// One record of a header-prefixed MMI file: header followed directly by `payload`.
pub fn mmi_file_record(
    packet_type: u8,
    speed_decikmh: i16,
    location: i32,
    payload: &[u8],
) -> Vec<u8> {
    let len = u16::try_from(payload.len()).expect("MMI payload length fits in u16");
    let mut raw = Vec::with_capacity(HEADER_LEN + payload.len());
    raw.extend_from_slice(&TIMESTAMP);
    raw.extend_from_slice(&speed_decikmh.to_be_bytes());
    raw.extend_from_slice(&location.to_be_bytes());
    raw.extend_from_slice(&len.to_be_bytes());
    raw.push(packet_type);
    raw.extend_from_slice(payload);
    raw
}

/// A mixed record file: status, MMI dynamic, one full BTM telegram, button event.
pub fn sample_record_file() -> Vec<u8> {
    let mut file = Vec::new();
    file.extend(record(2, &[5]));
    file.extend(record(1, &mmi_dynamic_body()));
    for raw in btm_records(7) {
        file.extend(raw);
    }
    file.extend(record(216, &[3]));
    file
}
