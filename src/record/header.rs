//! Fixed 15-byte record headers
//!
//! Two on-disk header layouts exist. Both start with six timestamp bytes and
//! carry a wraparound-corrected location, but they disagree on where the
//! timestamp sits and on the unit of the speed field:
//!
//! | profile | kind | timestamp | location | speed |
//! |---|---|---|---|---|
//! | [`HeaderProfile::Record`] | byte 0 | 1..=6 | 7..=10 unsigned | 13..=14 signed, raw |
//! | [`HeaderProfile::MmiFile`] | none | 0..=5 | 8..=11 signed | 6..=7 signed, x0.1 km/h |
//!
//! Which convention is authoritative for speed has not been settled, so both
//! are kept as separate profiles selected by the file family being read.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::bytes::{correct_wraparound, signed, unsigned};
use crate::error::DecodeError;
use crate::types::RecordKind;

/// Length of every record header in bytes.
pub const HEADER_LEN: usize = 15;

/// Selects which header layout a byte source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderProfile {
    /// RU record header, speed as a raw signed integer
    Record,
    /// MMI file header, speed as signed int16 scaled by 0.1
    MmiFile,
}

/// Header of an RU record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordHeader {
    pub record_kind: RecordKind,
    pub timestamp: NaiveDateTime,
    /// Wraparound-corrected location
    pub location: i64,
    /// Raw speed, unscaled
    pub speed: i32,
}

impl RecordHeader {
    /// Parse the first [`HEADER_LEN`] bytes of `data`.
    ///
    /// ```rust
    /// use atp_decode::record::RecordHeader;
    /// use atp_decode::types::RecordKind;
    ///
    /// let raw = [216, 24, 3, 15, 8, 30, 0, 0x3B, 0x9A, 0xCA, 0x64, 0, 0, 0xFF, 0x9C];
    /// let header = RecordHeader::parse(&raw).unwrap();
    /// assert_eq!(header.record_kind, RecordKind::ButtonEvent);
    /// assert_eq!(header.location, 100);
    /// assert_eq!(header.speed, -100);
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_LEN {
            return Err(DecodeError::truncated("record header", HEADER_LEN, data.len()));
        }

        let timestamp = parse_timestamp(&data[1..7])?;
        let location = correct_wraparound(unsigned(&data[7..11]) as i64);
        let speed = signed(&data[13..15]) as i32;

        Ok(Self { record_kind: RecordKind::from(data[0]), timestamp, location, speed })
    }
}

/// Header of a record in a header-prefixed MMI file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MmiFileHeader {
    pub timestamp: NaiveDateTime,
    /// Speed in km/h
    pub speed_kmh: f64,
    /// Wraparound-corrected location
    pub location: i64,
    /// Number of payload bytes following the header
    pub packet_length: u16,
    /// MMI sub-packet tag of the payload
    pub packet_type: u8,
}

impl MmiFileHeader {
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_LEN {
            return Err(DecodeError::truncated("MMI file header", HEADER_LEN, data.len()));
        }

        let timestamp = parse_timestamp(&data[0..6])?;
        let speed_kmh = signed(&data[6..8]) as f64 * 0.1;
        let location = correct_wraparound(signed(&data[8..12]));
        let packet_length = unsigned(&data[12..14]) as u16;

        Ok(Self { timestamp, speed_kmh, location, packet_length, packet_type: data[14] })
    }
}

/// Build a civil date-time from `[YY, MM, DD, hh, mm, ss]`, year offset by 2000.
fn parse_timestamp(raw: &[u8]) -> Result<NaiveDateTime, DecodeError> {
    let [yy, month, day, hour, minute, second] = [raw[0], raw[1], raw[2], raw[3], raw[4], raw[5]];

    check_range("month", month, 1, 12)?;
    check_range("day", day, 1, 31)?;
    check_range("hour", hour, 0, 23)?;
    check_range("minute", minute, 0, 59)?;
    check_range("second", second, 0, 59)?;

    let year = 2000 + i32::from(yy);
    let date = NaiveDate::from_ymd_opt(year, month.into(), day.into())
        .ok_or(DecodeError::InvalidTimestamp { field: "day", value: day.into() })?;
    date.and_hms_opt(hour.into(), minute.into(), second.into())
        .ok_or(DecodeError::InvalidTimestamp { field: "second", value: second.into() })
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), DecodeError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DecodeError::InvalidTimestamp { field, value: value.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::WRAPAROUND_THRESHOLD;
    use proptest::prelude::*;

    fn record_header(location: u32, speed: i16) -> [u8; HEADER_LEN] {
        let mut raw = [0u8; HEADER_LEN];
        raw[0] = 1;
        raw[1..7].copy_from_slice(&[24, 3, 15, 8, 30, 0]);
        raw[7..11].copy_from_slice(&location.to_be_bytes());
        raw[13..15].copy_from_slice(&speed.to_be_bytes());
        raw
    }

    #[test]
    fn parses_record_header_fields() {
        let header = RecordHeader::parse(&record_header(123_456, 85)).unwrap();
        assert_eq!(header.record_kind, RecordKind::Atp);
        assert_eq!(
            header.timestamp,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(8, 30, 0).unwrap()
        );
        assert_eq!(header.location, 123_456);
        assert_eq!(header.speed, 85);
    }

    #[test]
    fn location_wraparound_is_corrected() {
        assert_eq!(RecordHeader::parse(&record_header(1_000_000_100, 0)).unwrap().location, 100);
        assert_eq!(
            RecordHeader::parse(&record_header(999_999_999, 0)).unwrap().location,
            999_999_999
        );
        assert_eq!(RecordHeader::parse(&record_header(1_000_000_000, 0)).unwrap().location, 0);
    }

    #[test]
    fn reserved_bytes_are_ignored() {
        let mut raw = record_header(42, -3);
        raw[11] = 0xDE;
        raw[12] = 0xAD;
        let header = RecordHeader::parse(&raw).unwrap();
        assert_eq!(header.location, 42);
        assert_eq!(header.speed, -3);
    }

    #[test]
    fn short_header_is_truncated() {
        for len in 0..HEADER_LEN {
            let raw = record_header(0, 0);
            assert_eq!(
                RecordHeader::parse(&raw[..len]),
                Err(DecodeError::truncated("record header", HEADER_LEN, len))
            );
        }
    }

    #[test]
    fn out_of_range_components_are_rejected() {
        let cases = [(2, 0, "month"), (2, 13, "month"), (3, 0, "day"), (3, 32, "day")];
        for (index, value, field) in cases {
            let mut raw = record_header(0, 0);
            raw[index] = value;
            assert_eq!(
                RecordHeader::parse(&raw),
                Err(DecodeError::InvalidTimestamp { field, value: value.into() })
            );
        }

        let mut raw = record_header(0, 0);
        raw[4] = 24;
        assert!(matches!(
            RecordHeader::parse(&raw),
            Err(DecodeError::InvalidTimestamp { field: "hour", value: 24 })
        ));
        raw[4] = 0;
        raw[6] = 60;
        assert!(matches!(
            RecordHeader::parse(&raw),
            Err(DecodeError::InvalidTimestamp { field: "second", value: 60 })
        ));
    }

    #[test]
    fn calendar_invalid_date_is_rejected() {
        let mut raw = record_header(0, 0);
        raw[2] = 2;
        raw[3] = 31;
        assert_eq!(
            RecordHeader::parse(&raw),
            Err(DecodeError::InvalidTimestamp { field: "day", value: 31 })
        );
    }

    #[test]
    fn parses_mmi_file_header() {
        let mut raw = [0u8; HEADER_LEN];
        raw[0..6].copy_from_slice(&[23, 12, 31, 23, 59, 59]);
        raw[6..8].copy_from_slice(&(-125i16).to_be_bytes());
        raw[8..12].copy_from_slice(&1_000_000_250i32.to_be_bytes());
        raw[12..14].copy_from_slice(&30u16.to_be_bytes());
        raw[14] = 1;

        let header = MmiFileHeader::parse(&raw).unwrap();
        assert_eq!(
            header.timestamp,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap().and_hms_opt(23, 59, 59).unwrap()
        );
        assert!((header.speed_kmh - -12.5).abs() < 1e-9);
        assert_eq!(header.location, 250);
        assert_eq!(header.packet_length, 30);
        assert_eq!(header.packet_type, 1);
    }

    #[test]
    fn mmi_file_header_keeps_negative_location() {
        let mut raw = [0u8; HEADER_LEN];
        raw[0..6].copy_from_slice(&[23, 1, 1, 0, 0, 0]);
        raw[8..12].copy_from_slice(&(-500i32).to_be_bytes());
        assert_eq!(MmiFileHeader::parse(&raw).unwrap().location, -500);
        assert!(matches!(
            MmiFileHeader::parse(&raw[..10]),
            Err(DecodeError::Truncated { needed: HEADER_LEN, available: 10, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_corrected_location_below_threshold(raw in 0u32..2_000_000_000) {
            let header = RecordHeader::parse(&record_header(raw, 0)).unwrap();
            prop_assert!((0..WRAPAROUND_THRESHOLD).contains(&header.location));
        }

        #[test]
        fn prop_arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..32)) {
            let _ = RecordHeader::parse(&data);
            let _ = MmiFileHeader::parse(&data);
        }

        #[test]
        fn prop_speed_is_twos_complement(speed in any::<i16>()) {
            let header = RecordHeader::parse(&record_header(0, speed)).unwrap();
            prop_assert_eq!(header.speed, i32::from(speed));
        }
    }
}
