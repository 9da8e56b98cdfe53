//! Big-endian integer extraction used by every decoder in the crate.
//!
//! These are internal primitives: callers slice exactly the bytes a field
//! occupies after checking the enclosing buffer length, so a wrong-length slice
//! is a programming error and panics rather than returning a `Result`.

/// Threshold above which legacy encoders store positions offset by one billion.
pub const WRAPAROUND_THRESHOLD: i64 = 1_000_000_000;

/// Big-endian concatenation of 1 to 4 bytes, without sign extension.
pub fn unsigned(bytes: &[u8]) -> u64 {
    assert!(
        (1..=4).contains(&bytes.len()),
        "unsigned() takes 1..=4 bytes, got {}",
        bytes.len()
    );
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Two's-complement interpretation of 2 to 4 big-endian bytes.
pub fn signed(bytes: &[u8]) -> i64 {
    assert!((2..=4).contains(&bytes.len()), "signed() takes 2..=4 bytes, got {}", bytes.len());
    let bits = 8 * bytes.len() as u32;
    let value = unsigned(bytes) as i64;
    if value >= 1 << (bits - 1) { value - (1 << bits) } else { value }
}

/// Undo the legacy encoder's position offset.
///
/// Applied exactly once: a raw value of 2,100,000,000 becomes 1,100,000,000.
pub fn correct_wraparound(raw: i64) -> i64 {
    if raw >= WRAPAROUND_THRESHOLD { raw - WRAPAROUND_THRESHOLD } else { raw }
}

/// Unsigned 16-bit field at `offset`.
pub(crate) fn u16_at(data: &[u8], offset: usize) -> u16 {
    unsigned(&data[offset..offset + 2]) as u16
}

/// Unsigned 32-bit field at `offset`.
pub(crate) fn u32_at(data: &[u8], offset: usize) -> u32 {
    unsigned(&data[offset..offset + 4]) as u32
}

/// Signed 16-bit field at `offset`.
pub(crate) fn i16_at(data: &[u8], offset: usize) -> i16 {
    signed(&data[offset..offset + 2]) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn twos_complement_edges() {
        assert_eq!(signed(&[0xFF, 0x9C]), -100);
        assert_eq!(signed(&[0x7F, 0xFF, 0xFF, 0xFF]), 2_147_483_647);
        assert_eq!(signed(&[0x80, 0x00, 0x00, 0x00]), -2_147_483_648);
        assert_eq!(signed(&[0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(signed(&[0x80, 0x00, 0x00]), -8_388_608);
        assert_eq!(signed(&[0x00, 0x78]), 120);
    }

    #[test]
    fn unsigned_is_big_endian() {
        assert_eq!(unsigned(&[0xAC]), 0xAC);
        assert_eq!(unsigned(&[0x01, 0x2C]), 300);
        assert_eq!(unsigned(&[0x01, 0x00, 0x00]), 65_536);
        assert_eq!(unsigned(&[0xFF, 0xFF, 0xFF, 0xFF]), 4_294_967_295);
    }

    #[test]
    fn wraparound_is_applied_once() {
        assert_eq!(correct_wraparound(1_000_000_100), 100);
        assert_eq!(correct_wraparound(999_999_999), 999_999_999);
        assert_eq!(correct_wraparound(1_000_000_000), 0);
        assert_eq!(correct_wraparound(2_100_000_000), 1_100_000_000);
        assert_eq!(correct_wraparound(-5), -5);
    }

    #[test]
    #[should_panic(expected = "unsigned() takes 1..=4 bytes")]
    fn unsigned_rejects_wide_slices() {
        unsigned(&[0; 5]);
    }

    #[test]
    #[should_panic(expected = "signed() takes 2..=4 bytes")]
    fn signed_rejects_single_byte() {
        signed(&[0x80]);
    }

    proptest! {
        #[test]
        fn signed_matches_native_i16(value in any::<i16>()) {
            prop_assert_eq!(signed(&value.to_be_bytes()), i64::from(value));
        }

        #[test]
        fn signed_matches_native_i32(value in any::<i32>()) {
            prop_assert_eq!(signed(&value.to_be_bytes()), i64::from(value));
        }

        #[test]
        fn unsigned_matches_native_u32(value in any::<u32>()) {
            prop_assert_eq!(unsigned(&value.to_be_bytes()), u64::from(value));
        }

        #[test]
        fn corrected_positions_stay_below_threshold(raw in 0i64..2_000_000_000) {
            let corrected = correct_wraparound(raw);
            prop_assert!((0..WRAPAROUND_THRESHOLD).contains(&corrected));
        }
    }
}
