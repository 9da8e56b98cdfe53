//! Single-byte bitfield helper for packed MMI flags

/// One byte of packed flags, bit 7 is the most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField(pub u8);

impl BitField {
    /// Create a new BitField from a raw byte.
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    /// Extract the inclusive bit range `high..=low` as an unsigned value.
    pub fn bits(&self, high: u8, low: u8) -> u8 {
        debug_assert!(high >= low && high < 8);
        let width = high - low + 1;
        let mask = if width == 8 { 0xFF } else { (1u8 << width) - 1 };
        (self.0 >> low) & mask
    }

    /// Upper four bits.
    pub fn high_nibble(&self) -> u8 {
        self.bits(7, 4)
    }

    /// Lower four bits.
    pub fn low_nibble(&self) -> u8 {
        self.bits(3, 0)
    }
}
