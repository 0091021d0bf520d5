use std::ops::RangeInclusive;

/// Bitfield access on plain integers. Bit ranges are inclusive on both ends, e.g. `4..=13`.
pub trait GetBit: Copy {
    #[must_use]
    fn bit(self, i: u8) -> bool;

    #[must_use]
    fn bits(self, range: RangeInclusive<u8>) -> Self;

    /// Returns `self` with bit `i` replaced by `value`.
    #[must_use]
    fn with_bit(self, i: u8, value: bool) -> Self;

    /// Returns `self` with the bits in `range` replaced by the low bits of `value`. Bits of
    /// `value` that do not fit in the range are discarded.
    #[must_use]
    fn with_bits(self, range: RangeInclusive<u8>, value: Self) -> Self;
}

// Shifting down from MAX avoids overflow when the range covers the full width
macro_rules! field_mask {
    ($t:ty, $start:expr, $end:expr) => {
        <$t>::MAX >> (<$t>::BITS as u8 - ($end - $start + 1))
    };
}

macro_rules! impl_get_bit {
    ($t:ty) => {
        impl GetBit for $t {
            #[inline]
            fn bit(self, i: u8) -> bool {
                debug_assert!(i < (<$t>::BITS as u8));
                self & (1 << i) != 0
            }

            #[inline]
            fn bits(self, range: RangeInclusive<u8>) -> Self {
                let start = *range.start();
                let end = *range.end();
                debug_assert!(start <= end && end < (<$t>::BITS as u8));

                (self >> start) & field_mask!($t, start, end)
            }

            #[inline]
            fn with_bit(self, i: u8, value: bool) -> Self {
                debug_assert!(i < (<$t>::BITS as u8));
                (self & !(1 << i)) | (<$t>::from(value) << i)
            }

            #[inline]
            fn with_bits(self, range: RangeInclusive<u8>, value: Self) -> Self {
                let start = *range.start();
                let end = *range.end();
                debug_assert!(start <= end && end < (<$t>::BITS as u8));

                let mask = field_mask!($t, start, end);
                (self & !(mask << start)) | ((value & mask) << start)
            }
        }
    };
}

impl_get_bit!(u8);
impl_get_bit!(u16);
impl_get_bit!(u32);
impl_get_bit!(u64);

/// Access to the 16-bit halves of a 32-bit register, which the bus exposes as two separate
/// big-endian halfword registers (high half at the lower address).
pub trait U32Ext {
    fn high_half(self) -> u16;

    fn low_half(self) -> u16;

    fn set_high_half(&mut self, value: u16);

    fn set_low_half(&mut self, value: u16);
}

impl U32Ext for u32 {
    #[inline(always)]
    fn high_half(self) -> u16 {
        (self >> 16) as u16
    }

    #[inline(always)]
    fn low_half(self) -> u16 {
        self as u16
    }

    #[inline(always)]
    fn set_high_half(&mut self, value: u16) {
        *self = (*self & 0x0000_FFFF) | (u32::from(value) << 16);
    }

    #[inline(always)]
    fn set_low_half(&mut self, value: u16) {
        *self = (*self & 0xFFFF_0000) | u32::from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_ranges() {
        let value: u16 = 0b0000_1111_0000_0110;

        assert_eq!(value.bits(0..=3), 0b0110);
        assert_eq!(value.bits(4..=13), 0b00_1111_0000);
        assert!(value.bit(1));
        assert!(!value.bit(0));
    }

    #[test]
    fn full_width_range_does_not_overflow() {
        assert_eq!(0xDEAD_BEEF_u32.bits(0..=31), 0xDEAD_BEEF);
        assert_eq!(0_u32.with_bits(0..=31, 0x1234_5678), 0x1234_5678);
    }

    #[test]
    fn with_bits_discards_overflowing_value() {
        let value = 0xFFFF_u16.with_bits(4..=7, 0x1F);
        assert_eq!(value, 0xFFFF);

        let value = 0_u16.with_bits(4..=7, 0x1F);
        assert_eq!(value, 0x00F0);

        assert_eq!(0x00F0_u16.with_bit(4, false), 0x00E0);
        assert_eq!(0_u32.with_bit(31, true), 0x8000_0000);
    }

    #[test]
    fn halves() {
        let mut value = 0x1234_5678_u32;
        assert_eq!(value.high_half(), 0x1234);
        assert_eq!(value.low_half(), 0x5678);

        value.set_high_half(0xABCD);
        assert_eq!(value, 0xABCD_5678);

        value.set_low_half(0x0001);
        assert_eq!(value, 0xABCD_0001);
    }
}
