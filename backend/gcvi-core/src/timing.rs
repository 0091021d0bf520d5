//! Field geometry and tick-rate derivations from the timing registers

use crate::registers::Registers;

/// Half-line indices of the first and last active half-lines of each field, counted from the
/// start of the odd field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldBoundaries {
    pub odd_first: u32,
    pub odd_last: u32,
    pub even_first: u32,
    pub even_last: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RefreshRate {
    pub numerator: u64,
    pub denominator: u64,
    pub rate: f64,
}

impl Registers {
    #[inline]
    fn equalization_half_lines(&self) -> u32 {
        3 * u32::from(self.vertical_timing.equ())
    }

    #[inline]
    fn active_half_lines(&self) -> u32 {
        2 * u32::from(self.vertical_timing.acv())
    }

    #[must_use]
    pub fn half_lines_per_odd_field(&self) -> u32 {
        self.equalization_half_lines()
            + self.vblank_timing_odd.prb()
            + self.active_half_lines()
            + self.vblank_timing_odd.psb()
    }

    #[must_use]
    pub fn half_lines_per_even_field(&self) -> u32 {
        self.equalization_half_lines()
            + self.vblank_timing_even.prb()
            + self.active_half_lines()
            + self.vblank_timing_even.psb()
    }

    #[must_use]
    pub fn half_lines_per_frame(&self) -> u32 {
        self.half_lines_per_odd_field() + self.half_lines_per_even_field()
    }

    #[must_use]
    pub fn ticks_per_sample(&self, ticks_per_second: u64) -> u64 {
        2 * ticks_per_second / self.clock_select().frequency()
    }

    /// HLW is clamped to at least 1 so that the tick rate derived from it is always usable as a
    /// divisor.
    #[must_use]
    pub fn ticks_per_half_line(&self, ticks_per_second: u64) -> u64 {
        let hlw = self.horizontal_timing_0.hlw().max(1);
        self.ticks_per_sample(ticks_per_second) * u64::from(hlw)
    }

    #[must_use]
    pub fn ticks_per_odd_field(&self, ticks_per_second: u64) -> u64 {
        self.ticks_per_half_line(ticks_per_second) * u64::from(self.half_lines_per_odd_field())
    }

    #[must_use]
    pub fn ticks_per_even_field(&self, ticks_per_second: u64) -> u64 {
        self.ticks_per_half_line(ticks_per_second) * u64::from(self.half_lines_per_even_field())
    }

    pub(crate) fn field_boundaries(&self) -> FieldBoundaries {
        let equ = self.equalization_half_lines();
        let acv = self.active_half_lines();

        // With ACV=0 the last half-line is the one before the first, so the field ends one
        // half-line before it begins. This only wraps when nothing precedes the active area.
        let odd_first = equ + self.vblank_timing_odd.prb();
        let odd_last = (odd_first + acv).wrapping_sub(1);

        let even_first = equ + self.vblank_timing_even.prb() + self.half_lines_per_odd_field();
        let even_last = (even_first + acv).wrapping_sub(1);

        FieldBoundaries { odd_first, odd_last, even_first, even_last }
    }

    pub(crate) fn refresh_rate(&self, ticks_per_second: u64) -> RefreshRate {
        let numerator = 2 * ticks_per_second;
        let denominator = (self.ticks_per_even_field(ticks_per_second)
            + self.ticks_per_odd_field(ticks_per_second))
        .max(1);
        let rate = numerator as f64 / denominator as f64;

        RefreshRate { numerator, denominator, rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcvi_config::ViConfig;

    const GAMECUBE_TICKS_PER_SECOND: u64 = 486_000_000;

    #[test]
    fn ntsc_power_on_geometry() {
        let registers = Registers::power_on(true, &ViConfig::default());

        assert_eq!(registers.half_lines_per_odd_field(), 525);
        assert_eq!(registers.half_lines_per_even_field(), 525);
        assert_eq!(registers.half_lines_per_frame(), 1050);

        assert_eq!(
            registers.field_boundaries(),
            FieldBoundaries { odd_first: 42, odd_last: 521, even_first: 568, even_last: 1047 }
        );
    }

    #[test]
    fn tick_rates_follow_clock_select() {
        let mut registers = Registers::power_on(true, &ViConfig::default());

        // 54 MHz
        assert_eq!(registers.ticks_per_sample(GAMECUBE_TICKS_PER_SECOND), 18);
        assert_eq!(registers.ticks_per_half_line(GAMECUBE_TICKS_PER_SECOND), 18 * 429);

        registers.clock.set_fifty_four_mhz(false);
        assert_eq!(registers.ticks_per_sample(GAMECUBE_TICKS_PER_SECOND), 36);
        assert_eq!(registers.ticks_per_half_line(GAMECUBE_TICKS_PER_SECOND), 15444);
        assert_eq!(registers.ticks_per_odd_field(GAMECUBE_TICKS_PER_SECOND), 15444 * 525);

        let refresh = registers.refresh_rate(GAMECUBE_TICKS_PER_SECOND);
        assert_eq!(refresh.numerator, 972_000_000);
        assert_eq!(refresh.denominator, 2 * 15444 * 525);
        assert!((refresh.rate - 59.94).abs() < 0.01, "{}", refresh.rate);
    }

    #[test]
    fn zero_half_line_width_is_clamped() {
        let mut registers = Registers::power_on(true, &ViConfig::default());
        registers.horizontal_timing_0.set_hlw(0);

        assert_eq!(
            registers.ticks_per_half_line(GAMECUBE_TICKS_PER_SECOND),
            registers.ticks_per_sample(GAMECUBE_TICKS_PER_SECOND)
        );
        assert!(registers.refresh_rate(GAMECUBE_TICKS_PER_SECOND).rate.is_finite());
    }

    #[test]
    fn empty_active_area() {
        let mut registers = Registers::power_on(true, &ViConfig::default());
        registers.vertical_timing.set_acv(0);

        let boundaries = registers.field_boundaries();
        assert_eq!(boundaries.odd_first, 42);
        assert_eq!(boundaries.odd_last, 41);
        assert_eq!(registers.half_lines_per_odd_field(), 45);
        assert_eq!(boundaries.even_first, 88);
        assert_eq!(boundaries.even_last, 87);

        // Nothing before the odd active area either
        registers.vertical_timing.set_equ(0);
        registers.vblank_timing_odd.set_prb(0);
        let boundaries = registers.field_boundaries();
        assert_eq!(boundaries.odd_first, 0);
        assert_eq!(boundaries.odd_last, u32::MAX);
    }
}
