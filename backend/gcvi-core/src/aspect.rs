//! Display aspect ratio estimation from the active picture size

use crate::replay::RegisterSource;
use crate::vi::VideoInterface;

const DEFAULT_ASPECT_RATIO: f64 = 4.0 / 3.0;

// 625-line formats: 52 us of a 64 us line, 576 of 625 lines
const PAL_ACTIVE_WIDTH_RATIO: f64 = 52.0 / 64.0;
const PAL_ACTIVE_HEIGHT_RATIO: f64 = 576.0 / 625.0;

// 525-line formats: 10.9 us of blanking in a 572/9 us line, 486 of 525 lines
const NTSC_ACTIVE_WIDTH_RATIO: f64 = 4739.0 / 5720.0;
const NTSC_ACTIVE_HEIGHT_RATIO: f64 = 486.0 / 525.0;

impl VideoInterface {
    /// Estimate the display aspect ratio of the picture, assuming a 4:3 screen.
    ///
    /// The active area programmed into the timing registers is compared against the ideal active
    /// area of the video standard, so a picture that only fills part of the standard's active area
    /// gets a proportionally different ratio. Falls back to 4:3 when the timing registers do not
    /// describe a visible picture, and during FIFO playback.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.source == RegisterSource::FifoReplay {
            return DEFAULT_ASPECT_RATIO;
        }

        let registers = self.registers();
        let active_lines = f64::from(registers.vertical_timing.acv());
        let active_samples = i64::from(registers.horizontal_timing_0.hlw())
            + i64::from(registers.horizontal_timing_1.hbs640())
            - i64::from(registers.horizontal_timing_1.hbe640());

        // All durations are in ticks; the tick length cancels out
        let field_period = self.ticks_per_field() as f64;
        let line_period = 2.0 * self.ticks_per_half_line() as f64;
        let active_height = active_lines * line_period;
        let active_width = self.ticks_per_sample() as f64 * active_samples as f64;

        let (ideal_width_ratio, ideal_height_ratio) = if registers.display_control.is_pal() {
            (PAL_ACTIVE_WIDTH_RATIO, PAL_ACTIVE_HEIGHT_RATIO)
        } else {
            (NTSC_ACTIVE_WIDTH_RATIO, NTSC_ACTIVE_HEIGHT_RATIO)
        };

        let horizontal_stretch = active_width / (line_period * ideal_width_ratio);
        let vertical_stretch = active_height / (field_period * ideal_height_ratio);
        let ratio = horizontal_stretch / vertical_stretch;

        if !ratio.is_normal() || ratio < 0.0 {
            log::debug!("Timing registers do not describe a visible picture; assuming 4:3");
            return DEFAULT_ASPECT_RATIO;
        }

        ratio * DEFAULT_ASPECT_RATIO
    }
}
