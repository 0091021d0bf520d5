//! Synthetic register programming for FIFO log playback
//!
//! A recorded GPU FIFO log carries the XFB copies but not the VI register writes that displayed
//! them, so the player programs the VI directly from the copy geometry.

use crate::vi::VideoInterface;

/// Where the VI register contents come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterSource {
    /// Registers are written by emulated software through MMIO
    #[default]
    Live,
    /// Registers are synthesized by [`VideoInterface::fake_update`]
    FifoReplay,
}

impl VideoInterface {
    pub fn enter_fifo_replay(&mut self) {
        log::info!("VI registers now driven by FIFO playback");
        self.source = RegisterSource::FifoReplay;
    }

    pub fn leave_fifo_replay(&mut self) {
        log::info!("VI registers now driven by emulated software");
        self.source = RegisterSource::Live;
    }

    #[inline]
    #[must_use]
    pub fn register_source(&self) -> RegisterSource {
        self.source
    }

    /// Program the timing and XFB registers to display a framebuffer copied to `xfb_address`.
    ///
    /// Copies taller than 240 lines are treated as woven interlaced frames. The address lands in
    /// whichever field's register is scanned out next. Ignored outside of FIFO playback.
    pub fn fake_update(&mut self, xfb_address: u32, fb_width: u32, fb_stride: u32, fb_height: u32) {
        if self.source != RegisterSource::FifoReplay {
            log::warn!("Ignoring synthetic VI update outside of FIFO playback");
            return;
        }

        let interlaced = fb_height > 240;
        let (height, stride) =
            if interlaced { (fb_height / 2, fb_stride * 2) } else { (fb_height, fb_stride) };

        log::debug!(
            "Synthetic VI update: XFB {xfb_address:08X} {fb_width}x{height} stride {stride} (interlaced: {interlaced})"
        );

        {
            let registers = &mut self.state.registers;

            registers.xfb_top.set_poff(true);
            registers.xfb_bottom.set_poff(true);

            registers.vertical_timing.set_acv(height as u16);
            registers.vertical_timing.set_equ(6);

            // 525 half-lines per field regardless of height
            registers.vblank_timing_odd.set_prb(504_u32.saturating_sub(2 * height));
            registers.vblank_timing_odd.set_psb(3);
            registers.vblank_timing_even.set_prb(505_u32.saturating_sub(2 * height));
            registers.vblank_timing_even.set_psb(2);

            registers.picture_configuration.set_wpl((fb_width / 16) as u16);
            registers.picture_configuration.set_std((stride / 32) as u16);
        }

        self.update_parameters();

        let total = self.state.registers.half_lines_per_frame().max(1);
        let counter = self.state.half_line_count;
        let since_even = half_lines_since(counter, self.state.even_field_first_half_line, total);
        let since_odd = half_lines_since(counter, self.state.odd_field_first_half_line, total);

        let registers = &mut self.state.registers;
        if since_even < since_odd {
            // Inside or just past the even field; the odd field is next
            registers.xfb_top.set_fbb(xfb_address >> 5);
        } else {
            let bottom_address = if interlaced { xfb_address + fb_width * 2 } else { xfb_address };
            registers.xfb_bottom.set_fbb(bottom_address >> 5);
        }
    }
}

fn half_lines_since(counter: u32, first: u32, total: u32) -> u32 {
    (counter % total + total - first % total) % total
}
