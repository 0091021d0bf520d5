//! VI register map
//!
//! Every halfword register resolves to a pair of plain functions: one that reads the register from
//! the VI, and one that applies a write to the register bank and reports which derived state the
//! owner has to bring up to date. The bus layer only needs [`handler`].

use crate::registers::{DisplayControl, InterruptRegister, Registers, XfbInfo};
use crate::vi::VideoInterface;
use gcvi_common::num::U32Ext;

/// Physical address of the first VI register
pub const VI_BASE_ADDRESS: u32 = 0x0C00_2000;

pub(crate) const OFFSET_MASK: u32 = 0xFF;

pub const VERTICAL_TIMING: u32 = 0x00;
pub const DISPLAY_CONTROL: u32 = 0x02;
pub const HORIZONTAL_TIMING_0_HI: u32 = 0x04;
pub const HORIZONTAL_TIMING_0_LO: u32 = 0x06;
pub const HORIZONTAL_TIMING_1_HI: u32 = 0x08;
pub const HORIZONTAL_TIMING_1_LO: u32 = 0x0A;
pub const VBLANK_TIMING_ODD_HI: u32 = 0x0C;
pub const VBLANK_TIMING_ODD_LO: u32 = 0x0E;
pub const VBLANK_TIMING_EVEN_HI: u32 = 0x10;
pub const VBLANK_TIMING_EVEN_LO: u32 = 0x12;
pub const BURST_BLANKING_ODD_HI: u32 = 0x14;
pub const BURST_BLANKING_ODD_LO: u32 = 0x16;
pub const BURST_BLANKING_EVEN_HI: u32 = 0x18;
pub const BURST_BLANKING_EVEN_LO: u32 = 0x1A;
pub const FB_LEFT_TOP_HI: u32 = 0x1C;
pub const FB_LEFT_TOP_LO: u32 = 0x1E;
pub const FB_RIGHT_TOP_HI: u32 = 0x20;
pub const FB_RIGHT_TOP_LO: u32 = 0x22;
pub const FB_LEFT_BOTTOM_HI: u32 = 0x24;
pub const FB_LEFT_BOTTOM_LO: u32 = 0x26;
pub const FB_RIGHT_BOTTOM_HI: u32 = 0x28;
pub const FB_RIGHT_BOTTOM_LO: u32 = 0x2A;
pub const VERTICAL_BEAM_POSITION: u32 = 0x2C;
pub const HORIZONTAL_BEAM_POSITION: u32 = 0x2E;
pub const DISPLAY_INTERRUPT_0_HI: u32 = 0x30;
pub const DISPLAY_INTERRUPT_0_LO: u32 = 0x32;
pub const DISPLAY_INTERRUPT_1_HI: u32 = 0x34;
pub const DISPLAY_INTERRUPT_1_LO: u32 = 0x36;
pub const DISPLAY_INTERRUPT_2_HI: u32 = 0x38;
pub const DISPLAY_INTERRUPT_2_LO: u32 = 0x3A;
pub const DISPLAY_INTERRUPT_3_HI: u32 = 0x3C;
pub const DISPLAY_INTERRUPT_3_LO: u32 = 0x3E;
pub const DISPLAY_LATCH_0_HI: u32 = 0x40;
pub const DISPLAY_LATCH_0_LO: u32 = 0x42;
pub const DISPLAY_LATCH_1_HI: u32 = 0x44;
pub const DISPLAY_LATCH_1_LO: u32 = 0x46;
pub const PICTURE_CONFIGURATION: u32 = 0x48;
pub const HORIZONTAL_SCALING: u32 = 0x4A;
pub const FILTER_COEF_0_HI: u32 = 0x4C;
pub const FILTER_COEF_0_LO: u32 = 0x4E;
pub const FILTER_COEF_1_HI: u32 = 0x50;
pub const FILTER_COEF_1_LO: u32 = 0x52;
pub const FILTER_COEF_2_HI: u32 = 0x54;
pub const FILTER_COEF_2_LO: u32 = 0x56;
pub const FILTER_COEF_3_HI: u32 = 0x58;
pub const FILTER_COEF_3_LO: u32 = 0x5A;
pub const FILTER_COEF_4_HI: u32 = 0x5C;
pub const FILTER_COEF_4_LO: u32 = 0x5E;
pub const FILTER_COEF_5_HI: u32 = 0x60;
pub const FILTER_COEF_5_LO: u32 = 0x62;
pub const FILTER_COEF_6_HI: u32 = 0x64;
pub const FILTER_COEF_6_LO: u32 = 0x66;
pub const UNKNOWN_AA_HI: u32 = 0x68;
pub const UNKNOWN_AA_LO: u32 = 0x6A;
pub const CLOCK: u32 = 0x6C;
pub const DTV_STATUS: u32 = 0x6E;
pub const FB_WIDTH: u32 = 0x70;
pub const BORDER_BLANK_END: u32 = 0x72;
pub const BORDER_BLANK_START: u32 = 0x74;

/// One past the last mapped offset
pub const REGISTER_SPAN: u32 = 0x76;

/// Derived state that has to be refreshed after a register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteEffect {
    pub recompute_timing: bool,
    pub update_interrupts: bool,
}

impl WriteEffect {
    pub const NONE: Self = Self { recompute_timing: false, update_interrupts: false };
    pub const RECOMPUTE_TIMING: Self = Self { recompute_timing: true, update_interrupts: false };
    pub const UPDATE_INTERRUPTS: Self = Self { recompute_timing: false, update_interrupts: true };
}

/// Reads take the current tick count for the beam position registers
pub type ReadFn = fn(&VideoInterface, u64) -> u16;

pub type WriteFn = fn(&mut Registers, u16) -> WriteEffect;

#[derive(Debug, Clone, Copy)]
pub struct RegisterHandler {
    pub read: ReadFn,
    pub write: WriteFn,
}

// Plain 16-bit register
macro_rules! halfword {
    ($effect:ident, $($reg:tt)+) => {
        RegisterHandler {
            read: |vi, _| vi.registers().$($reg)+,
            write: |registers, value| {
                registers.$($reg)+ = value;
                WriteEffect::$effect
            },
        }
    };
}

// High half of a 32-bit register
macro_rules! high_half {
    ($effect:ident, $($reg:tt)+) => {
        RegisterHandler {
            read: |vi, _| vi.registers().$($reg)+.high_half(),
            write: |registers, value| {
                registers.$($reg)+.set_high_half(value);
                WriteEffect::$effect
            },
        }
    };
}

// Low half of a 32-bit register
macro_rules! low_half {
    ($effect:ident, $($reg:tt)+) => {
        RegisterHandler {
            read: |vi, _| vi.registers().$($reg)+.low_half(),
            write: |registers, value| {
                registers.$($reg)+.set_low_half(value);
                WriteEffect::$effect
            },
        }
    };
}

// High half of an XFB address register, where CLRPOFF clears POFF
macro_rules! xfb_high_half {
    ($reg:ident) => {
        RegisterHandler {
            read: |vi, _| vi.registers().$reg.0.high_half(),
            write: |registers, value| {
                write_xfb_high_half(&mut registers.$reg, value);
                WriteEffect::NONE
            },
        }
    };
}

macro_rules! read_only {
    ($read:expr) => {
        RegisterHandler {
            read: $read,
            write: |_, value| {
                log::warn!("Write {value:04X} to read-only VI beam position register ignored");
                WriteEffect::NONE
            },
        }
    };
}

/// Look up the handler for a register offset. Returns `None` for unmapped offsets.
#[must_use]
pub fn handler(offset: u32) -> Option<RegisterHandler> {
    let handler = match offset {
        VERTICAL_TIMING => halfword!(RECOMPUTE_TIMING, vertical_timing.0),
        DISPLAY_CONTROL => RegisterHandler {
            read: |vi, _| vi.registers().display_control.0,
            write: write_display_control,
        },
        HORIZONTAL_TIMING_0_HI => high_half!(RECOMPUTE_TIMING, horizontal_timing_0.0),
        HORIZONTAL_TIMING_0_LO => low_half!(RECOMPUTE_TIMING, horizontal_timing_0.0),
        HORIZONTAL_TIMING_1_HI => high_half!(NONE, horizontal_timing_1.0),
        HORIZONTAL_TIMING_1_LO => low_half!(NONE, horizontal_timing_1.0),
        VBLANK_TIMING_ODD_HI => high_half!(RECOMPUTE_TIMING, vblank_timing_odd.0),
        VBLANK_TIMING_ODD_LO => low_half!(RECOMPUTE_TIMING, vblank_timing_odd.0),
        VBLANK_TIMING_EVEN_HI => high_half!(RECOMPUTE_TIMING, vblank_timing_even.0),
        VBLANK_TIMING_EVEN_LO => low_half!(RECOMPUTE_TIMING, vblank_timing_even.0),
        BURST_BLANKING_ODD_HI => high_half!(NONE, burst_blanking_odd.0),
        BURST_BLANKING_ODD_LO => low_half!(NONE, burst_blanking_odd.0),
        BURST_BLANKING_EVEN_HI => high_half!(NONE, burst_blanking_even.0),
        BURST_BLANKING_EVEN_LO => low_half!(NONE, burst_blanking_even.0),
        FB_LEFT_TOP_HI => xfb_high_half!(xfb_top),
        FB_LEFT_TOP_LO => low_half!(NONE, xfb_top.0),
        FB_RIGHT_TOP_HI => xfb_high_half!(xfb_3d_top),
        FB_RIGHT_TOP_LO => low_half!(NONE, xfb_3d_top.0),
        FB_LEFT_BOTTOM_HI => xfb_high_half!(xfb_bottom),
        FB_LEFT_BOTTOM_LO => low_half!(NONE, xfb_bottom.0),
        FB_RIGHT_BOTTOM_HI => xfb_high_half!(xfb_3d_bottom),
        FB_RIGHT_BOTTOM_LO => low_half!(NONE, xfb_3d_bottom.0),
        VERTICAL_BEAM_POSITION => read_only!(read_vertical_beam_position),
        HORIZONTAL_BEAM_POSITION => read_only!(read_horizontal_beam_position),
        DISPLAY_INTERRUPT_0_HI => high_half!(UPDATE_INTERRUPTS, interrupts[0].0),
        DISPLAY_INTERRUPT_0_LO => low_half!(NONE, interrupts[0].0),
        DISPLAY_INTERRUPT_1_HI => high_half!(UPDATE_INTERRUPTS, interrupts[1].0),
        DISPLAY_INTERRUPT_1_LO => low_half!(NONE, interrupts[1].0),
        DISPLAY_INTERRUPT_2_HI => high_half!(UPDATE_INTERRUPTS, interrupts[2].0),
        DISPLAY_INTERRUPT_2_LO => low_half!(NONE, interrupts[2].0),
        DISPLAY_INTERRUPT_3_HI => high_half!(UPDATE_INTERRUPTS, interrupts[3].0),
        DISPLAY_INTERRUPT_3_LO => low_half!(NONE, interrupts[3].0),
        DISPLAY_LATCH_0_HI => high_half!(NONE, latches[0].0),
        DISPLAY_LATCH_0_LO => low_half!(NONE, latches[0].0),
        DISPLAY_LATCH_1_HI => high_half!(NONE, latches[1].0),
        DISPLAY_LATCH_1_LO => low_half!(NONE, latches[1].0),
        PICTURE_CONFIGURATION => halfword!(NONE, picture_configuration.0),
        HORIZONTAL_SCALING => halfword!(NONE, horizontal_scaling.0),
        FILTER_COEF_0_HI => high_half!(NONE, filter_coefficients[0].0),
        FILTER_COEF_0_LO => low_half!(NONE, filter_coefficients[0].0),
        FILTER_COEF_1_HI => high_half!(NONE, filter_coefficients[1].0),
        FILTER_COEF_1_LO => low_half!(NONE, filter_coefficients[1].0),
        FILTER_COEF_2_HI => high_half!(NONE, filter_coefficients[2].0),
        FILTER_COEF_2_LO => low_half!(NONE, filter_coefficients[2].0),
        FILTER_COEF_3_HI => high_half!(NONE, filter_coefficients[3].0),
        FILTER_COEF_3_LO => low_half!(NONE, filter_coefficients[3].0),
        FILTER_COEF_4_HI => high_half!(NONE, filter_coefficients[4].0),
        FILTER_COEF_4_LO => low_half!(NONE, filter_coefficients[4].0),
        FILTER_COEF_5_HI => high_half!(NONE, filter_coefficients[5].0),
        FILTER_COEF_5_LO => low_half!(NONE, filter_coefficients[5].0),
        FILTER_COEF_6_HI => high_half!(NONE, filter_coefficients[6].0),
        FILTER_COEF_6_LO => low_half!(NONE, filter_coefficients[6].0),
        UNKNOWN_AA_HI => high_half!(NONE, unknown_aa),
        UNKNOWN_AA_LO => low_half!(NONE, unknown_aa),
        CLOCK => halfword!(RECOMPUTE_TIMING, clock.0),
        DTV_STATUS => halfword!(NONE, dtv_status.0),
        FB_WIDTH => halfword!(NONE, fb_width.0),
        BORDER_BLANK_END => low_half!(NONE, border_hblank.0),
        BORDER_BLANK_START => high_half!(NONE, border_hblank.0),
        _ => return None,
    };

    Some(handler)
}

/// Every mapped register offset, in address order
pub fn mapped_offsets() -> impl Iterator<Item = u32> {
    (0..REGISTER_SPAN).step_by(2).filter(|&offset| handler(offset).is_some())
}

fn write_display_control(registers: &mut Registers, value: u16) -> WriteEffect {
    let written = DisplayControl(value);
    registers.display_control = DisplayControl(value & DisplayControl::LATCHED_BITS);

    if !written.reset() {
        return WriteEffect::RECOMPUTE_TIMING;
    }

    log::debug!("VI reset requested; clearing display interrupts");
    registers.interrupts = [InterruptRegister::default(); 4];

    WriteEffect { recompute_timing: true, update_interrupts: true }
}

fn write_xfb_high_half(xfb: &mut XfbInfo, value: u16) {
    xfb.0.set_high_half(value);
    if xfb.clear_poff() {
        xfb.set_poff(false);
    }
}

fn read_vertical_beam_position(vi: &VideoInterface, _ticks: u64) -> u16 {
    (1 + vi.half_line_count() / 2) as u16
}

fn read_horizontal_beam_position(vi: &VideoInterface, ticks: u64) -> u16 {
    let hlw = u64::from(vi.registers().horizontal_timing_0.hlw());
    let elapsed = ticks.saturating_sub(vi.ticks_last_line_start());
    let position = 1 + hlw * elapsed / vi.ticks_per_half_line().max(1);

    position.clamp(1, (2 * hlw).max(1)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcvi_config::ViConfig;

    #[test]
    fn register_span_is_fully_mapped() {
        assert_eq!(mapped_offsets().count(), (REGISTER_SPAN / 2) as usize);
        assert!(handler(REGISTER_SPAN).is_none());
        assert!(handler(0x01).is_none());
    }

    #[test]
    fn filter_coefficient_halves() {
        let mut registers = Registers::power_on(true, &ViConfig::default());

        let offsets = [
            (FILTER_COEF_0_HI, FILTER_COEF_0_LO),
            (FILTER_COEF_1_HI, FILTER_COEF_1_LO),
            (FILTER_COEF_2_HI, FILTER_COEF_2_LO),
            (FILTER_COEF_3_HI, FILTER_COEF_3_LO),
            (FILTER_COEF_4_HI, FILTER_COEF_4_LO),
            (FILTER_COEF_5_HI, FILTER_COEF_5_LO),
            (FILTER_COEF_6_HI, FILTER_COEF_6_LO),
        ];
        for (i, (hi, lo)) in offsets.into_iter().enumerate() {
            assert_eq!(hi, FILTER_COEF_0_HI + 4 * i as u32);
            assert_eq!(lo, hi + 2);

            let (hi, lo) = (handler(hi).unwrap(), handler(lo).unwrap());
            assert_eq!((hi.write)(&mut registers, 0x0100 + i as u16), WriteEffect::NONE);
            assert_eq!((lo.write)(&mut registers, 0x2000 + i as u16), WriteEffect::NONE);
        }

        for (i, coefficients) in registers.filter_coefficients.iter().enumerate() {
            assert_eq!(coefficients.0, ((0x0100 + i as u32) << 16) | (0x2000 + i as u32));
        }
        assert_eq!(FILTER_COEF_6_LO + 2, UNKNOWN_AA_HI);
    }

    #[test]
    fn split_register_halves() {
        let mut registers = Registers::power_on(true, &ViConfig::default());

        let hi = handler(VBLANK_TIMING_ODD_HI).unwrap();
        let lo = handler(VBLANK_TIMING_ODD_LO).unwrap();
        assert_eq!((hi.write)(&mut registers, 7), WriteEffect::RECOMPUTE_TIMING);
        assert_eq!((lo.write)(&mut registers, 30), WriteEffect::RECOMPUTE_TIMING);

        assert_eq!(registers.vblank_timing_odd.psb(), 7);
        assert_eq!(registers.vblank_timing_odd.prb(), 30);
    }

    #[test]
    fn display_control_reset_clears_interrupts() {
        let mut registers = Registers::power_on(true, &ViConfig::default());
        registers.interrupts[0].set_pending(true);

        let effect = write_display_control(&mut registers, 0x0003);
        assert_eq!(effect, WriteEffect { recompute_timing: true, update_interrupts: true });
        assert!(registers.interrupts.iter().all(|register| register.0 == 0));
        assert!(registers.display_control.enable());
        assert!(!registers.display_control.reset());
    }

    #[test]
    fn clear_page_offset() {
        let mut xfb = XfbInfo::default();

        write_xfb_high_half(&mut xfb, 0x1000);
        assert!(xfb.poff());

        write_xfb_high_half(&mut xfb, 0x3000);
        assert!(!xfb.poff());
        assert!(xfb.clear_poff());
    }
}
