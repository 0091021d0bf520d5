//! VI register mirrors
//!
//! Every register is a newtype over the raw hardware word so that save states keep the hardware
//! widths. 32-bit registers are exposed on the bus as two halfwords, high half first.

use bincode::{Decode, Encode};
use gcvi_common::{define_bit_enum, define_register};
use gcvi_config::ViConfig;

define_register! {
    /// VTR: vertical timing
    pub struct VerticalTiming(u16) {
        fields {
            /// EQU: equalization pulse length; the pre-blanking period is 3 * EQU half-lines
            equ / set_equ: 0..=3,
            /// ACV: active video lines per field
            acv / set_acv: 4..=13,
        }
        flags {}
    }
}

define_register! {
    /// DCR: display configuration
    pub struct DisplayControl(u16) {
        fields {
            /// LE0: display latch 0 mode
            le0 / set_le0: 4..=5,
            /// LE1: display latch 1 mode
            le1 / set_le1: 6..=7,
            /// FMT: 0 = NTSC, 1 = PAL, 2 = MPAL, 3 = debug
            fmt / set_fmt: 8..=9,
        }
        flags {
            /// ENB: VI enabled
            enable / set_enable: 0,
            /// RST: reset request, never latched
            reset / set_reset: 1,
            /// NIN: non-interlaced (progressive or double-strike) output
            non_interlaced / set_non_interlaced: 2,
            /// DLR: 3D display mode
            stereo / set_stereo: 3,
        }
    }
}

impl DisplayControl {
    /// All defined bits other than RST
    pub const LATCHED_BITS: u16 = 0x03FD;

    /// Whether the output format is a 625-line format
    #[inline]
    #[must_use]
    pub fn is_pal(self) -> bool {
        self.fmt() == 1
    }
}

define_register! {
    /// HTR0: horizontal timing 0
    pub struct HorizontalTiming0(u32) {
        fields {
            /// HLW: half-line width in samples
            hlw / set_hlw: 0..=9,
            /// HCE: horizontal sync start to color burst end
            hce / set_hce: 16..=22,
            /// HCS: horizontal sync start to color burst start
            hcs / set_hcs: 24..=30,
        }
        flags {}
    }
}

define_register! {
    /// HTR1: horizontal timing 1
    pub struct HorizontalTiming1(u32) {
        fields {
            /// HSY: horizontal sync width
            hsy / set_hsy: 0..=6,
            /// HBE640: horizontal sync start to horizontal blank end
            hbe640 / set_hbe640: 7..=16,
            /// HBS640: half-line to horizontal blank start
            hbs640 / set_hbs640: 17..=26,
        }
        flags {}
    }
}

define_register! {
    /// VTO / VTE: vertical blanking for the odd or even field
    pub struct VBlankTiming(u32) {
        fields {
            /// PRB: pre-blanking half-lines
            prb / set_prb: 0..=9,
            /// PSB: post-blanking half-lines
            psb / set_psb: 16..=25,
        }
        flags {}
    }
}

define_register! {
    /// BBOI / BBEI: burst blanking interval for the odd or even field
    pub struct BurstBlanking(u32) {
        fields {
            bs0 / set_bs0: 0..=4,
            be0 / set_be0: 5..=15,
            bs2 / set_bs2: 16..=20,
            be2 / set_be2: 21..=31,
        }
        flags {}
    }
}

define_register! {
    /// TFBL / BFBL / TFBR / BFBR: external framebuffer address
    pub struct XfbInfo(u32) {
        fields {
            /// FBB: framebuffer base address, in bytes or in 32-byte units if POFF is set
            fbb / set_fbb: 0..=23,
            /// XOF: horizontal offset of the left-most pixel
            xof / set_xof: 24..=27,
        }
        flags {
            /// POFF: FBB is a 32-byte page offset
            poff / set_poff: 28,
            /// CLRPOFF: writing this bit clears POFF
            clear_poff / set_clear_poff: 29,
        }
    }
}

impl XfbInfo {
    /// Byte address of the framebuffer, scaled by the POFF bit of the top-field register (the
    /// bottom-field registers share the top field's POFF).
    #[inline]
    #[must_use]
    pub fn address(self, page_offset: bool) -> u32 {
        if page_offset { self.fbb() << 5 } else { self.fbb() }
    }
}

define_register! {
    /// DI0-DI3: display interrupt
    pub struct InterruptRegister(u32) {
        fields {
            /// HCT: horizontal position, in samples
            hct / set_hct: 0..=9,
            /// VCT: vertical position, in lines (1-based)
            vct / set_vct: 16..=25,
        }
        flags {
            /// Interrupt enabled
            mask / set_mask: 28,
            /// Interrupt status; software acknowledges by writing 0
            pending / set_pending: 31,
        }
    }
}

impl InterruptRegister {
    /// Whether this register is currently driving the VI interrupt line
    #[inline]
    #[must_use]
    pub fn asserted(self) -> bool {
        self.pending() && self.mask()
    }
}

define_register! {
    /// DL0 / DL1: display latch
    pub struct DisplayLatch(u32) {
        fields {
            hct / set_hct: 0..=10,
            vct / set_vct: 16..=26,
            gate_mode / set_gate_mode: 30..=31,
        }
        flags {}
    }
}

define_register! {
    /// HSW: picture configuration
    pub struct PictureConfiguration(u16) {
        fields {
            /// STD: framebuffer line stride, in 16-byte words
            std / set_std: 0..=7,
            /// WPL: framebuffer width, in 16-byte words. Zero is seen in the wild.
            wpl / set_wpl: 8..=14,
        }
        flags {}
    }
}

define_register! {
    /// HSR: horizontal scaling
    pub struct HorizontalScaling(u16) {
        fields {
            /// STP: horizontal step size, 1.8 fixed point
            stp / set_stp: 0..=8,
        }
        flags {
            enable / set_enable: 12,
        }
    }
}

define_register! {
    /// FCT0-FCT6: anti-aliasing filter coefficient taps
    pub struct FilterTaps(u32) {
        fields {}
        flags {}
    }
}

define_register! {
    /// VICLK: video clock select
    pub struct ClockRegister(u16) {
        fields {}
        flags {
            fifty_four_mhz / set_fifty_four_mhz: 0,
        }
    }
}

define_register! {
    /// VISEL: DTV status
    pub struct DtvStatus(u16) {
        fields {}
        flags {
            /// A component cable is plugged in, which enables progressive scan in system menus
            component_plugged / set_component_plugged: 0,
            ntsc_j / set_ntsc_j: 1,
        }
    }
}

define_register! {
    /// Horizontal stepping for the framebuffer width
    pub struct HorizontalStepping(u16) {
        fields {
            fb_steps / set_fb_steps: 0..=7,
            field_steps / set_field_steps: 8..=15,
        }
        flags {}
    }
}

define_register! {
    /// HBE / HBS: border horizontal blank
    pub struct BorderHBlank(u32) {
        fields {
            hbe656 / set_hbe656: 0..=9,
            hbs656 / set_hbs656: 16..=25,
        }
        flags {
            enable / set_enable: 31,
        }
    }
}

define_bit_enum!(ClockSelect, [TwentySevenMhz, FiftyFourMhz]);

impl ClockSelect {
    #[inline]
    #[must_use]
    pub fn frequency(self) -> u64 {
        match self {
            Self::TwentySevenMhz => 27_000_000,
            Self::FiftyFourMhz => 54_000_000,
        }
    }
}

/// The hardware-visible VI register bank.
///
/// Field order is the save state order and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Registers {
    pub vertical_timing: VerticalTiming,
    pub horizontal_timing_0: HorizontalTiming0,
    pub horizontal_timing_1: HorizontalTiming1,
    pub vblank_timing_odd: VBlankTiming,
    pub vblank_timing_even: VBlankTiming,
    pub burst_blanking_odd: BurstBlanking,
    pub burst_blanking_even: BurstBlanking,
    pub xfb_top: XfbInfo,
    pub xfb_bottom: XfbInfo,
    pub xfb_3d_top: XfbInfo,
    pub xfb_3d_bottom: XfbInfo,
    pub interrupts: [InterruptRegister; 4],
    pub display_control: DisplayControl,
    pub picture_configuration: PictureConfiguration,
    pub latches: [DisplayLatch; 2],
    pub horizontal_scaling: HorizontalScaling,
    pub filter_coefficients: [FilterTaps; 7],
    pub unknown_aa: u32,
    pub clock: ClockRegister,
    pub dtv_status: DtvStatus,
    pub fb_width: HorizontalStepping,
    pub border_hblank: BorderHBlank,
}

impl Registers {
    /// Power-on register values. The timing registers describe a standard 525-half-line
    /// interlaced field pair with 240 active lines per field.
    #[must_use]
    pub fn power_on(ntsc: bool, config: &ViConfig) -> Self {
        let mut vertical_timing = VerticalTiming::default();
        vertical_timing.set_equ(6);
        vertical_timing.set_acv(240);

        let mut display_control = DisplayControl::default();
        display_control.set_enable(true);
        display_control.set_fmt(u16::from(!ntsc));

        let mut horizontal_timing_0 = HorizontalTiming0::default();
        horizontal_timing_0.set_hlw(429);
        horizontal_timing_0.set_hce(105);
        horizontal_timing_0.set_hcs(71);

        let mut horizontal_timing_1 = HorizontalTiming1::default();
        horizontal_timing_1.set_hsy(64);
        horizontal_timing_1.set_hbe640(162);
        horizontal_timing_1.set_hbs640(373);

        let vblank_timing_odd = vblank_timing(24, 3);
        let vblank_timing_even = vblank_timing(25, 2);

        let burst_blanking_odd = burst_blanking(12, 520);
        let burst_blanking_even = burst_blanking(13, 519);

        let mut interrupts = [InterruptRegister::default(); 4];
        interrupts[0].set_hct(430);
        interrupts[0].set_vct(263);
        interrupts[0].set_mask(true);
        interrupts[1].set_hct(1);
        interrupts[1].set_vct(1);
        interrupts[1].set_mask(true);

        let mut picture_configuration = PictureConfiguration::default();
        picture_configuration.set_std(40);
        picture_configuration.set_wpl(40);

        let mut clock = ClockRegister::default();
        clock.set_fifty_four_mhz(ntsc);

        let mut dtv_status = DtvStatus::default();
        dtv_status.set_component_plugged(config.progressive_scan);
        dtv_status.set_ntsc_j(config.region == gcvi_config::ConsoleRegion::NtscJ);

        Self {
            vertical_timing,
            horizontal_timing_0,
            horizontal_timing_1,
            vblank_timing_odd,
            vblank_timing_even,
            burst_blanking_odd,
            burst_blanking_even,
            xfb_top: XfbInfo::default(),
            xfb_bottom: XfbInfo::default(),
            xfb_3d_top: XfbInfo::default(),
            xfb_3d_bottom: XfbInfo::default(),
            interrupts,
            display_control,
            picture_configuration,
            latches: [DisplayLatch::default(); 2],
            horizontal_scaling: HorizontalScaling::default(),
            filter_coefficients: [FilterTaps::default(); 7],
            unknown_aa: 0,
            clock,
            dtv_status,
            fb_width: HorizontalStepping::default(),
            border_hblank: BorderHBlank::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn clock_select(&self) -> ClockSelect {
        ClockSelect::from_bit(self.clock.fifty_four_mhz())
    }

    /// Top field XFB byte address
    #[inline]
    #[must_use]
    pub fn xfb_address_top(&self) -> u32 {
        self.xfb_top.address(self.xfb_top.poff())
    }

    /// Bottom field XFB byte address. The bottom register's own POFF bit is ignored.
    #[inline]
    #[must_use]
    pub fn xfb_address_bottom(&self) -> u32 {
        self.xfb_bottom.address(self.xfb_top.poff())
    }

    #[inline]
    #[must_use]
    pub fn xfb_3d_address_top(&self) -> u32 {
        self.xfb_3d_top.address(self.xfb_top.poff())
    }

    #[inline]
    #[must_use]
    pub fn xfb_3d_address_bottom(&self) -> u32 {
        self.xfb_3d_bottom.address(self.xfb_top.poff())
    }
}

fn vblank_timing(prb: u32, psb: u32) -> VBlankTiming {
    let mut register = VBlankTiming::default();
    register.set_prb(prb);
    register.set_psb(psb);
    register
}

fn burst_blanking(start: u32, end: u32) -> BurstBlanking {
    let mut register = BurstBlanking::default();
    register.set_bs0(start);
    register.set_be0(end);
    register.set_bs2(start);
    register.set_be2(end);
    register
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_register_layout() {
        let mut register = InterruptRegister(0);
        register.set_vct(263);
        register.set_hct(430);
        register.set_mask(true);

        assert_eq!(register.0, 0x1107_01AE);
        assert!(!register.asserted());

        register.set_pending(true);
        assert_eq!(register.0 >> 16, 0x9107);
        assert!(register.asserted());
    }

    #[test]
    fn power_on_region_bits() {
        let config = ViConfig {
            region: gcvi_config::ConsoleRegion::NtscJ,
            progressive_scan: true,
            ..ViConfig::default()
        };

        let registers = Registers::power_on(true, &config);
        assert_eq!(registers.display_control.fmt(), 0);
        assert_eq!(registers.clock_select(), ClockSelect::FiftyFourMhz);
        assert!(registers.dtv_status.ntsc_j());
        assert!(registers.dtv_status.component_plugged());
        assert_eq!(registers.vertical_timing.0, (240 << 4) | 6);

        let registers = Registers::power_on(false, &ViConfig::default());
        assert!(registers.display_control.is_pal());
        assert_eq!(registers.clock_select(), ClockSelect::TwentySevenMhz);
        assert!(!registers.dtv_status.ntsc_j());
    }

    #[test]
    fn bottom_address_uses_top_page_offset() {
        let mut registers = Registers::power_on(true, &ViConfig::default());
        registers.xfb_top.set_fbb(0x1000);
        registers.xfb_bottom.set_fbb(0x1014);
        registers.xfb_bottom.set_poff(true);

        assert_eq!(registers.xfb_address_top(), 0x1000);
        assert_eq!(registers.xfb_address_bottom(), 0x1014);

        registers.xfb_top.set_poff(true);
        assert_eq!(registers.xfb_address_top(), 0x1000 << 5);
        assert_eq!(registers.xfb_address_bottom(), 0x1014 << 5);
    }
}
