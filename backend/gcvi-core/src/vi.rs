//! VI state and the half-line field scheduler


use crate::interrupts;
use crate::interrupts::InterruptCause;
use crate::mmio;
use crate::mmio::WriteEffect;
use crate::registers::Registers;
use crate::replay::RegisterSource;
use crate::traits::{FrameCallbacks, InterruptController, VideoBackend, ViHost, XfbOutput};
use bincode::{Decode, Encode};
use gcvi_config::ViConfig;

/// Half-lines from the start of a field until the first SI poll completes, measured on hardware
pub const SI_POLL_HALF_LINES: u32 = 7 * 2 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Odd,
    Even,
}

/// Everything that goes into a save state: the register bank followed by the derived scheduling
/// state. Field order must not change.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ViState {
    pub registers: Registers,
    pub(crate) half_line_count: u32,
    pub(crate) odd_field_first_half_line: u32,
    pub(crate) odd_field_last_half_line: u32,
    pub(crate) even_field_first_half_line: u32,
    pub(crate) even_field_last_half_line: u32,
    pub(crate) half_line_of_next_si_poll: u32,
    pub(crate) ticks_last_line_start: u64,
    pub(crate) target_refresh_rate_numerator: u64,
    pub(crate) target_refresh_rate_denominator: u64,
    pub(crate) target_refresh_rate: f64,
}

impl ViState {
    fn power_on(ntsc: bool, config: &ViConfig) -> Self {
        Self {
            registers: Registers::power_on(ntsc, config),
            half_line_count: 0,
            odd_field_first_half_line: 0,
            odd_field_last_half_line: 0,
            even_field_first_half_line: 0,
            even_field_last_half_line: 0,
            // First poll results are available shortly after vsync
            half_line_of_next_si_poll: SI_POLL_HALF_LINES,
            ticks_last_line_start: 0,
            target_refresh_rate_numerator: 0,
            target_refresh_rate_denominator: 1,
            target_refresh_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoInterface {
    pub(crate) state: ViState,
    pub(crate) config: ViConfig,
    pub(crate) ticks_per_second: u64,
    pub(crate) source: RegisterSource,
    fields_completed: u64,
}

impl VideoInterface {
    /// Create a VI in its power-on state for the configured region.
    #[must_use]
    pub fn new(config: ViConfig, ticks_per_second: u64) -> Self {
        let ntsc = config.region.is_ntsc();
        let mut vi = Self {
            state: ViState::power_on(ntsc, &config),
            config,
            ticks_per_second,
            source: RegisterSource::default(),
            fields_completed: 0,
        };
        vi.preset(ntsc);

        vi
    }

    /// Reset every register to its power-on value and restart scanout from the top of the odd
    /// field. Safe to call repeatedly.
    pub fn preset(&mut self, ntsc: bool) {
        log::debug!("Presetting VI (NTSC: {ntsc}, region {})", self.config.region);

        self.state = ViState::power_on(ntsc, &self.config);
        self.source = RegisterSource::Live;
        self.update_parameters();
    }

    pub fn set_ticks_per_second(&mut self, ticks_per_second: u64) {
        self.ticks_per_second = ticks_per_second;
        self.update_parameters();
    }

    /// Recompute field boundaries and the target refresh rate from the timing registers. Must run
    /// after any write that changes vertical timing, horizontal timing, vertical blanking, or the
    /// clock select.
    pub fn update_parameters(&mut self) {
        let boundaries = self.state.registers.field_boundaries();
        self.state.odd_field_first_half_line = boundaries.odd_first;
        self.state.odd_field_last_half_line = boundaries.odd_last;
        self.state.even_field_first_half_line = boundaries.even_first;
        self.state.even_field_last_half_line = boundaries.even_last;

        let refresh = self.state.registers.refresh_rate(self.ticks_per_second);
        self.state.target_refresh_rate_numerator = refresh.numerator;
        self.state.target_refresh_rate_denominator = refresh.denominator;
        self.state.target_refresh_rate = refresh.rate;

        log::debug!(
            "VI parameters: odd field {}..={}, even field {}..={}, {} half-lines per frame, {:.4} Hz",
            boundaries.odd_first,
            boundaries.odd_last,
            boundaries.even_first,
            boundaries.even_last,
            self.state.registers.half_lines_per_frame(),
            refresh.rate
        );
    }

    /// Drive the VI interrupt line from the display interrupt registers.
    pub fn update_interrupts<I: InterruptController + ?Sized>(&self, interrupt_controller: &mut I) {
        let asserted = interrupts::any_asserted(&self.state.registers.interrupts);
        interrupt_controller.set_interrupt(InterruptCause::VI, asserted);
    }

    /// Advance by one half-line. `ticks` is the time the half-line elapsed at and is used to
    /// timestamp XFB output.
    pub fn update<H: ViHost>(&mut self, host: &mut H, ticks: u64) {
        let host_ticks_per_second = host.ticks_per_second();
        if host_ticks_per_second != 0 && host_ticks_per_second != self.ticks_per_second {
            log::debug!(
                "Host tick rate changed from {} to {host_ticks_per_second}",
                self.ticks_per_second
            );
            self.set_ticks_per_second(host_ticks_per_second);
        }

        let even_field_start = self.state.registers.half_lines_per_even_field();

        if self.state.half_line_count == 0 || self.state.half_line_count == even_field_start {
            host.on_new_frame();
        }

        let half_line = self.state.half_line_count;
        if half_line == self.state.even_field_first_half_line {
            self.begin_field(FieldType::Even, ticks, host);
        } else if half_line == self.state.odd_field_first_half_line {
            self.begin_field(FieldType::Odd, ticks, host);
        } else if half_line == self.state.even_field_last_half_line {
            self.end_field(FieldType::Even, ticks, host);
        } else if half_line == self.state.odd_field_last_half_line {
            self.end_field(FieldType::Odd, ticks, host);
        }

        if half_line == 0 || half_line == even_field_start {
            host.on_new_field();
        }

        if half_line == self.state.half_line_of_next_si_poll {
            host.poll_devices();
            self.state.half_line_of_next_si_poll = self
                .state
                .half_line_of_next_si_poll
                .saturating_add(host.poll_interval_lines().saturating_mul(2));
        }

        if half_line == 0 {
            self.state.half_line_of_next_si_poll = SI_POLL_HALF_LINES;
        }
        if half_line == even_field_start {
            self.state.half_line_of_next_si_poll = even_field_start + SI_POLL_HALF_LINES;
        }

        // A shrinking frame (e.g. from a mid-frame register write) can leave the counter past
        // the end, so this wraps on >= rather than on equality
        self.state.half_line_count += 1;
        if self.state.half_line_count >= self.state.registers.half_lines_per_frame() {
            self.state.half_line_count = 0;
        }

        if self.state.half_line_count & 1 == 0 {
            self.state.ticks_last_line_start = host.current_ticks();
        }

        if host.skip_vi_interrupts() {
            return;
        }

        let hlw = self.state.registers.horizontal_timing_0.hlw();
        interrupts::check_positions(
            &mut self.state.registers.interrupts,
            self.state.half_line_count,
            hlw,
        );
        self.update_interrupts(host);
    }

    fn begin_field<H: VideoBackend + FrameCallbacks>(
        &self,
        field: FieldType,
        ticks: u64,
        host: &mut H,
    ) {
        log::trace!("Begin {field:?} field at half-line {}", self.state.half_line_count);

        if self.config.early_xfb_output {
            self.output_field(field, ticks, host);
        }
    }

    fn end_field<H: VideoBackend + FrameCallbacks>(
        &mut self,
        field: FieldType,
        ticks: u64,
        host: &mut H,
    ) {
        log::trace!("End {field:?} field at half-line {}", self.state.half_line_count);

        if !self.config.early_xfb_output {
            self.output_field(field, ticks, host);
        }

        self.fields_completed += 1;
        host.on_field_ended();
    }

    fn output_field<B: VideoBackend + ?Sized>(&self, field: FieldType, ticks: u64, backend: &mut B) {
        let output = self.xfb_output(field, ticks);

        log::trace!(
            "{field:?} field XFB output: {:08X} {}x{} stride {}",
            output.address,
            output.width,
            output.height,
            output.stride
        );

        backend.output_xfb(output);
    }

    /// Geometry of the XFB scanned out for `field`
    #[must_use]
    pub fn xfb_output(&self, field: FieldType, ticks: u64) -> XfbOutput {
        let registers = &self.state.registers;
        let picture = registers.picture_configuration;

        // Two framebuffer lines fit in one stride, so this XFB holds both fields woven together.
        // WPL=0 shows up in homebrew loaders and never counts
        let potentially_interlaced_xfb = picture.wpl() != 0 && picture.std() / picture.wpl() == 2;
        // An odd number of half-lines per field is what makes a video mode interlaced
        let interlaced_video_mode = registers.half_lines_per_even_field() & 1 == 1;

        let mut address = match field {
            FieldType::Even => registers.xfb_address_bottom(),
            FieldType::Odd => registers.xfb_address_top(),
        };
        let width = u32::from(picture.wpl()) * 16;
        // STD is in 16-byte words per field line; the backend wants bytes
        let mut stride = u32::from(picture.std()) * 16 * 2;
        let mut height = u32::from(registers.vertical_timing.acv());

        if potentially_interlaced_xfb && interlaced_video_mode && self.config.force_progressive {
            // Read the whole woven frame starting from the top field every time
            address = registers.xfb_address_top();
            stride /= 2;
            height *= 2;
        }

        XfbOutput { address, width, stride, height, ticks }
    }

    /// Read a 16-bit VI register. `ticks` is the current time, for the beam position registers.
    #[must_use]
    pub fn read_register(&self, address: u32, ticks: u64) -> u16 {
        let offset = address & mmio::OFFSET_MASK;
        match mmio::handler(offset) {
            Some(handler) => {
                let value = (handler.read)(self, ticks);
                log::trace!("VI read {offset:02X}: {value:04X}");
                value
            }
            None => {
                log::warn!("Unmapped VI register read {address:08X}");
                0
            }
        }
    }

    /// Write a 16-bit VI register, recomputing derived timing and the interrupt line as the
    /// register requires.
    pub fn write_register<I: InterruptController + ?Sized>(
        &mut self,
        address: u32,
        value: u16,
        interrupt_controller: &mut I,
    ) {
        let offset = address & mmio::OFFSET_MASK;
        let Some(handler) = mmio::handler(offset) else {
            log::warn!("Unmapped VI register write {address:08X} {value:04X}");
            return;
        };

        log::trace!("VI write {offset:02X}: {value:04X}");

        let WriteEffect { recompute_timing, update_interrupts } =
            (handler.write)(&mut self.state.registers, value);
        if update_interrupts {
            self.update_interrupts(interrupt_controller);
        }
        if recompute_timing {
            self.update_parameters();
        }
    }

    #[inline]
    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.state.registers
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &ViState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ViConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn half_line_count(&self) -> u32 {
        self.state.half_line_count
    }

    #[inline]
    #[must_use]
    pub fn half_line_of_next_si_poll(&self) -> u32 {
        self.state.half_line_of_next_si_poll
    }

    #[inline]
    #[must_use]
    pub fn ticks_last_line_start(&self) -> u64 {
        self.state.ticks_last_line_start
    }

    #[inline]
    #[must_use]
    pub fn odd_field_first_half_line(&self) -> u32 {
        self.state.odd_field_first_half_line
    }

    #[inline]
    #[must_use]
    pub fn odd_field_last_half_line(&self) -> u32 {
        self.state.odd_field_last_half_line
    }

    #[inline]
    #[must_use]
    pub fn even_field_first_half_line(&self) -> u32 {
        self.state.even_field_first_half_line
    }

    #[inline]
    #[must_use]
    pub fn even_field_last_half_line(&self) -> u32 {
        self.state.even_field_last_half_line
    }

    #[must_use]
    pub fn half_lines_per_odd_field(&self) -> u32 {
        self.state.registers.half_lines_per_odd_field()
    }

    #[must_use]
    pub fn half_lines_per_even_field(&self) -> u32 {
        self.state.registers.half_lines_per_even_field()
    }

    #[must_use]
    pub fn ticks_per_sample(&self) -> u64 {
        self.state.registers.ticks_per_sample(self.ticks_per_second)
    }

    #[must_use]
    pub fn ticks_per_half_line(&self) -> u64 {
        self.state.registers.ticks_per_half_line(self.ticks_per_second)
    }

    #[must_use]
    pub fn ticks_per_odd_field(&self) -> u64 {
        self.state.registers.ticks_per_odd_field(self.ticks_per_second)
    }

    #[must_use]
    pub fn ticks_per_even_field(&self) -> u64 {
        self.state.registers.ticks_per_even_field(self.ticks_per_second)
    }

    /// Nominal field length, which is the even field's
    #[must_use]
    pub fn ticks_per_field(&self) -> u64 {
        self.ticks_per_even_field()
    }

    /// Fields per second
    #[inline]
    #[must_use]
    pub fn target_refresh_rate(&self) -> f64 {
        self.state.target_refresh_rate
    }

    #[inline]
    #[must_use]
    pub fn target_refresh_rate_numerator(&self) -> u64 {
        self.state.target_refresh_rate_numerator
    }

    #[inline]
    #[must_use]
    pub fn target_refresh_rate_denominator(&self) -> u64 {
        self.state.target_refresh_rate_denominator
    }

    #[must_use]
    pub fn xfb_address_top(&self) -> u32 {
        self.state.registers.xfb_address_top()
    }

    #[must_use]
    pub fn xfb_address_bottom(&self) -> u32 {
        self.state.registers.xfb_address_bottom()
    }

    #[must_use]
    pub fn xfb_3d_address_top(&self) -> u32 {
        self.state.registers.xfb_3d_address_top()
    }

    #[must_use]
    pub fn xfb_3d_address_bottom(&self) -> u32 {
        self.state.registers.xfb_3d_address_bottom()
    }

    /// Number of fields whose active area has ended since the VI was created
    #[inline]
    #[must_use]
    pub fn fields_completed(&self) -> u64 {
        self.fields_completed
    }
}
