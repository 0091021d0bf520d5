//! In-process stand-in for the rest of the console

use gcvi_core::traits::{
    DevicePoller, FrameCallbacks, InterruptController, TickSource, VideoBackend, XfbOutput,
};
use gcvi_core::{InterruptCause, VideoInterface, mmio};

/// Pad polling interval used by most games: twice per field
const DEFAULT_POLL_INTERVAL_LINES: u32 = 131;

#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    ticks_per_second: u64,
    ticks: u64,
    interrupt_line: bool,
    pub interrupts_raised: u64,
    pub frames_started: u64,
    pub fields_started: u64,
    pub fields_ended: u64,
    pub polls: u64,
    pub outputs: Vec<XfbOutput>,
}

impl HeadlessHost {
    pub fn new(ticks_per_second: u64) -> Self {
        Self { ticks_per_second, ..Self::default() }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the VI half-line by half-line, keeping the tick count in step with the VI's
    /// current half-line length. Display interrupts are acknowledged as soon as they are raised.
    pub fn run(&mut self, vi: &mut VideoInterface, half_lines: u64) {
        for _ in 0..half_lines {
            self.ticks += vi.ticks_per_half_line();
            let ticks = self.ticks;
            vi.update(self, ticks);

            if self.interrupt_line {
                self.acknowledge_interrupts(vi);
            }
        }
    }

    fn acknowledge_interrupts(&mut self, vi: &mut VideoInterface) {
        let interrupts = vi.registers().interrupts;
        for (i, register) in interrupts.into_iter().enumerate() {
            if !register.asserted() {
                continue;
            }

            let mut acknowledged = register;
            acknowledged.set_pending(false);

            let address = mmio::VI_BASE_ADDRESS | (mmio::DISPLAY_INTERRUPT_0_HI + 4 * i as u32);
            vi.write_register(address, (acknowledged.0 >> 16) as u16, self);
        }
    }
}

impl TickSource for HeadlessHost {
    fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }

    fn current_ticks(&self) -> u64 {
        self.ticks
    }

    fn skip_vi_interrupts(&self) -> bool {
        false
    }
}

impl InterruptController for HeadlessHost {
    fn set_interrupt(&mut self, cause: InterruptCause, asserted: bool) {
        if asserted && !self.interrupt_line {
            log::trace!("Interrupt {:04X} raised at tick {}", cause.bit(), self.ticks);
            self.interrupts_raised += 1;
        }
        self.interrupt_line = asserted;
    }
}

impl VideoBackend for HeadlessHost {
    fn output_xfb(&mut self, output: XfbOutput) {
        log::debug!(
            "XFB {:08X} {}x{} stride {} at tick {}",
            output.address,
            output.width,
            output.height,
            output.stride,
            output.ticks
        );
        self.outputs.push(output);
    }
}

impl FrameCallbacks for HeadlessHost {
    fn on_new_frame(&mut self) {
        self.frames_started += 1;
    }

    fn on_new_field(&mut self) {
        self.fields_started += 1;
    }

    fn on_field_ended(&mut self) {
        self.fields_ended += 1;
    }
}

impl DevicePoller for HeadlessHost {
    fn poll_devices(&mut self) {
        self.polls += 1;
    }

    fn poll_interval_lines(&self) -> u32 {
        DEFAULT_POLL_INTERVAL_LINES
    }
}
