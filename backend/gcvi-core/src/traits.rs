//! Collaborators the VI drives or depends on. The embedding emulator implements these.

use crate::interrupts::InterruptCause;

pub trait TickSource {
    /// Emulated CPU clock rate. The VI follows changes to this on its next update, e.g. when the
    /// host switches between GameCube and Wii clocks. Zero means "keep the current rate".
    fn ticks_per_second(&self) -> u64;

    fn current_ticks(&self) -> u64;

    /// Fast-forward shortcut: while set, display interrupt conditions are not evaluated.
    fn skip_vi_interrupts(&self) -> bool;
}

pub trait InterruptController {
    fn set_interrupt(&mut self, cause: InterruptCause, asserted: bool);
}

/// A field's worth of XFB, ready to be scanned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XfbOutput {
    pub address: u32,
    pub width: u32,
    /// Distance between lines, in bytes
    pub stride: u32,
    pub height: u32,
    pub ticks: u64,
}

pub trait VideoBackend {
    /// Fire-and-forget. The backend must finish reading the XFB before the emulated CPU
    /// overwrites it.
    fn output_xfb(&mut self, output: XfbOutput);
}

pub trait FrameCallbacks {
    /// Called at the start of each field before any field processing, e.g. to advance a movie
    /// frame counter
    fn on_new_frame(&mut self);

    /// Called at the start of each field after field processing
    fn on_new_field(&mut self);

    /// Called whenever a field's active area ends
    fn on_field_ended(&mut self);
}

pub trait DevicePoller {
    fn poll_devices(&mut self);

    /// Lines between consecutive polls within a field
    fn poll_interval_lines(&self) -> u32;
}

/// Everything the field scheduler talks to during a single update
pub trait ViHost:
    TickSource + InterruptController + VideoBackend + FrameCallbacks + DevicePoller
{
}

impl<T> ViHost for T where
    T: TickSource + InterruptController + VideoBackend + FrameCallbacks + DevicePoller
{
}
