use gcvi_config::ViConfig;
use gcvi_core::traits::{
    DevicePoller, FrameCallbacks, InterruptController, TickSource, VideoBackend, XfbOutput,
};
use gcvi_core::{InterruptCause, SaveStateError, VideoInterface};
use test_log::test;

const TICKS_PER_SECOND: u64 = 486_000_000;

#[derive(Default)]
struct Host {
    ticks: u64,
    outputs: Vec<XfbOutput>,
}

impl TickSource for Host {
    fn ticks_per_second(&self) -> u64 {
        TICKS_PER_SECOND
    }

    fn current_ticks(&self) -> u64 {
        self.ticks
    }

    fn skip_vi_interrupts(&self) -> bool {
        false
    }
}

impl InterruptController for Host {
    fn set_interrupt(&mut self, _cause: InterruptCause, _asserted: bool) {}
}

impl VideoBackend for Host {
    fn output_xfb(&mut self, output: XfbOutput) {
        self.outputs.push(output);
    }
}

impl FrameCallbacks for Host {
    fn on_new_frame(&mut self) {}

    fn on_new_field(&mut self) {}

    fn on_field_ended(&mut self) {}
}

impl DevicePoller for Host {
    fn poll_devices(&mut self) {}

    fn poll_interval_lines(&self) -> u32 {
        2
    }
}

fn run(vi: &mut VideoInterface, host: &mut Host, half_lines: u32) {
    for _ in 0..half_lines {
        host.ticks += vi.ticks_per_half_line();
        let ticks = host.ticks;
        vi.update(host, ticks);
    }
}

#[test]
fn round_trip_mid_frame() {
    let mut vi = VideoInterface::new(ViConfig::default(), TICKS_PER_SECOND);
    let mut host = Host::default();

    // Page-offset XFB and a modified interrupt so that non-default registers are covered
    vi.write_register(0x0C00_201C, 0x1000, &mut host);
    vi.write_register(0x0C00_201E, 0x8000, &mut host);
    vi.write_register(0x0C00_2038, 0x1032, &mut host);
    run(&mut vi, &mut host, 777);

    let mut bytes = Vec::new();
    vi.save_state(&mut bytes).unwrap();
    assert_eq!(bytes, vi.state_bytes().unwrap());

    let mut restored = VideoInterface::new(ViConfig::default(), TICKS_PER_SECOND);
    restored.load_state(bytes.as_slice()).unwrap();
    assert_eq!(restored.state(), vi.state());
    assert_eq!(restored.half_line_count(), 777);

    // Both copies continue identically
    let mut restored_host = Host { ticks: host.ticks, outputs: Vec::new() };
    host.outputs.clear();
    run(&mut vi, &mut host, 1050);
    run(&mut restored, &mut restored_host, 1050);

    assert_eq!(restored.state(), vi.state());
    assert_eq!(restored_host.outputs, host.outputs);
    assert_eq!(host.outputs[0].address, 0x0010_0000);
}

#[test]
fn truncated_state_is_rejected() {
    let mut vi = VideoInterface::new(ViConfig::default(), TICKS_PER_SECOND);
    let mut host = Host::default();
    run(&mut vi, &mut host, 100);

    let bytes = vi.state_bytes().unwrap();
    let before = vi.state().clone();

    let mut other = VideoInterface::new(ViConfig::default(), TICKS_PER_SECOND);
    let fresh = other.state().clone();
    let result = other.load_state(&bytes[..bytes.len() / 2]);

    assert!(matches!(result, Err(SaveStateError::Deserialization { .. })), "{result:?}");
    assert_eq!(other.state(), &fresh);
    assert_ne!(other.state(), &before);
}
