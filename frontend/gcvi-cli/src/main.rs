mod host;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use gcvi_config::{ConsoleRegion, ViConfig};
use gcvi_core::{VideoInterface, mmio};
use host::HeadlessHost;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

const GAMECUBE_TICKS_PER_SECOND: u64 = 486_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DriverConfig {
    ticks_per_second: u64,
    frames: u64,
    vi: ViConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { ticks_per_second: GAMECUBE_TICKS_PER_SECOND, frames: 60, vi: ViConfig::default() }
    }
}

#[derive(Parser)]
struct Args {
    /// TOML config file; command-line options override its values
    #[arg(short = 'c', long)]
    config_path: Option<PathBuf>,

    /// Console region (NtscJ / NtscU / Pal / NtscK)
    #[arg(long, ignore_case = true)]
    region: Option<ConsoleRegion>,

    /// Report a component cable as plugged in
    #[arg(long)]
    progressive_scan: Option<bool>,

    /// Output each field when its active area begins rather than when it ends
    #[arg(long)]
    early_xfb_output: Option<bool>,

    /// Scan out interlaced XFBs as full progressive frames
    #[arg(long)]
    force_progressive: Option<bool>,

    /// Emulated CPU ticks per second
    #[arg(long)]
    ticks_per_second: Option<u64>,

    /// Number of frames (field pairs) to run
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Print every VI register after running
    #[arg(long, default_value_t)]
    dump_registers: bool,

    /// Write a VI save state to this path after running
    #[arg(long)]
    save_state_path: Option<PathBuf>,
}

impl Args {
    fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        let mut config = match &self.config_path {
            Some(path) => load_config(path)?,
            None => DriverConfig::default(),
        };

        if let Some(region) = self.region {
            config.vi.region = region;
        }
        if let Some(progressive_scan) = self.progressive_scan {
            config.vi.progressive_scan = progressive_scan;
        }
        if let Some(early_xfb_output) = self.early_xfb_output {
            config.vi.early_xfb_output = early_xfb_output;
        }
        if let Some(force_progressive) = self.force_progressive {
            config.vi.force_progressive = force_progressive;
        }
        if let Some(ticks_per_second) = self.ticks_per_second {
            config.ticks_per_second = ticks_per_second;
        }
        if let Some(frames) = self.frames {
            config.frames = frames;
        }

        Ok(config)
    }
}

fn load_config(path: &Path) -> anyhow::Result<DriverConfig> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Unable to read config file at '{}'", path.display()))?;
    let config = toml::from_str(&config_str)
        .with_context(|| format!("Unable to parse config file at '{}'", path.display()))?;

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.driver_config()?;

    if config.ticks_per_second == 0 {
        anyhow::bail!("ticks per second must be non-zero");
    }

    log::info!("Running with config: {config:?}");

    let mut vi = VideoInterface::new(config.vi, config.ticks_per_second);
    let mut host = HeadlessHost::new(config.ticks_per_second);

    let half_lines = config.frames * u64::from(vi.registers().half_lines_per_frame());
    host.run(&mut vi, half_lines);

    print_report(&config, &vi, &host);

    if args.dump_registers {
        dump_registers(&vi, host.ticks());
    }

    if let Some(path) = &args.save_state_path {
        let file = File::create(path)
            .with_context(|| format!("Unable to create save state file at '{}'", path.display()))?;
        vi.save_state(file)?;
        log::info!("Saved VI state to '{}'", path.display());
    }

    Ok(())
}

fn print_report(config: &DriverConfig, vi: &VideoInterface, host: &HeadlessHost) {
    println!("{}", config.vi);
    println!(
        "Half-lines per field: {} odd, {} even",
        vi.half_lines_per_odd_field(),
        vi.half_lines_per_even_field()
    );
    println!(
        "Active half-lines: odd {}..={}, even {}..={}",
        vi.odd_field_first_half_line(),
        vi.odd_field_last_half_line(),
        vi.even_field_first_half_line(),
        vi.even_field_last_half_line()
    );
    println!(
        "Refresh rate: {:.4} Hz ({} / {})",
        vi.target_refresh_rate(),
        vi.target_refresh_rate_numerator(),
        vi.target_refresh_rate_denominator()
    );
    println!("Aspect ratio: {:.4}", vi.aspect_ratio());
    println!(
        "Frames: {}, fields: {} started / {} ended, XFB outputs: {}",
        host.frames_started,
        host.fields_started,
        host.fields_ended,
        host.outputs.len()
    );
    println!("Device polls: {}, VI interrupts raised: {}", host.polls, host.interrupts_raised);

    if let Some(output) = host.outputs.last() {
        println!(
            "Last XFB: {:08X} {}x{} stride {}",
            output.address, output.width, output.height, output.stride
        );
    }
}

fn dump_registers(vi: &VideoInterface, ticks: u64) {
    for offset in mmio::mapped_offsets() {
        let value = vi.read_register(mmio::VI_BASE_ADDRESS | offset, ticks);
        println!("{:08X}: {value:04X}", mmio::VI_BASE_ADDRESS | offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_file() {
        let config: DriverConfig = toml::from_str("").unwrap();
        assert_eq!(config, DriverConfig::default());
    }

    #[test]
    fn partial_config_file() {
        let config: DriverConfig = toml::from_str(
            r#"
            frames = 3

            [vi]
            region = "Pal"
            early_xfb_output = false
            "#,
        )
        .unwrap();

        assert_eq!(config.frames, 3);
        assert_eq!(config.ticks_per_second, GAMECUBE_TICKS_PER_SECOND);
        assert_eq!(config.vi.region, ConsoleRegion::Pal);
        assert!(!config.vi.early_xfb_output);
        assert!(config.vi.force_progressive);
    }

    #[test]
    fn config_round_trip() {
        let config = DriverConfig {
            frames: 5,
            vi: ViConfig { region: ConsoleRegion::NtscJ, ..ViConfig::default() },
            ..DriverConfig::default()
        };

        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<DriverConfig>(&serialized).unwrap(), config);
    }

    #[test]
    fn headless_run() {
        let mut vi = VideoInterface::new(ViConfig::default(), GAMECUBE_TICKS_PER_SECOND);
        let mut host = HeadlessHost::new(GAMECUBE_TICKS_PER_SECOND);

        host.run(&mut vi, 3 * 1050);

        assert_eq!(host.frames_started, 6);
        assert_eq!(host.fields_ended, 6);
        assert_eq!(host.outputs.len(), 6);
        assert_eq!(vi.fields_completed(), 6);

        // DI0 and DI1 each fire once per frame and are acknowledged immediately
        assert_eq!(host.interrupts_raised, 6);
        assert!(vi.registers().interrupts.iter().all(|register| !register.pending()));
    }
}
