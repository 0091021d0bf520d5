use bincode::{Decode, Encode};
use gcvi_proc_macros::{EnumAll, EnumDisplay, EnumFromStr};
use std::fmt::{Display, Formatter};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Encode,
    Decode,
    EnumDisplay,
    EnumFromStr,
    EnumAll,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(gcvi_proc_macros::CustomValueEnum))]
pub enum ConsoleRegion {
    NtscJ,
    #[default]
    NtscU,
    Pal,
    NtscK,
}

impl ConsoleRegion {
    /// Whether the console belongs to the 525-line family. These consoles ship with a VI clock
    /// capable of 54 MHz progressive scan output.
    #[inline]
    #[must_use]
    pub fn is_ntsc(self) -> bool {
        matches!(self, Self::NtscJ | Self::NtscU | Self::NtscK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViConfig {
    pub region: ConsoleRegion,
    /// System setting: a component cable is reported as plugged in
    pub progressive_scan: bool,
    /// Hand each field to the video backend when its active area begins rather than when it ends.
    /// Reduces latency by up to a field, but games that render late will show torn frames.
    pub early_xfb_output: bool,
    /// Scan out interlaced XFBs as full progressive frames instead of one field at a time
    pub force_progressive: bool,
}

impl Default for ViConfig {
    fn default() -> Self {
        Self {
            region: ConsoleRegion::default(),
            progressive_scan: false,
            early_xfb_output: true,
            force_progressive: true,
        }
    }
}

impl Display for ViConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "region: {}", self.region)?;
        writeln!(f, "progressive_scan: {}", self.progressive_scan)?;
        writeln!(f, "early_xfb_output: {}", self.early_xfb_output)?;
        write!(f, "force_progressive: {}", self.force_progressive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_families() {
        assert!(ConsoleRegion::NtscU.is_ntsc());
        assert!(ConsoleRegion::NtscJ.is_ntsc());
        assert!(ConsoleRegion::NtscK.is_ntsc());
        assert!(!ConsoleRegion::Pal.is_ntsc());
    }

    #[test]
    fn region_from_str() {
        assert_eq!("ntscj".parse::<ConsoleRegion>(), Ok(ConsoleRegion::NtscJ));
        assert_eq!("PAL".parse::<ConsoleRegion>(), Ok(ConsoleRegion::Pal));
        assert_eq!(
            "secam".parse::<ConsoleRegion>(),
            Err("invalid ConsoleRegion string: 'secam'".into())
        );

        for region in ConsoleRegion::ALL {
            assert_eq!(region.to_string().parse::<ConsoleRegion>(), Ok(region));
        }
    }

    #[test]
    fn region_all_and_names() {
        assert_eq!(
            ConsoleRegion::ALL,
            [ConsoleRegion::NtscJ, ConsoleRegion::NtscU, ConsoleRegion::Pal, ConsoleRegion::NtscK]
        );
        assert_eq!(ConsoleRegion::NtscK.to_str(), "NtscK");
        assert_eq!(ConsoleRegion::Pal.to_string(), "Pal");
    }

    #[cfg(feature = "clap")]
    #[test]
    fn region_value_enum() {
        use clap::ValueEnum;

        let names: Vec<_> = ConsoleRegion::value_variants()
            .iter()
            .filter_map(ValueEnum::to_possible_value)
            .map(|value| value.get_name().to_owned())
            .collect();
        assert_eq!(names, ["NtscJ", "NtscU", "Pal", "NtscK"]);
        assert_eq!(ConsoleRegion::from_str("ntscu", true), Ok(ConsoleRegion::NtscU));
    }
}
